mod common;

use anyhow::Result;
use reqwest::{header, StatusCode};
use serde_json::{json, Value};

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let Some(server) = common::server().await? else { return Ok(()) };

    let res = reqwest::get(server.url("/health")).await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({ "status": "ok" }));
    Ok(())
}

#[tokio::test]
async fn login_check_me_logout_roundtrip() -> Result<()> {
    let Some(server) = common::server().await? else { return Ok(()) };
    let client = common::client()?;
    let email = common::unique_email("ada");

    let check: Value = client.get(server.url("/auth/check")).send().await?.json().await?;
    assert_eq!(check, json!({ "isLoggedIn": false, "googleLogin": false }));

    let res = client
        .post(server.url("/auth/login"))
        .json(&json!({ "email": email }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let cookies: Vec<_> = res
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    assert!(cookies.iter().any(|c| c.starts_with("sessionId=") && c.contains("HttpOnly")));
    assert!(cookies.iter().any(|c| c.starts_with("loginEmail=") && !c.contains("HttpOnly")));

    let check: Value = client.get(server.url("/auth/check")).send().await?.json().await?;
    assert_eq!(check, json!({ "isLoggedIn": true, "googleLogin": false }));

    let me: Value = client.get(server.url("/auth/me")).send().await?.json().await?;
    assert_eq!(me["user"]["email"], email.as_str());
    assert_eq!(me["user"]["completed_onboarding"], false);
    assert!(me["user"]["last_seen"].is_string());

    let res = client
        .put(server.url("/user"))
        .json(&json!({ "name": "Ada Lovelace" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let me: Value = client.get(server.url("/auth/me")).send().await?.json().await?;
    assert_eq!(me["user"]["name"], "Ada Lovelace");

    let res = client.post(server.url("/auth/logout")).send().await?;
    assert_eq!(res.json::<Value>().await?, json!({ "status": "ok", "message": "Logged out" }));

    let check: Value = client.get(server.url("/auth/check")).send().await?.json().await?;
    assert_eq!(check, json!({ "isLoggedIn": false, "googleLogin": false }));

    let res = client.get(server.url("/auth/me")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn logging_in_twice_reuses_the_user() -> Result<()> {
    let Some(server) = common::server().await? else { return Ok(()) };
    let email = common::unique_email("repeat");

    let mut uids = Vec::new();
    for _ in 0..2 {
        let client = common::client()?;
        client
            .post(server.url("/auth/login"))
            .json(&json!({ "email": email }))
            .send()
            .await?;
        let me: Value = client.get(server.url("/auth/me")).send().await?.json().await?;
        uids.push(me["user"]["uid"].as_i64());
    }

    assert!(uids[0].is_some());
    assert_eq!(uids[0], uids[1]);
    Ok(())
}

#[tokio::test]
async fn login_validates_email() -> Result<()> {
    let Some(server) = common::server().await? else { return Ok(()) };
    let client = common::client()?;

    let res = client
        .post(server.url("/auth/login"))
        .json(&json!({ "email": "nobody@nowhere" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await?;
    assert_eq!(body["status"], "fail");

    let res = client.post(server.url("/auth/login")).json(&json!({})).send().await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        res.json::<Value>().await?["message"],
        "Missing required parameter 'email'"
    );
    Ok(())
}

#[tokio::test]
async fn forged_cookie_is_rejected() -> Result<()> {
    let Some(server) = common::server().await? else { return Ok(()) };

    let res = reqwest::Client::new()
        .get(server.url("/data-source"))
        .header(header::COOKIE, "sessionId=not-a-real-session")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn unknown_paths_serve_the_web_client() -> Result<()> {
    let Some(server) = common::server().await? else { return Ok(()) };

    let res = reqwest::get(server.url("/data-sources/12/consoles/3")).await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await?.contains("<div id=\"app\""));
    Ok(())
}
