mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn create_comes_with_a_default_console() -> Result<()> {
    let Some(server) = common::server().await? else { return Ok(()) };
    let client = common::login(server).await?;

    let data_source = common::create_data_source(
        server,
        &client,
        json!({ "name": "Music", "search_url": "http://localhost", "search_port": "8080" }),
    )
    .await?;
    assert_eq!(data_source["name"], "Music");
    assert_eq!(data_source["search_port"], 8080);
    assert_eq!(data_source["document_url"], Value::Null);

    let list: Value = client.get(server.url("/data-source")).send().await?.json().await?;
    assert_eq!(list["pagination"], json!({ "limit": 100, "offset": 0, "total": 1 }));
    let item = &list["items"][0];
    assert_eq!(item["id"], data_source["id"]);
    assert_eq!(item["consoles"].as_array().map(Vec::len), Some(1));
    assert_eq!(item["consoles"][0]["name"], "Default");
    assert_eq!(item["consoles"][0]["is_default"], true);
    Ok(())
}

#[tokio::test]
async fn list_is_paginated_in_creation_order() -> Result<()> {
    let Some(server) = common::server().await? else { return Ok(()) };
    let client = common::login(server).await?;

    for name in ["first", "second", "third"] {
        common::create_data_source(server, &client, json!({ "name": name })).await?;
    }

    let page: Value = client
        .get(server.url("/data-source?limit=2&offset=1"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(page["pagination"], json!({ "limit": 2, "offset": 1, "total": 3 }));
    let names: Vec<_> = page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(names, vec!["second", "third"]);
    Ok(())
}

#[tokio::test]
async fn update_is_partial() -> Result<()> {
    let Some(server) = common::server().await? else { return Ok(()) };
    let client = common::login(server).await?;
    let data_source = common::create_data_source(
        server,
        &client,
        json!({ "name": "Books", "search_url": "http://vespa", "search_port": 8080 }),
    )
    .await?;
    let url = server.url(&format!("/data-source/{}", data_source["id"]));

    let res = client
        .put(&url)
        .json(&json!({ "config_url": "http://vespa-config", "config_port": 19071, "name": null }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await?;
    assert_eq!(updated["dataSource"]["name"], "Books");
    assert_eq!(updated["dataSource"]["search_port"], 8080);
    assert_eq!(updated["dataSource"]["config_port"], 19071);

    let fetched: Value = client.get(&url).send().await?.json().await?;
    assert_eq!(fetched["dataSource"]["config_url"], "http://vespa-config");
    Ok(())
}

#[tokio::test]
async fn validation_errors() -> Result<()> {
    let Some(server) = common::server().await? else { return Ok(()) };
    let client = common::login(server).await?;

    let res = client
        .post(server.url("/data-source"))
        .json(&json!({ "search_url": "http://vespa" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["message"], "Data source name is required");

    let res = client
        .post(server.url("/data-source"))
        .json(&json!({ "name": "x", "search_port": "http" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let res = client.get(server.url("/data-source/abc")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["message"], "Invalid data source ID");
    Ok(())
}

#[tokio::test]
async fn other_users_data_sources_are_invisible() -> Result<()> {
    let Some(server) = common::server().await? else { return Ok(()) };
    let owner = common::login(server).await?;
    let stranger = common::login(server).await?;

    let data_source = common::create_data_source(server, &owner, json!({ "name": "Private" })).await?;
    let url = server.url(&format!("/data-source/{}", data_source["id"]));

    assert_eq!(stranger.get(&url).send().await?.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        stranger.put(&url).json(&json!({ "name": "Mine" })).send().await?.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(stranger.delete(&url).send().await?.status(), StatusCode::NOT_FOUND);

    let list: Value = stranger.get(server.url("/data-source")).send().await?.json().await?;
    assert_eq!(list["pagination"]["total"], 0);

    assert_eq!(owner.get(&url).send().await?.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn delete_removes_consoles_too() -> Result<()> {
    let Some(server) = common::server().await? else { return Ok(()) };
    let client = common::login(server).await?;
    let data_source = common::create_data_source(server, &client, json!({ "name": "Temp" })).await?;
    let id = &data_source["id"];

    let res = client.delete(server.url(&format!("/data-source/{}", id))).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({ "status": "ok" }));

    let res = client.get(server.url(&format!("/data-source/{}", id))).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let consoles: Value = client.get(server.url("/console")).send().await?.json().await?;
    assert_eq!(consoles["consoles"], json!([]));
    Ok(())
}
