#![allow(dead_code)]

use std::net::SocketAddr;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{extract::State, routing::post, Json, Router};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
    // Never written; the OS closes it when this test binary exits and the
    // server shuts down on EOF
    _stdin: ChildStdin,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Inherit environment so the server sees DATABASE_URL
        let mut child = Command::new(env!("CARGO_BIN_EXE_search-console"))
            .args(["serve", "--exit-on-stdin-close"])
            .env("APP_ENV", "development")
            .env("HOST", "127.0.0.1")
            .env("PORT", port.to_string())
            .env("RATE_LIMIT_ENABLED", "false")
            .env("SEARCH_TIMEOUT_SECS", "2")
            .env("WEB_STATIC_DIR", concat!(env!("CARGO_MANIFEST_DIR"), "/web"))
            .env_remove("GOOGLE_CLIENT_ID")
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to spawn server binary")?;
        let stdin = child.stdin.take().context("server stdin was not piped")?;

        Ok(Self { port, base_url, child, _stdin: stdin })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(format!("{}/health", self.base_url)).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Shared server for this test binary, or None when no database is configured
pub async fn server() -> Result<Option<&'static TestServer>> {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set, skipping integration test");
        return Ok(None);
    }
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(20)).await?;
    Ok(Some(server))
}

pub fn client() -> Result<Client> {
    Ok(Client::builder().cookie_store(true).build()?)
}

pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, uuid::Uuid::new_v4().simple())
}

/// Cookie-carrying client logged in as a fresh user
pub async fn login(server: &TestServer) -> Result<Client> {
    let client = client()?;
    let res = client
        .post(server.url("/auth/login"))
        .json(&json!({ "email": unique_email("user") }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
    Ok(client)
}

pub async fn create_data_source(server: &TestServer, client: &Client, body: Value) -> Result<Value> {
    let res = client.post(server.url("/data-source")).json(&body).send().await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "create failed: {}", res.status());
    let body: Value = res.json().await?;
    Ok(body["dataSource"].clone())
}

/// In-process stand-in for a Vespa container; remembers every request body
pub struct FakeVespa {
    pub addr: SocketAddr,
    pub requests: Arc<Mutex<Vec<Value>>>,
}

impl FakeVespa {
    pub async fn start() -> Result<Self> {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/search/", post(answer))
            .with_state(requests.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { addr, requests })
    }

    pub fn last_request(&self) -> Option<Value> {
        self.requests.lock().ok()?.last().cloned()
    }
}

async fn answer(State(requests): State<Arc<Mutex<Vec<Value>>>>, Json(body): Json<Value>) -> Json<Value> {
    if let Ok(mut requests) = requests.lock() {
        requests.push(body.clone());
    }
    Json(json!({
        "timing": { "querytime": 0.004, "summaryfetchtime": 0.001, "searchtime": 0.006 },
        "root": {
            "id": "toplevel",
            "relevance": 1.0,
            "fields": { "totalCount": 1 },
            "coverage": { "coverage": 100, "documents": 1, "full": true, "nodes": 1 },
            "children": [{
                "id": "id:music:music::1",
                "relevance": 0.5,
                "fields": { "title": "Hello", "artist": "World" }
            }]
        }
    }))
}
