use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

pub const SYNC_PATH: &str = "/sheet-sync";

/// The server binary running on a private port. Killed on drop.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    /// Spawn with no Google credentials at all, so every sheet access fails
    /// at authentication time while the rest of the surface still works.
    pub fn spawn_unconfigured() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Empty values are treated as unset and are not overridden by a local .env
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_sheet-sync"));
        cmd.env("SHEET_SYNC_PORT", port.to_string())
            .env("SHEET_SYNC_BIND", "127.0.0.1")
            .env("SHEET_SYNC_PATH", SYNC_PATH)
            .env("GOOGLE_SERVICE_ACCOUNT_EMAIL", "")
            .env("GOOGLE_PRIVATE_KEY", "")
            .env("GOOGLE_PRIVATE_KEY_BASE64", "")
            .env("SHEET_ID", "")
            .env("RUST_LOG", "warn")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    pub fn sync_url(&self) -> String {
        format!("{}{}", self.base_url, SYNC_PATH)
    }

    pub async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

pub async fn start_server() -> Result<TestServer> {
    let server = TestServer::spawn_unconfigured()?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

pub fn assert_cors(headers: &reqwest::header::HeaderMap) {
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-headers"], "Content-Type");
    assert_eq!(headers["access-control-allow-methods"], "GET, POST, OPTIONS");
}
