mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/health", server.base_url)).send().await?;

    assert_eq!(res.status(), StatusCode::OK);
    common::assert_cors(res.headers());
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn preflight_succeeds_without_credentials() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .request(Method::OPTIONS, server.sync_url())
        .header("Origin", "https://tracker.example.com")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    common::assert_cors(res.headers());
    assert!(res.text().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn unsupported_methods_get_405() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    for method in [Method::PUT, Method::DELETE, Method::PATCH] {
        let res = client.request(method.clone(), server.sync_url()).send().await?;
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED, "{}", method);
        common::assert_cors(res.headers());
        let body = res.json::<serde_json::Value>().await?;
        assert_eq!(body["error"], "Method not allowed");
    }
    Ok(())
}

#[tokio::test]
async fn missing_credentials_surface_on_sheet_access() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(server.sync_url()).send().await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    common::assert_cors(res.headers());

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "CONFIGURATION_ERROR");
    assert!(
        body["details"].as_str().unwrap_or_default().contains("GOOGLE_SERVICE_ACCOUNT_EMAIL"),
        "unexpected body: {}",
        body
    );
    Ok(())
}

#[tokio::test]
async fn malformed_post_is_bad_request() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.sync_url())
        .header("Content-Type", "application/json")
        .body("{\"userId\": ")
        .send()
        .await?;

    // Rejected before authentication, so the missing credentials never matter
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    common::assert_cors(res.headers());
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "INVALID_JSON");
    Ok(())
}
