//! End-to-end tests against a running gateway.

use reqwest::{header, StatusCode};

use decoy_gateway::config::DomainMappingConfig;
use decoy_gateway::GatewayConfig;

mod common;

#[tokio::test]
async fn test_login_redirects_on_any_host() {
    let (addr, shutdown) = common::start_gateway(GatewayConfig::default()).await;
    let client = common::client();

    for host in ["gh.example.com", "api-github-com.example.com", "nowhere.test"] {
        let res = client
            .get(format!("http://{addr}/login"))
            .header(header::HOST, host)
            .send()
            .await
            .expect("gateway unreachable");

        assert_eq!(res.status(), StatusCode::FOUND, "host {host}");
        assert_eq!(res.headers()[header::LOCATION], "https://www.987632.xyz");
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_plain_http_redirected_permanently() {
    let (addr, shutdown) = common::start_gateway(GatewayConfig::default()).await;

    let res = common::client()
        .get(format!("http://{addr}/owner/repo/issues?q=is%3Aopen"))
        .header(header::HOST, "gh.example.com")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        res.headers()[header::LOCATION],
        "https://gh.example.com/owner/repo/issues?q=is%3Aopen"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_unmapped_host_is_404() {
    let (addr, shutdown) = common::start_gateway(GatewayConfig::default()).await;

    let res = common::client()
        .get(format!("http://{addr}/owner/repo"))
        .header(header::HOST, "www.example.com")
        .header("x-forwarded-proto", "https")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), "Domain not configured for proxy");

    shutdown.trigger();
}

#[tokio::test]
async fn test_upstream_connection_failure_is_502() {
    let mut config = GatewayConfig::default();
    config.domains.mappings = vec![DomainMappingConfig::new("127.0.0.1:1", "gh.")];
    config.redirect.enforce_https = false;
    let (addr, shutdown) = common::start_gateway(config).await;

    let res = common::client()
        .get(format!("http://{addr}/owner/repo"))
        .header(header::HOST, "gh.example.com")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body = res.text().await.unwrap();
    assert!(body.starts_with("Proxy Error: "), "{body}");

    shutdown.trigger();
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let (addr, shutdown) = common::start_gateway(GatewayConfig::default()).await;

    let res = common::client()
        .get(format!("http://{addr}/missing"))
        .header(header::HOST, "nowhere.test")
        .header("x-forwarded-proto", "https")
        .header("x-request-id", "trace-me")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.headers()["x-request-id"], "trace-me");

    shutdown.trigger();
}
