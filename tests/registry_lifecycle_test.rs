use std::sync::Arc;
use std::time::Duration;

use http_body_util::BodyExt;
use httpmock::prelude::*;
use serde_json::json;
use tokio::time::{Instant, timeout};
use tower::ServiceExt;

use eureka_opizontas::services::client::SERVICE_PATH;
use eureka_opizontas::services::{RegistryFetcher, RegistryTransport, RegistrationState};
use eureka_opizontas::{DiscoveryCache, EurekaConfig, EurekaError, LifecycleSupervisor, server};

fn config_for(server: &MockServer, fetch_registry: bool) -> EurekaConfig {
    EurekaConfig::from_toml_str(&format!(
        r#"
        service_name = "svc1"
        service_url = "{}/"
        ip_address = "10.0.0.5"
        instance_port = 5000
        heartbeat_interval = 1
        fetch_registry = {fetch_registry}
        "#,
        server.base_url()
    ))
    .expect("Failed to build test config")
}

fn svc_b_listing() -> serde_json::Value {
    json!({
        "applications": {
            "application": [
                {
                    "name": "svcB",
                    "instance": [ { "ipAddr": "1.2.3.4", "port": { "$": 8080 }, "status": "UP" } ]
                }
            ]
        }
    })
}

#[tokio::test]
async fn test_start_registers_instance_and_shutdown_deregisters() {
    let server = MockServer::start();
    let register = server.mock(|when, then| {
        when.method(POST)
            .path("/eureka/apps/svc1")
            .header("content-type", "application/json")
            .body_includes("\"instanceId\":\"10.0.0.5:5000\"");
        then.status(204);
    });
    let cancel = server.mock(|when, then| {
        when.method(DELETE).path("/eureka/apps/svc1/10.0.0.5:5000");
        then.status(200);
    });

    let supervisor = LifecycleSupervisor::new(&config_for(&server, false))
        .expect("Failed to create supervisor");
    supervisor.start().await.expect("Initial registration should succeed");

    register.assert_calls(1);
    assert_eq!(supervisor.client().state(), RegistrationState::Registered);
    assert_eq!(supervisor.client().instance_id(), "10.0.0.5:5000");

    timeout(Duration::from_secs(5), supervisor.shutdown())
        .await
        .expect("Shutdown should not hang");

    cancel.assert_calls(1);
    assert_eq!(supervisor.client().state(), RegistrationState::Unregistered);
}

#[tokio::test]
async fn test_start_propagates_initial_registration_failure() {
    let server = MockServer::start();
    let register = server.mock(|when, then| {
        when.method(POST).path("/eureka/apps/svc1");
        then.status(500);
    });

    let supervisor = LifecycleSupervisor::new(&config_for(&server, true))
        .expect("Failed to create supervisor");
    let result = supervisor.start().await;

    assert!(matches!(result, Err(EurekaError::Registration(_))));
    register.assert_calls(1);
    assert!(supervisor.cache().is_empty());
}

#[tokio::test]
async fn test_start_propagates_unreachable_registry() {
    // 绑定后立即释放的端口，连接会被拒绝
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read local addr");
    drop(listener);

    let config = EurekaConfig::from_toml_str(&format!(
        r#"
        service_name = "svc1"
        service_url = "http://{addr}/"
        ip_address = "10.0.0.5"
        instance_port = 5000
        request_timeout = 2
        fetch_registry = true
        "#
    ))
    .expect("Failed to build test config");

    let supervisor = LifecycleSupervisor::new(&config).expect("Failed to create supervisor");
    let result = timeout(Duration::from_secs(5), supervisor.start())
        .await
        .expect("Start should fail fast on a refused connection");

    assert!(
        matches!(result, Err(EurekaError::Registration(_))),
        "got {result:?}"
    );
    assert_eq!(supervisor.client().state(), RegistrationState::Unregistered);
    assert!(supervisor.cache().is_empty());
}

#[tokio::test]
async fn test_fetch_loop_populates_discovery_cache() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/eureka/apps/svc1");
        then.status(204);
    });
    let fetch = server.mock(|when, then| {
        when.method(GET).path("/eureka/apps");
        then.status(200).json_body(svc_b_listing());
    });

    let supervisor = LifecycleSupervisor::new(&config_for(&server, true))
        .expect("Failed to create supervisor");
    supervisor.start().await.expect("Initial registration should succeed");

    let cache = supervisor.cache();
    let deadline = Instant::now() + Duration::from_secs(5);
    while cache.is_empty() {
        assert!(Instant::now() < deadline, "Fetch loop never populated the cache");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert!(fetch.calls() >= 1);
    let snapshot = cache.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot["svcB"], vec!["http://1.2.3.4:8080".to_string()]);

    // 宿主路由读取同一份缓存
    let response = server::app(&supervisor)
        .oneshot(
            http::Request::get("/")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), http::StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value, json!({ "svcB": ["http://1.2.3.4:8080"] }));

    supervisor.shutdown().await;
}

#[tokio::test]
async fn test_fetch_merges_with_previously_known_services() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/eureka/apps");
        then.status(200).json_body(svc_b_listing());
    });

    let cache = Arc::new(DiscoveryCache::new());
    cache.merge([("A".to_string(), vec!["http://10.0.0.1:80".to_string()])].into());

    let transport = RegistryTransport::connect(&server.base_url()).expect("Failed to create transport");
    let fetcher = RegistryFetcher::new(transport, cache.clone(), Duration::from_secs(30));
    fetcher
        .fetch_once(SERVICE_PATH)
        .await
        .expect("Fetch should succeed");

    let snapshot = cache.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot["A"], vec!["http://10.0.0.1:80".to_string()]);
    assert_eq!(snapshot["svcB"], vec!["http://1.2.3.4:8080".to_string()]);
}
