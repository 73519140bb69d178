//! Admin API served over a mock-backed registry.

use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::json;
use tokio::net::TcpListener;

use inbound_listeners::admin::handlers::{ApplyFailure, ConfigsView, SystemStatus};
use inbound_listeners::admin::{setup_admin_router, AdminState};
use inbound_listeners::config::InboundConfig;
use inbound_listeners::inbound::{InboundController, Ports};
use inbound_listeners::Shutdown;

mod common;

use common::{mock_registry, MockFactories};

struct TestAdmin {
    url: String,
    controller: Arc<InboundController>,
    mocks: MockFactories,
    shutdown: Shutdown,
    client: reqwest::Client,
}

impl Drop for TestAdmin {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Serve the admin router on an ephemeral loopback port.
async fn start_admin(api_key: &str) -> TestAdmin {
    let (registry, mocks) = mock_registry();
    let settings = InboundConfig::default();
    registry.apply(&settings).await.unwrap();

    let controller = Arc::new(InboundController::new(Arc::new(registry), settings));
    let app = setup_admin_router(AdminState {
        controller: Arc::clone(&controller),
        api_key: api_key.into(),
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let stopped = shutdown.signalled();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(stopped)
            .await;
    });

    TestAdmin {
        url: format!("http://{addr}"),
        controller,
        mocks,
        shutdown,
        client: reqwest::Client::builder().no_proxy().build().unwrap(),
    }
}

#[tokio::test]
async fn get_configs_reports_live_ports() {
    let admin = start_admin("").await;

    let res = admin
        .client
        .get(format!("{}/configs", admin.url))
        .send()
        .await
        .expect("admin API unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    let view: ConfigsView = res.json().await.unwrap();
    assert_eq!(
        view,
        ConfigsView {
            ports: Ports {
                port: 7890,
                socks_port: 7891,
                redir_port: 0,
            },
            allow_lan: false,
            bind_address: "all".into(),
        }
    );
}

#[tokio::test]
async fn patch_changes_only_given_fields() {
    let admin = start_admin("").await;
    admin.mocks.recorder.clear();

    let res = admin
        .client
        .patch(format!("{}/configs", admin.url))
        .json(&json!({"socks-port": 1080, "allow-lan": true}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let current = admin.controller.current();
    assert_eq!(current.port, 7890);
    assert_eq!(current.socks_port, 1080);
    assert!(current.allow_lan);

    let registry = admin.controller.registry();
    let ports = registry.ports().await;
    assert_eq!(ports.port, 7890);
    assert_eq!(ports.socks_port, 1080);
    // Wildcard bind has an empty host.
    assert_eq!(registry.bind_address().await, "");
}

#[tokio::test]
async fn patch_reports_bind_failures() {
    let admin = start_admin("").await;
    admin.mocks.redirect.fail_on("127.0.0.1:7892");

    let res = admin
        .client
        .patch(format!("{}/configs", admin.url))
        .json(&json!({"redir-port": 7892}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let failure: ApplyFailure = res.json().await.unwrap();
    assert_eq!(failure.errors.len(), 1);
    assert!(failure.errors[0].contains("127.0.0.1:7892"));
    assert_eq!(admin.controller.current().redir_port, 7892);
    assert_eq!(admin.controller.registry().ports().await.redir_port, 0);
}

#[tokio::test]
async fn patch_rejects_unbracketed_ipv6_host() {
    let admin = start_admin("").await;
    admin.mocks.recorder.clear();

    let res = admin
        .client
        .patch(format!("{}/configs", admin.url))
        .json(&json!({"allow-lan": true, "bind-address": "::"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let failure: ApplyFailure = res.json().await.unwrap();
    assert_eq!(failure.message, "invalid inbound settings");
    assert_eq!(failure.errors.len(), 1);

    assert!(admin.mocks.recorder.events().is_empty());
    assert!(!admin.controller.current().allow_lan);
    assert_eq!(admin.controller.registry().ports().await.port, 7890);
}

#[tokio::test]
async fn patch_rejects_unknown_fields() {
    let admin = start_admin("").await;

    let res = admin
        .client
        .patch(format!("{}/configs", admin.url))
        .json(&json!({"mixed-port": 7893}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(admin.controller.current().port, 7890);
}

#[tokio::test]
async fn api_key_is_enforced() {
    let admin = start_admin("secret").await;
    let status_url = format!("{}/status", admin.url);

    let res = admin.client.get(&status_url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    for wrong in ["wrong", "secre", "secret2"] {
        let res = admin
            .client
            .get(&status_url)
            .bearer_auth(wrong)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "token {wrong}");
    }

    let res = admin
        .client
        .get(&status_url)
        .bearer_auth("secret")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let status: SystemStatus = res.json().await.unwrap();
    assert_eq!(status.bind_address, "127.0.0.1");
    assert_eq!(
        status.listeners.get("socks-udp").map(String::as_str),
        Some("127.0.0.1:7891")
    );
    assert!(!status.listeners.contains_key("redirect"));
}
