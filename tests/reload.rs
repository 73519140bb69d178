//! Config reloads against a mock-backed registry.

use inbound_listeners::config::ProxyConfig;
use inbound_listeners::inbound::{FrontEndKind, InboundController};
use inbound_listeners::lifecycle::{apply_reload, startup};

mod common;

use common::{Event, MockFactories};

async fn started(mocks: &MockFactories, config: &ProxyConfig) -> InboundController {
    let registry = startup::start(config, mocks.factories()).await;
    InboundController::new(registry, config.inbound.clone())
}

#[tokio::test]
async fn identical_reload_retries_failed_front_end() {
    let mocks = MockFactories::new();
    mocks.http.fail_on("127.0.0.1:7890");
    let config = ProxyConfig::default();

    let controller = started(&mocks, &config).await;
    assert!(!controller.registry().is_bound(FrontEndKind::Http).await);
    assert_eq!(*controller.current(), config.inbound);

    // Port freed by whoever held it.
    mocks.http.recover("127.0.0.1:7890");
    mocks.recorder.clear();

    apply_reload(&controller, &config.limits, config.clone())
        .await
        .unwrap();

    assert!(controller.registry().is_bound(FrontEndKind::Http).await);
    assert_eq!(controller.registry().ports().await.port, 7890);
    assert_eq!(
        mocks.recorder.events(),
        vec![Event::Create(FrontEndKind::Http, "127.0.0.1:7890".into())]
    );
}

#[tokio::test]
async fn identical_reload_leaves_live_listeners_alone() {
    let mocks = MockFactories::new();
    let config = ProxyConfig::default();
    let controller = started(&mocks, &config).await;
    mocks.recorder.clear();

    apply_reload(&controller, &config.limits, config.clone())
        .await
        .unwrap();

    assert!(mocks.recorder.events().is_empty());
}

#[tokio::test]
async fn reload_reports_front_ends_still_failing() {
    let mocks = MockFactories::new();
    mocks.http.fail_on("127.0.0.1:7890");
    let config = ProxyConfig::default();
    let controller = started(&mocks, &config).await;

    let err = apply_reload(&controller, &config.limits, config.clone())
        .await
        .unwrap_err();

    assert_eq!(err.failures.len(), 1);
    assert_eq!(mocks.recorder.creates(FrontEndKind::Http), 2);
    assert!(controller.registry().is_bound(FrontEndKind::SocksTcp).await);
}

#[tokio::test]
async fn changed_reload_moves_listeners() {
    let mocks = MockFactories::new();
    let config = ProxyConfig::default();
    let controller = started(&mocks, &config).await;
    mocks.recorder.clear();

    let mut next = config.clone();
    next.inbound.socks_port = 1080;
    apply_reload(&controller, &config.limits, next).await.unwrap();

    assert_eq!(controller.registry().ports().await.socks_port, 1080);
    assert_eq!(controller.current().socks_port, 1080);
    assert_eq!(mocks.recorder.closes(FrontEndKind::SocksUdp), 1);
    assert_eq!(mocks.recorder.creates(FrontEndKind::SocksUdp), 1);
}
