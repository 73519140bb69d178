//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use inbound_listeners::inbound::{
    Factories, FrontEndKind, ListenerError, ListenerFactory, ListenerHandle, ListenerRegistry,
};

/// Something a mock factory or handle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Create(FrontEndKind, String),
    Close(FrontEndKind, String),
}

/// Ordered log of factory and handle activity across all kinds.
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<Event>>,
}

impl Recorder {
    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn creates(&self, kind: FrontEndKind) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Create(k, _) if *k == kind))
            .count()
    }

    pub fn closes(&self, kind: FrontEndKind) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Close(k, _) if *k == kind))
            .count()
    }
}

pub struct MockHandle {
    kind: FrontEndKind,
    address: String,
    recorder: Arc<Recorder>,
}

impl ListenerHandle for MockHandle {
    fn address(&self) -> &str {
        &self.address
    }

    fn close(self: Box<Self>) -> BoxFuture<'static, ()> {
        async move {
            self.recorder.push(Event::Close(self.kind, self.address.clone()));
        }
        .boxed()
    }
}

/// Factory that records every create attempt and fails on chosen addresses.
pub struct MockFactory {
    kind: FrontEndKind,
    recorder: Arc<Recorder>,
    failing: Mutex<HashSet<String>>,
    delay: Mutex<Option<Duration>>,
}

impl MockFactory {
    fn new(kind: FrontEndKind, recorder: Arc<Recorder>) -> Self {
        Self {
            kind,
            recorder,
            failing: Mutex::new(HashSet::new()),
            delay: Mutex::new(None),
        }
    }

    /// Make every create for `address` fail with address-in-use.
    pub fn fail_on(&self, address: &str) {
        self.failing.lock().unwrap().insert(address.to_string());
    }

    /// Let creates for `address` succeed again.
    pub fn recover(&self, address: &str) {
        self.failing.lock().unwrap().remove(address);
    }

    /// Make every create take `delay` before completing.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }
}

impl ListenerFactory for MockFactory {
    fn create<'a>(
        &'a self,
        address: &'a str,
    ) -> BoxFuture<'a, Result<Box<dyn ListenerHandle>, ListenerError>> {
        async move {
            let delay = *self.delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            self.recorder
                .push(Event::Create(self.kind, address.to_string()));

            if self.failing.lock().unwrap().contains(address) {
                return Err(ListenerError::Bind {
                    kind: self.kind,
                    address: address.to_string(),
                    source: io::Error::new(io::ErrorKind::AddrInUse, "address in use"),
                });
            }

            let handle: Box<dyn ListenerHandle> = Box::new(MockHandle {
                kind: self.kind,
                address: address.to_string(),
                recorder: Arc::clone(&self.recorder),
            });
            Ok(handle)
        }
        .boxed()
    }
}

/// Mock factories for every kind, sharing one recorder.
pub struct MockFactories {
    pub recorder: Arc<Recorder>,
    pub http: Arc<MockFactory>,
    pub socks_tcp: Arc<MockFactory>,
    pub socks_udp: Arc<MockFactory>,
    pub redirect: Arc<MockFactory>,
}

impl MockFactories {
    pub fn new() -> Self {
        let recorder = Arc::new(Recorder::default());
        let mock = |kind| Arc::new(MockFactory::new(kind, Arc::clone(&recorder)));
        Self {
            http: mock(FrontEndKind::Http),
            socks_tcp: mock(FrontEndKind::SocksTcp),
            socks_udp: mock(FrontEndKind::SocksUdp),
            redirect: mock(FrontEndKind::Redirect),
            recorder,
        }
    }

    pub fn factories(&self) -> Factories {
        Factories {
            http: self.http.clone(),
            socks_tcp: self.socks_tcp.clone(),
            socks_udp: self.socks_udp.clone(),
            redirect: self.redirect.clone(),
        }
    }
}

/// A registry over mock factories.
pub fn mock_registry() -> (ListenerRegistry, MockFactories) {
    let mocks = MockFactories::new();
    let registry = ListenerRegistry::new(mocks.factories());
    (registry, mocks)
}
