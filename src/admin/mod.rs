//! Admin API.
//!
//! ```text
//! GET   /status    version, reported bind host, live listener addresses
//! GET   /configs   ports and LAN exposure
//! PATCH /configs   change any of port / socks-port / redir-port /
//!                  allow-lan / bind-address; applied immediately
//! ```

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::inbound::InboundController;

/// State shared by the admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub controller: Arc<InboundController>,
    /// Bearer token; empty disables authentication.
    pub api_key: Arc<str>,
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/status", get(get_status))
        .route("/configs", get(get_configs).patch(patch_configs))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
