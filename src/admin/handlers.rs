use std::collections::BTreeMap;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::admin::AdminState;
use crate::config::InboundConfig;
use crate::inbound::{FrontEndKind, Ports, UpdateError};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SystemStatus {
    pub version: String,
    /// Host of the first bound front-end, empty when none is bound.
    pub bind_address: String,
    /// Address per bound front-end kind.
    pub listeners: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigsView {
    #[serde(flatten)]
    pub ports: Ports,
    pub allow_lan: bool,
    pub bind_address: String,
}

/// Partial update of the inbound settings. Absent fields keep their value.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigsPatch {
    pub port: Option<u16>,
    pub socks_port: Option<u16>,
    pub redir_port: Option<u16>,
    pub allow_lan: Option<bool>,
    pub bind_address: Option<String>,
}

impl ConfigsPatch {
    pub fn merge_into(self, base: &InboundConfig) -> InboundConfig {
        InboundConfig {
            port: self.port.unwrap_or(base.port),
            socks_port: self.socks_port.unwrap_or(base.socks_port),
            redir_port: self.redir_port.unwrap_or(base.redir_port),
            allow_lan: self.allow_lan.unwrap_or(base.allow_lan),
            bind_address: self
                .bind_address
                .unwrap_or_else(|| base.bind_address.clone()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApplyFailure {
    pub message: String,
    pub errors: Vec<String>,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let registry = state.controller.registry();

    let mut listeners = BTreeMap::new();
    for kind in FrontEndKind::ALL {
        if let Some(address) = registry.address(kind).await {
            listeners.insert(kind.to_string(), address);
        }
    }

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        bind_address: registry.bind_address().await,
        listeners,
    })
}

pub async fn get_configs(State(state): State<AdminState>) -> Json<ConfigsView> {
    let settings = state.controller.current();
    Json(ConfigsView {
        ports: state.controller.registry().ports().await,
        allow_lan: settings.allow_lan,
        bind_address: settings.bind_address.clone(),
    })
}

pub async fn patch_configs(
    State(state): State<AdminState>,
    Json(patch): Json<ConfigsPatch>,
) -> Response {
    tracing::info!(patch = ?patch, "Applying inbound settings from admin API");

    match state
        .controller
        .update(move |current| patch.merge_into(current))
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(UpdateError::Invalid(errors)) => {
            tracing::warn!(errors = ?errors, "Rejected inbound settings from admin API");
            let body = ApplyFailure {
                message: "invalid inbound settings".to_string(),
                errors: errors.iter().map(ToString::to_string).collect(),
            };
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
        Err(UpdateError::Apply(e)) => {
            tracing::warn!(error = %e, "Admin settings partly applied");
            let body = ApplyFailure {
                message: "one or more front-ends failed to bind".to_string(),
                errors: e.failures.iter().map(ToString::to_string).collect(),
            };
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
    }
}
