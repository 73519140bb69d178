//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Detect front-ends competing for the same port
//! - Validate value ranges and addresses of the auxiliary listeners
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{InboundConfig, ProxyConfig};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{first} and {second} both use port {port}")]
    PortConflict {
        first: &'static str,
        second: &'static str,
        port: u16,
    },

    #[error("bind-address must not be empty when allow-lan is set")]
    EmptyBindAddress,

    #[error("bind-address `{0}` contains ':'; IPv6 hosts must be bracketed, e.g. `[::]`")]
    UnbracketedBindAddress(String),

    #[error("max-connections must be greater than zero")]
    ZeroMaxConnections,

    #[error("{field} `{value}` is not a socket address")]
    InvalidAddress { field: &'static str, value: String },
}

pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = inbound_errors(&config.inbound);

    if config.limits.max_connections == 0 {
        errors.push(ValidationError::ZeroMaxConnections);
    }

    if config.admin.enabled && config.admin.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "admin.bind-address",
            value: config.admin.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics-address",
            value: config.observability.metrics_address.clone(),
        });
    }

    into_result(errors)
}

/// Checks that only concern the `[inbound]` section.
///
/// Also used for settings that arrive through the admin API.
pub fn validate_inbound(inbound: &InboundConfig) -> Result<(), Vec<ValidationError>> {
    into_result(inbound_errors(inbound))
}

fn into_result(errors: Vec<ValidationError>) -> Result<(), Vec<ValidationError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn inbound_errors(inbound: &InboundConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let ports = [
        ("port", inbound.port),
        ("socks-port", inbound.socks_port),
        ("redir-port", inbound.redir_port),
    ];
    for (i, (first, a)) in ports.iter().enumerate() {
        for (second, b) in &ports[i + 1..] {
            if *a != 0 && a == b {
                errors.push(ValidationError::PortConflict {
                    first,
                    second,
                    port: *a,
                });
            }
        }
    }

    if inbound.allow_lan {
        let host = inbound.bind_address.as_str();
        if host.trim().is_empty() {
            errors.push(ValidationError::EmptyBindAddress);
        } else if host.contains(':') && !(host.starts_with('[') && host.ends_with(']')) {
            // The host is joined with the port verbatim.
            errors.push(ValidationError::UnbracketedBindAddress(host.to_string()));
        }
    }

    errors
}
