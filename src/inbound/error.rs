//! Error types for listener reconfiguration.

use std::io;

use thiserror::Error;

use crate::inbound::kind::FrontEndKind;

/// Failure to bring a front-end up on its desired address.
///
/// Returned verbatim from `reconfigure`; the affected slot is always left
/// empty when one of these is produced.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The host/port pair cannot be turned into a bind target.
    #[error("invalid bind address `{address}`: {reason}")]
    AddressResolution { address: String, reason: String },

    /// The factory failed to acquire the address.
    #[error("failed to bind {kind} listener on `{address}`: {source}")]
    Bind {
        kind: FrontEndKind,
        address: String,
        #[source]
        source: io::Error,
    },
}

impl ListenerError {
    pub fn address(&self) -> &str {
        match self {
            ListenerError::AddressResolution { address, .. } => address,
            ListenerError::Bind { address, .. } => address,
        }
    }
}

/// Failures collected while applying a whole inbound section.
///
/// Every front-end is attempted even when an earlier one fails.
#[derive(Debug, Error)]
#[error("{} front-end(s) failed to apply: {}", .failures.len(), summary(.failures))]
pub struct ApplyError {
    pub failures: Vec<ListenerError>,
}

fn summary(failures: &[ListenerError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
