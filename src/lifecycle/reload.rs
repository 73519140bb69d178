//! Applying a reloaded configuration to the running listeners.
//!
//! The inbound section is applied on every reload, even when it equals the
//! stored settings. Live front-ends are no-ops in the registry, so only
//! slots left empty by an earlier bind failure reach the factory again.

use crate::config::{LimitsConfig, ProxyConfig};
use crate::inbound::{ApplyError, InboundController};

/// Apply `config.inbound` and log the outcome.
///
/// `limits` are the limits the factories were built with. A change to them
/// is only reported.
pub async fn apply_reload(
    controller: &InboundController,
    limits: &LimitsConfig,
    config: ProxyConfig,
) -> Result<(), ApplyError> {
    if config.limits != *limits {
        tracing::warn!("Listener limits changed; restart to apply them");
    }
    let unchanged = *controller.current() == config.inbound;

    match controller.apply(config.inbound).await {
        Ok(()) => {
            let ports = controller.registry().ports().await;
            if unchanged {
                tracing::debug!("Inbound settings unchanged");
            } else {
                tracing::info!(
                    port = ports.port,
                    socks_port = ports.socks_port,
                    redir_port = ports.redir_port,
                    "Inbound settings reloaded"
                );
            }
            Ok(())
        }
        Err(e) => {
            for failure in &e.failures {
                tracing::error!(error = %failure, "Front-end failed to rebind");
            }
            Err(e)
        }
    }
}
