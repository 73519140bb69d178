//! Current inbound settings paired with the registry that realizes them.
//!
//! Reloads and admin updates go through here so that the stored settings and
//! the live listeners are changed under one lock, in the order they arrive.

use std::sync::Arc;

use arc_swap::ArcSwap;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::validation::{validate_inbound, ValidationError};
use crate::config::InboundConfig;
use crate::inbound::error::ApplyError;
use crate::inbound::registry::ListenerRegistry;

/// Why an [`InboundController::update`] did not fully take effect.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// The derived settings were rejected. Nothing was applied or stored.
    #[error("invalid inbound settings: {}", join(.0))]
    Invalid(Vec<ValidationError>),

    #[error(transparent)]
    Apply(#[from] ApplyError),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub struct InboundController {
    registry: Arc<ListenerRegistry>,
    current: ArcSwap<InboundConfig>,
    apply_lock: Mutex<()>,
}

impl InboundController {
    /// Wrap a registry that already reflects `initial`.
    pub fn new(registry: Arc<ListenerRegistry>, initial: InboundConfig) -> Self {
        Self {
            registry,
            current: ArcSwap::from_pointee(initial),
            apply_lock: Mutex::new(()),
        }
    }

    pub fn registry(&self) -> &Arc<ListenerRegistry> {
        &self.registry
    }

    /// Last settings handed to the registry. Lock-free.
    pub fn current(&self) -> Arc<InboundConfig> {
        self.current.load_full()
    }

    /// Apply new settings.
    ///
    /// The settings are stored even when some front-ends fail, since the
    /// registry has converged as far as it could towards them.
    pub async fn apply(&self, settings: InboundConfig) -> Result<(), ApplyError> {
        let _guard = self.apply_lock.lock().await;
        self.apply_locked(settings).await
    }

    /// Derive new settings from the current ones, validate and apply them.
    pub async fn update<F>(&self, f: F) -> Result<(), UpdateError>
    where
        F: FnOnce(&InboundConfig) -> InboundConfig,
    {
        let _guard = self.apply_lock.lock().await;
        let next = f(&self.current.load());
        validate_inbound(&next).map_err(UpdateError::Invalid)?;
        Ok(self.apply_locked(next).await?)
    }

    async fn apply_locked(&self, settings: InboundConfig) -> Result<(), ApplyError> {
        let result = self.registry.apply(&settings).await;
        self.current.store(Arc::new(settings));
        result
    }
}
