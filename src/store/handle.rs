// ABOUTME: Lazily connected native store handle with explicit tri-state availability
// ABOUTME: Connects on first use, reuses the connected store and retries after failed checks
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use async_trait::async_trait;
use health_bridge_core::errors::{AppError, AppResult, StoreResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::HealthStore;

/// Result of the most recent availability check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    /// No check has run yet
    Unchecked,
    /// Connected and usable
    Available,
    /// The last check failed or the store reported itself unusable
    Unavailable,
}

/// Opens a connection to the native store
#[async_trait]
pub trait StoreConnector: Send + Sync {
    /// Connect, returning the store even if it reports itself unavailable
    async fn connect(&self) -> StoreResult<Arc<dyn HealthStore>>;
}

/// Connector that hands out an already constructed store
pub struct ReadyConnector {
    store: Arc<dyn HealthStore>,
}

#[async_trait]
impl StoreConnector for ReadyConnector {
    async fn connect(&self) -> StoreResult<Arc<dyn HealthStore>> {
        Ok(Arc::clone(&self.store))
    }
}

enum HandleState {
    Unchecked,
    Connected(Arc<dyn HealthStore>),
    Unavailable,
}

/// Process-wide handle to the native store
///
/// The first [`StoreHandle::availability`] or [`StoreHandle::store`] call runs
/// the connector. A connected, available store is kept for the handle's
/// lifetime; a failed or unavailable check is retried on the next call.
pub struct StoreHandle {
    connector: Box<dyn StoreConnector>,
    state: Mutex<HandleState>,
}

impl StoreHandle {
    /// Handle that connects through `connector` on first use
    #[must_use]
    pub fn new(connector: impl StoreConnector + 'static) -> Self {
        Self {
            connector: Box::new(connector),
            state: Mutex::new(HandleState::Unchecked),
        }
    }

    /// Handle around an existing store, still checked lazily
    #[must_use]
    pub fn from_store(store: Arc<dyn HealthStore>) -> Self {
        Self::new(ReadyConnector { store })
    }

    /// Current state without triggering a connection
    pub async fn peek(&self) -> Availability {
        match *self.state.lock().await {
            HandleState::Unchecked => Availability::Unchecked,
            HandleState::Connected(_) => Availability::Available,
            HandleState::Unavailable => Availability::Unavailable,
        }
    }

    /// Connect if needed and report availability
    pub async fn availability(&self) -> Availability {
        match self.connected().await {
            Some(_) => Availability::Available,
            None => Availability::Unavailable,
        }
    }

    /// Connected store
    ///
    /// # Errors
    ///
    /// Returns `ADAPTER_FAILURE` when the store cannot be connected or
    /// reports itself unusable
    pub async fn store(&self) -> AppResult<Arc<dyn HealthStore>> {
        self.connected()
            .await
            .ok_or_else(|| AppError::store_unavailable("The native health store"))
    }

    /// Connected store even when it reports itself unusable
    ///
    /// Used for deep links that matter most when the store is missing, such as
    /// the Health Connect store listing.
    ///
    /// # Errors
    ///
    /// Returns `ADAPTER_FAILURE` when the connector fails
    pub async fn any_store(&self) -> AppResult<Arc<dyn HealthStore>> {
        let mut state = self.state.lock().await;
        if let HandleState::Connected(store) = &*state {
            return Ok(Arc::clone(store));
        }
        self.attempt(&mut state)
            .await
            .ok_or_else(|| AppError::store_unavailable("The native health store"))
    }

    async fn connected(&self) -> Option<Arc<dyn HealthStore>> {
        let mut state = self.state.lock().await;
        if let HandleState::Connected(store) = &*state {
            return Some(Arc::clone(store));
        }
        self.attempt(&mut state)
            .await
            .filter(|store| store.is_available())
    }

    /// Run the connector and record the outcome
    async fn attempt(&self, state: &mut HandleState) -> Option<Arc<dyn HealthStore>> {
        match self.connector.connect().await {
            Ok(store) if store.is_available() => {
                info!(store = store.name(), "Native health store connected");
                *state = HandleState::Connected(Arc::clone(&store));
                Some(store)
            }
            Ok(store) => {
                warn!(store = store.name(), "Native health store reports itself unavailable");
                *state = HandleState::Unavailable;
                Some(store)
            }
            Err(e) => {
                warn!(error = %e, "Native health store connection failed");
                *state = HandleState::Unavailable;
                None
            }
        }
    }
}
