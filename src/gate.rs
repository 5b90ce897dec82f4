// ABOUTME: Permission gate wrapping every read path with a per-request grant snapshot
// ABOUTME: Direct queries are rejected when ungranted; bulk and optional paths degrade to empty
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Permission gate
//!
//! The gate fetches the granted capability set once per request and answers
//! every permission question from that snapshot, so no native authorization
//! error ever reaches the bucketer or the workout composer.
//!
//! Two policies apply:
//!
//! - [`PermissionGate::require`] rejects direct single-purpose reads (heart
//!   rate, HRV, oxygen saturation, sleep, workouts) with `PERMISSION_DENIED`
//! - [`PermissionGate::allows`] and [`PermissionGate::readable_metric`] let
//!   bulk and optional reads fall back to empty or absent results

use health_bridge_core::errors::{AppError, AppResult};
use health_bridge_core::permissions::LogicalPermission;
use std::collections::HashSet;
use tracing::debug;

use crate::catalog::PermissionCatalog;
use crate::metrics::LogicalMetric;
use crate::store::{HealthStore, NativeCapability, NativeMetric};

/// Granted capability identifiers captured at the start of a request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantSnapshot {
    granted: HashSet<String>,
}

impl GrantSnapshot {
    /// Snapshot over an explicit identifier set
    #[must_use]
    pub const fn new(granted: HashSet<String>) -> Self {
        Self { granted }
    }

    /// Fetch the granted set from the store
    ///
    /// # Errors
    ///
    /// Returns `ADAPTER_FAILURE` when the store cannot report its grants
    pub async fn capture(store: &dyn HealthStore) -> AppResult<Self> {
        let granted = store.granted_capabilities().await?;
        debug!(store = store.name(), granted = granted.len(), "Captured grant snapshot");
        Ok(Self { granted })
    }

    /// Granted identifiers
    #[must_use]
    pub const fn identifiers(&self) -> &HashSet<String> {
        &self.granted
    }
}

/// Permission checks for one request
#[derive(Debug, Clone)]
pub struct PermissionGate {
    catalog: PermissionCatalog,
    snapshot: GrantSnapshot,
}

impl PermissionGate {
    /// Gate over an existing snapshot
    #[must_use]
    pub const fn new(catalog: PermissionCatalog, snapshot: GrantSnapshot) -> Self {
        Self { catalog, snapshot }
    }

    /// Capture the store's grants and build a gate
    ///
    /// # Errors
    ///
    /// Returns `ADAPTER_FAILURE` when the store cannot report its grants
    pub async fn load(store: &dyn HealthStore) -> AppResult<Self> {
        let catalog = PermissionCatalog::for_platform(store.platform());
        Ok(Self::new(catalog, GrantSnapshot::capture(store).await?))
    }

    /// Catalog the gate checks against
    #[must_use]
    pub const fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    /// Captured snapshot
    #[must_use]
    pub const fn snapshot(&self) -> &GrantSnapshot {
        &self.snapshot
    }

    /// Granted capabilities backing `permission`
    #[must_use]
    pub fn readable_capabilities(&self, permission: LogicalPermission) -> Vec<NativeCapability> {
        self.catalog
            .native_capabilities_for(permission)
            .iter()
            .copied()
            .filter(|capability| self.catalog.can_read(*capability, self.snapshot.identifiers()))
            .collect()
    }

    /// Whether at least one capability backing `permission` may be read
    #[must_use]
    pub fn allows(&self, permission: LogicalPermission) -> bool {
        !self.readable_capabilities(permission).is_empty()
    }

    /// Reject the call unless `permission` may be read
    ///
    /// # Errors
    ///
    /// Returns `PERMISSION_DENIED` naming the permission, e.g.
    /// "Heart rate permission not granted"
    pub fn require(&self, permission: LogicalPermission) -> AppResult<()> {
        if self.allows(permission) {
            Ok(())
        } else {
            Err(AppError::permission_denied(permission.label()))
        }
    }

    /// Native metric restricted to granted sources, or `None` when nothing is readable
    ///
    /// Metrics that cannot be measured from a subset of sources need every
    /// source granted.
    #[must_use]
    pub fn readable_metric(&self, metric: &LogicalMetric) -> Option<NativeMetric> {
        let sources: Vec<NativeCapability> = metric
            .native
            .sources
            .iter()
            .copied()
            .filter(|capability| self.catalog.can_read(*capability, self.snapshot.identifiers()))
            .collect();

        let complete = sources.len() == metric.native.sources.len();
        if sources.is_empty() || !(complete || metric.partial_sources) {
            debug!(metric = metric.name, "Metric not readable, degrading to empty");
            return None;
        }

        Some(NativeMetric {
            identifier: metric.native.identifier,
            sources,
        })
    }
}
