// ABOUTME: Structured error types returned by native health store adapters
// ABOUTME: Converted into AppError at the bridge boundary or recorded per workout sub-query
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use thiserror::Error;

/// Failures reported by a native health store adapter
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store is not installed or not usable on this device
    #[error("{store} is not available on this device")]
    Unavailable {
        /// Store display name
        store: String,
    },

    /// The store refused a read because the capability is not authorized
    #[error("{store} denied access to {capability}")]
    AuthorizationDenied {
        /// Store display name
        store: String,
        /// Native capability identifier
        capability: String,
    },

    /// The native call itself failed
    #[error("{store} call failed: {message}")]
    CallFailed {
        /// Store display name
        store: String,
        /// Underlying failure message
        message: String,
    },

    /// The store does not implement the requested operation
    #[error("{store} does not support {feature}")]
    UnsupportedFeature {
        /// Store display name
        store: String,
        /// Requested feature
        feature: String,
    },

    /// A capability identifier that belongs to another platform or none at all
    #[error("{store} does not know capability {capability}")]
    UnknownCapability {
        /// Store display name
        store: String,
        /// Native capability identifier
        capability: String,
    },
}

impl StoreError {
    /// Convenience constructor for a failed native call
    pub fn call_failed(store: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CallFailed {
            store: store.into(),
            message: message.into(),
        }
    }
}

/// Result alias used by native store adapters
pub type StoreResult<T> = Result<T, StoreError>;
