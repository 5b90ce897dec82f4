// ABOUTME: Unified error handling for the health bridge with stable error codes
// ABOUTME: Defines AppError, ErrorCode and the wire ErrorResponse envelope returned to hosts
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Unified Error Handling
//!
//! Every bridge entry point returns `AppResult<T>`. Errors carry a stable
//! [`ErrorCode`] that hosts can switch on, a human-readable message, and an
//! optional [`ErrorContext`] with the request id of the failing call.
//!
//! The taxonomy mirrors the propagation policy of the bridge:
//!
//! - **Validation** (`InvalidArgument`, `UnsupportedMetric`, `UnsupportedBucket`):
//!   raised before any native store call is attempted
//! - **Authorization** (`PermissionDenied`): raised only by direct single-purpose
//!   queries; aggregate paths degrade to empty results instead
//! - **Native store** (`AdapterFailure`): the underlying store call failed or
//!   the store is missing; inside workout composition these are recorded per
//!   sub-query. A missing store is reported as a state only by
//!   `isHealthAvailable`

/// Errors returned by native store adapters
pub mod store;

pub use store::{StoreError, StoreResult};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation
    /// A required parameter is missing or could not be parsed
    InvalidArgument,
    /// The requested logical metric has no mapping
    UnsupportedMetric,
    /// The requested bucket period is not supported by the store
    UnsupportedBucket,

    // Authorization
    /// The capability backing a direct query has not been granted
    PermissionDenied,

    // Native store
    /// A native store call failed or the store is not usable on this device
    AdapterFailure,

    // Configuration
    /// Configuration values are out of range
    ConfigInvalid,

    // Internal
    /// Response payload could not be serialized
    SerializationError,
}

impl ErrorCode {
    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "The provided arguments are invalid",
            Self::UnsupportedMetric => "The requested data type is not supported",
            Self::UnsupportedBucket => "The requested bucket size is not supported",
            Self::PermissionDenied => "The required health permission has not been granted",
            Self::AdapterFailure => "The native health store call failed",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::SerializationError => "Data serialization failed",
        }
    }
}

/// Additional context that can be attached to errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Request ID of the bridge call that failed
    pub request_id: Option<String>,
    /// Additional key-value context
    pub details: Value,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            request_id: None,
            details: Value::Null,
        }
    }
}

/// Unified error type for the bridge
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Additional context
    pub context: ErrorContext,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add a request ID to the error context
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.context.request_id = Some(request_id.into());
        self
    }

    /// Add details to the error context
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.context.details = details;
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Missing or unparseable parameter
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    /// Logical metric without a native mapping
    pub fn unsupported_metric(name: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::UnsupportedMetric,
            format!("Unsupported dataType: {name}"),
        )
    }

    /// Bucket period the store cannot slice by
    pub fn unsupported_bucket(bucket: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::UnsupportedBucket,
            format!("Unsupported bucket: {bucket}"),
        )
    }

    /// Permission missing on a direct query path
    pub fn permission_denied(label: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::PermissionDenied,
            format!("{label} permission not granted"),
        )
    }

    /// Native store call failed
    pub fn adapter_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AdapterFailure, message)
    }

    /// Native store not present on this device
    pub fn store_unavailable(store: impl fmt::Display) -> Self {
        Self::adapter_failure(format!("{store} is not available on this device"))
    }

    /// Configuration value rejected
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalid, message)
    }

    /// Serialization failure
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SerializationError, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization(error.to_string()).with_source(error)
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        let code = match &error {
            StoreError::AuthorizationDenied { .. } => ErrorCode::PermissionDenied,
            StoreError::UnsupportedFeature { .. } => ErrorCode::UnsupportedBucket,
            StoreError::Unavailable { .. }
            | StoreError::CallFailed { .. }
            | StoreError::UnknownCapability { .. } => ErrorCode::AdapterFailure,
        };
        Self::new(code, error.to_string()).with_source(error)
    }
}

/// Error envelope returned to the host when a call is rejected
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error payload
    pub error: ErrorResponseDetails,
}

/// Body of an [`ErrorResponse`]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponseDetails {
    /// Stable error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Request ID of the failing call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Extra structured details
    #[serde(skip_serializing_if = "Value::is_null", default)]
    pub details: Value,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            error: ErrorResponseDetails {
                code: error.code,
                message: error.message,
                request_id: error.context.request_id,
                details: error.context.details,
            },
        }
    }
}
