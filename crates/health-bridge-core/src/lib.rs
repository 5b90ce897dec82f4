// ABOUTME: Core types and constants for the health bridge normalization engine
// ABOUTME: Foundation crate with error handling, permissions, time ranges and normalized models
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![deny(unsafe_code)]

//! # Health Bridge Core
//!
//! Foundation crate providing the shared vocabulary of the health bridge. It
//! changes rarely, so the engine crate on top of it recompiles independently.
//!
//! ## Modules
//!
//! - **errors**: `AppError`, `ErrorCode`, the wire `ErrorResponse` and `StoreError`
//! - **constants**: limits, command names, sub-query keys and native identifiers
//! - **permissions**: logical permission vocabulary and partial parsing
//! - **platform**: Health Connect vs HealthKit
//! - **time**: half-open time ranges, bucket periods, timestamp formatting
//! - **models**: normalized samples, workouts and sleep records

/// Unified error handling with stable error codes
pub mod errors;

/// Constants organized by domain
pub mod constants;

/// Logical permissions with bitflags
pub mod permissions;

/// Native store platform identifiers
pub mod platform;

/// Time ranges and bucket periods
pub mod time;

/// Normalized, JSON-serializable models
pub mod models;
