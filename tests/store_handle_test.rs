// ABOUTME: Integration tests for the lazily connected store handle
// ABOUTME: Covers tri-state availability, retry after failed checks and store reuse
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use async_trait::async_trait;
use health_bridge::bridge::HealthBridge;
use health_bridge::config::BridgeConfig;
use health_bridge::errors::{ErrorCode, StoreError, StoreResult};
use health_bridge::platform::Platform;
use health_bridge::store::{
    Availability, HealthStore, InMemoryHealthStore, StoreConnector, StoreHandle,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Connector that fails its first `failures` attempts and counts every attempt
struct FlakyConnector {
    attempts: Arc<AtomicUsize>,
    failures: usize,
    store: Arc<InMemoryHealthStore>,
}

impl FlakyConnector {
    fn new(failures: usize, store: InMemoryHealthStore) -> (Self, Arc<AtomicUsize>) {
        let attempts = Arc::new(AtomicUsize::new(0));
        let connector = Self {
            attempts: Arc::clone(&attempts),
            failures,
            store: Arc::new(store),
        };
        (connector, attempts)
    }
}

#[async_trait]
impl StoreConnector for FlakyConnector {
    async fn connect(&self) -> StoreResult<Arc<dyn HealthStore>> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            return Err(StoreError::call_failed("Health Connect", "service not bound yet"));
        }
        let store: Arc<dyn HealthStore> = self.store.clone();
        Ok(store)
    }
}

#[tokio::test]
async fn test_peek_does_not_connect() {
    common::init_test_logging();
    let (connector, attempts) =
        FlakyConnector::new(0, InMemoryHealthStore::new(Platform::HealthConnect));
    let handle = StoreHandle::new(connector);

    assert_eq!(handle.peek().await, Availability::Unchecked);
    assert_eq!(attempts.load(Ordering::SeqCst), 0);

    assert_eq!(handle.availability().await, Availability::Available);
    assert_eq!(handle.peek().await, Availability::Available);
}

#[tokio::test]
async fn test_failed_check_is_retried() {
    common::init_test_logging();
    let (connector, attempts) =
        FlakyConnector::new(1, InMemoryHealthStore::new(Platform::HealthKit));
    let handle = StoreHandle::new(connector);

    assert_eq!(handle.availability().await, Availability::Unavailable);
    assert_eq!(handle.peek().await, Availability::Unavailable);

    let store = handle.store().await.unwrap();
    assert_eq!(store.platform(), Platform::HealthKit);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_connected_store_is_reused() {
    common::init_test_logging();
    let (connector, attempts) =
        FlakyConnector::new(0, InMemoryHealthStore::new(Platform::HealthConnect));
    let handle = StoreHandle::new(connector);

    handle.store().await.unwrap();
    handle.store().await.unwrap();
    handle.availability().await;

    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unavailable_store_is_rejected_but_reachable_for_links() {
    common::init_test_logging();
    let (connector, _) = FlakyConnector::new(
        0,
        InMemoryHealthStore::new(Platform::HealthConnect).unavailable(),
    );
    let handle = StoreHandle::new(connector);

    assert_eq!(handle.availability().await, Availability::Unavailable);

    let err = handle.store().await.err().unwrap();
    assert_eq!(err.code, ErrorCode::AdapterFailure);

    let store = handle.any_store().await.unwrap();
    assert!(!store.is_available());
}

#[tokio::test]
async fn test_connector_failure_blocks_deep_links_too() {
    common::init_test_logging();
    let (connector, _) = FlakyConnector::new(
        usize::MAX,
        InMemoryHealthStore::new(Platform::HealthConnect),
    );
    let handle = StoreHandle::new(connector);

    let err = handle.any_store().await.err().unwrap();
    assert_eq!(err.code, ErrorCode::AdapterFailure);
}

#[tokio::test]
async fn test_bridge_shares_one_handle_across_calls() {
    common::init_test_logging();
    let (connector, attempts) =
        FlakyConnector::new(0, InMemoryHealthStore::new(Platform::HealthKit));
    let bridge = HealthBridge::new(StoreHandle::new(connector), BridgeConfig::default()).unwrap();

    assert_eq!(bridge.handle().peek().await, Availability::Unchecked);
    assert!(bridge.is_health_available().await.available);
    assert!(bridge.is_health_available().await.available);

    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}
