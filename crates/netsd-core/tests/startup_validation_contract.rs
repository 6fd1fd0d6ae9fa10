//! Contract Test: Startup Validation & Shutdown
//!
//! Verifies the fatal-error boundary and deterministic shutdown:
//! - an invalid region refuses engine construction before any network call
//! - invalid configuration is rejected at construction
//! - a shutdown signal stops the loop promptly, with a Stopped event
//!
//! If this test fails, misconfiguration could reach the network or the
//! daemon could ignore termination requests.

mod common;

use std::time::Duration;

use common::*;
use netsd_core::{DiscoveryEngine, EngineEvent, Error};

#[tokio::test]
async fn invalid_region_fails_before_any_network_call() {
    let inventory = ScriptedInventory::new();
    let sink = RecordingSink::new();

    let mut config = test_config(60);
    config.region = "QA-DE-1".to_string();

    let result = DiscoveryEngine::new(
        Box::new(inventory.clone()),
        Box::new(sink.clone()),
        config,
    );

    match result {
        Err(Error::InvalidRegion(value)) => assert_eq!(value, "QA-DE-1"),
        other => panic!("expected InvalidRegion, got {:?}", other.map(|_| ())),
    }

    // Construction failed before the inventory or sink were ever touched.
    assert_eq!(inventory.fetch_call_count(), 0);
    assert_eq!(sink.publish_call_count(), 0);
}

#[tokio::test]
async fn zero_refresh_interval_is_rejected() {
    let inventory = ScriptedInventory::new();
    let sink = RecordingSink::new();

    let config = test_config(0);

    let result = DiscoveryEngine::new(Box::new(inventory), Box::new(sink), config);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_the_loop_and_emits_stopped() {
    let inventory = ScriptedInventory::new();
    inventory.push_devices(&["qa-de-1-asw201-bm001"]);
    let sink = RecordingSink::new();

    let (engine, mut event_rx) = DiscoveryEngine::new(
        Box::new(inventory.clone()),
        Box::new(sink.clone()),
        test_config(60),
    )
    .expect("engine construction succeeds");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = tokio::spawn(async move { engine.run_with_shutdown(Some(shutdown_rx)).await });

    tokio::time::sleep(Duration::from_millis(10)).await;
    shutdown_tx.send(()).unwrap();
    handle.await.unwrap().unwrap();

    let publishes_at_shutdown = sink.publish_call_count();

    // Long after shutdown, no further cycles have run.
    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(sink.publish_call_count(), publishes_at_shutdown);

    let mut saw_stopped = false;
    while let Ok(event) = event_rx.try_recv() {
        if matches!(event, EngineEvent::Stopped { .. }) {
            saw_stopped = true;
        }
    }
    assert!(saw_stopped, "expected a Stopped event");
}
