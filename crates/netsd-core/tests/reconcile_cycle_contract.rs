//! Contract Test: Reconciliation Cycle
//!
//! Verifies the fetch → filter → publish cycle:
//! - each cycle publishes the filtered, fully-qualified target list
//! - the document is regenerated wholesale every cycle (full replace)
//! - an empty inventory result publishes an empty document, not an error
//!
//! If this test fails, the core discovery pipeline is broken.

mod common;

use std::time::Duration;

use common::*;
use netsd_core::DiscoveryEngine;

#[tokio::test(start_paused = true)]
async fn publishes_filtered_targets_on_the_first_cycle() {
    let inventory = ScriptedInventory::new();
    inventory.push_devices(&[
        "qa-de-1-asw201-bm001",
        "qa-de-1-asw202-bm999",
        "other-host",
    ]);
    let sink = RecordingSink::new();

    let (engine, _event_rx) = DiscoveryEngine::new(
        Box::new(inventory.clone()),
        Box::new(sink.clone()),
        test_config(60),
    )
    .expect("engine construction succeeds");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = tokio::spawn(async move { engine.run_with_shutdown(Some(shutdown_rx)).await });

    // The first tick fires immediately; give the cycle a moment to finish.
    tokio::time::sleep(Duration::from_millis(10)).await;

    shutdown_tx.send(()).unwrap();
    handle.await.unwrap().unwrap();

    assert_eq!(inventory.fetch_call_count(), 1);
    assert_eq!(sink.publish_call_count(), 1);

    let document = sink.last_published().expect("one document published");
    let group = &document.groups()[0];
    assert_eq!(
        group.targets,
        vec![
            "qa-de-1-asw201-bm001.cc.qa-de-1.cloud.sap",
            "qa-de-1-asw202-bm999.cc.qa-de-1.cloud.sap",
        ]
    );
    assert_eq!(group.job(), Some("asw-discovery"));
}

#[tokio::test(start_paused = true)]
async fn each_cycle_replaces_prior_content() {
    let inventory = ScriptedInventory::new();
    inventory.push_devices(&["qa-de-1-asw201-bm001"]);
    inventory.push_devices(&["qa-de-1-asw202-bm002"]);
    let sink = RecordingSink::new();

    let (engine, _event_rx) = DiscoveryEngine::new(
        Box::new(inventory.clone()),
        Box::new(sink.clone()),
        test_config(60),
    )
    .expect("engine construction succeeds");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = tokio::spawn(async move { engine.run_with_shutdown(Some(shutdown_rx)).await });

    tokio::time::sleep(Duration::from_millis(10)).await;
    tokio::time::sleep(Duration::from_secs(61)).await;

    shutdown_tx.send(()).unwrap();
    handle.await.unwrap().unwrap();

    let published = sink.published();
    assert_eq!(published.len(), 2);
    assert_eq!(
        published[0].groups()[0].targets,
        vec!["qa-de-1-asw201-bm001.cc.qa-de-1.cloud.sap"]
    );
    assert_eq!(
        published[1].groups()[0].targets,
        vec!["qa-de-1-asw202-bm002.cc.qa-de-1.cloud.sap"]
    );
}

#[tokio::test(start_paused = true)]
async fn empty_inventory_publishes_an_empty_document() {
    let inventory = ScriptedInventory::new();
    inventory.push_devices(&[]);
    let sink = RecordingSink::new();

    let (engine, _event_rx) = DiscoveryEngine::new(
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

    // Zero matching devices is valid: publish an empty list, don't error.
    assert_eq!(sink.publish_call_count(), 1);
    let document = sink.last_published().expect("empty document published");
    assert_eq!(document.target_count(), 0);
    assert_eq!(document.groups()[0].job(), Some("asw-discovery"));
}
