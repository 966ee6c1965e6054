//! Execution coordinator behavior: coalescing, ordering, failure isolation
//! and shutdown.

mod common;

use common::*;
use ditter::error::ExecutionError;
use ditter::services::{Completion, Coordinator, Runner};
use ditter_core::{process, Plan};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

async fn next(completions: &mut UnboundedReceiver<Completion>) -> Completion {
    tokio::time::timeout(COMPLETION_TIMEOUT, completions.recv())
        .await
        .expect("timed out waiting for a completion")
        .expect("completion stream closed early")
}

async fn closed(completions: &mut UnboundedReceiver<Completion>) -> bool {
    tokio::time::timeout(COMPLETION_TIMEOUT, completions.recv())
        .await
        .expect("timed out waiting for the stream to close")
        .is_none()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_jobs_submitted_while_running_coalesce_to_latest() {
    let (backend, mut gate) = GatedBackend::new();
    let (mut coordinator, mut completions) =
        Coordinator::spawn(Runner::with_accelerator(Arc::new(backend)));

    let a = coordinator.submit(gradient(16, 16), &ordered_params()).unwrap();
    gate.wait_started().await;

    let b = coordinator.submit(gradient(16, 16), &ordered_params()).unwrap();
    let c = coordinator.submit(grey(16, 16, 40), &ordered_params()).unwrap();
    assert!(a < b && b < c, "ids increase with submission order");

    gate.release();
    let first = next(&mut completions).await;
    assert_eq!(first.id, a);
    assert!(first.superseded, "A finished after B and C were submitted");
    assert!(first.result.is_ok());

    gate.wait_started().await;
    gate.release();
    let second = next(&mut completions).await;
    assert_eq!(second.id, c, "B was coalesced away, C runs next");
    assert!(!second.superseded, "C is the latest submission");
    assert_eq!(second.backend, "gated");

    drop(coordinator);
    assert!(closed(&mut completions).await, "B must never complete");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_dropping_handle_drains_running_and_queued() {
    let (backend, mut gate) = GatedBackend::new();
    let (mut coordinator, mut completions) =
        Coordinator::spawn(Runner::with_accelerator(Arc::new(backend)));

    let a = coordinator.submit(grey(8, 8, 10), &ordered_params()).unwrap();
    gate.wait_started().await;
    let b = coordinator.submit(grey(8, 8, 20), &ordered_params()).unwrap();
    drop(coordinator);

    gate.release();
    gate.release();
    assert_eq!(next(&mut completions).await.id, a);
    assert_eq!(next(&mut completions).await.id, b);
    assert!(closed(&mut completions).await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_panicking_job_fails_and_queue_keeps_draining() {
    let runner = Runner::with_accelerator(Arc::new(PanicOnceBackend::default()));
    let (mut coordinator, mut completions) = Coordinator::spawn(runner);

    let a = coordinator.submit(grey(8, 8, 100), &ordered_params()).unwrap();
    let b = coordinator.submit(grey(8, 8, 255), &ordered_params()).unwrap();

    let first = next(&mut completions).await;
    assert_eq!(first.id, a);
    assert_eq!(
        first.result.unwrap_err(),
        ExecutionError::Panicked("simulated device crash".into())
    );

    let second = next(&mut completions).await;
    assert_eq!(second.id, b);
    let image = second.result.expect("the coordinator survives a panicking job");
    assert!(image.pixels().all(|p| p == [255, 255, 255, 255]));
}

#[tokio::test]
async fn test_completion_matches_direct_processing() {
    let (mut coordinator, mut completions) = Coordinator::spawn(Runner::cpu_only());
    let source = gradient(37, 21);
    let params = diffusion_params();

    coordinator.submit(source.clone(), &params).unwrap();
    let done = next(&mut completions).await;

    let expected = process(&source, &Plan::from_params(&params).unwrap());
    assert_eq!(done.backend, "cpu");
    assert_eq!(done.result.unwrap(), expected);
}

#[tokio::test]
async fn test_sequential_plans_bypass_accelerator() {
    let (backend, _gate) = GatedBackend::new();
    let (mut coordinator, mut completions) =
        Coordinator::spawn(Runner::with_accelerator(Arc::new(backend)));

    // Never released: error diffusion must not wait on the accelerator.
    coordinator.submit(grey(8, 8, 128), &diffusion_params()).unwrap();
    let done = next(&mut completions).await;
    assert_eq!(done.backend, "cpu");
    assert!(done.result.is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_burst_of_submissions_ends_with_latest() {
    let (mut coordinator, mut completions) = Coordinator::spawn(Runner::cpu_only());
    let mut last = 0;
    for i in 0..20u8 {
        last = coordinator
            .submit(grey(64, 64, i * 10), &diffusion_params())
            .unwrap();
    }
    drop(coordinator);

    let mut ids = vec![];
    let mut final_superseded = true;
    while let Some(done) = completions.recv().await {
        assert!(done.result.is_ok());
        ids.push(done.id);
        final_superseded = done.superseded;
    }

    assert!(!ids.is_empty());
    assert!(
        ids.windows(2).all(|w| w[0] < w[1]),
        "completions arrive in submission order: {ids:?}"
    );
    assert_eq!(ids.last(), Some(&last), "the latest submission always runs");
    assert!(!final_superseded);
    assert!(ids.len() <= 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_resubmitted_frame_is_shared_not_copied() {
    let (backend, mut gate) = GatedBackend::new();
    let (mut coordinator, mut completions) =
        Coordinator::spawn(Runner::with_accelerator(Arc::new(backend)));
    let frame = Arc::new(gradient(32, 32));

    coordinator.submit(Arc::clone(&frame), &ordered_params()).unwrap();
    gate.wait_started().await;
    coordinator.submit(Arc::clone(&frame), &ordered_params()).unwrap();
    assert_eq!(Arc::strong_count(&frame), 3, "both jobs hold the caller's frame");

    gate.release();
    next(&mut completions).await.result.unwrap();
    gate.wait_started().await;
    gate.release();
    next(&mut completions).await.result.unwrap();
    assert_eq!(Arc::strong_count(&frame), 1, "finished jobs release the frame");
}

#[tokio::test]
async fn test_zero_area_job_completes_empty() {
    let (mut coordinator, mut completions) = Coordinator::spawn(Runner::cpu_only());
    coordinator
        .submit(grey(0, 5, 0), &ordered_params())
        .unwrap();
    let image = next(&mut completions).await.result.unwrap();
    assert_eq!((image.width(), image.height()), (0, 5));
    assert!(image.is_empty());
}
