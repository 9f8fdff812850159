mod common;

use hqc_engine::queue::JobStatus;
use hqc_engine::{ErrorCode, GenerationOptions, GenerationQueue, Settings};

use common::*;

#[test]
fn jobs_run_in_order_with_their_own_settings() {
    let provider = ScriptedProvider::always(GOOD_ARTICLE);
    let store = memory_store();
    let orch = orchestrator(Settings::default(), StubCollector::scored(Some(0.6)), &provider, store.clone());

    let strict = Settings {
        hqc_threshold: 90.0,
        ..Settings::default()
    };
    let mut queue = GenerationQueue::new();
    let first = queue.enqueue("Hotel Sakura", "Kyoto", GenerationOptions::default(), &Settings::default());
    let second = queue.enqueue("Hotel Ume", "Kyoto", GenerationOptions::default(), &strict);
    let third = queue.enqueue("Hotel Matsu", "Nara", GenerationOptions::default(), &Settings::default());

    let reports = queue.process_batch(&orch, 2);
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].job_id, first);
    assert!(reports[0].outcome.is_success());
    assert_eq!(reports[1].job_id, second);
    assert_eq!(reports[1].outcome.error_code(), Some(ErrorCode::LowHqcScore));
    assert_eq!(queue.len(), 1);
    assert_eq!(queue.pending().next().map(|j| j.id), Some(third));

    // A zero batch size still makes progress.
    let reports = queue.process_batch(&orch, 0);
    assert_eq!(reports.len(), 1);
    assert!(queue.is_empty());

    let statuses: Vec<JobStatus> = queue.finished().iter().map(|j| j.status).collect();
    assert_eq!(
        statuses,
        vec![JobStatus::Completed, JobStatus::Failed, JobStatus::Completed]
    );
    let failed = queue.finished()[1].outcome.as_ref().unwrap();
    assert_eq!(failed.error_code, Some(ErrorCode::LowHqcScore));
    assert!(failed.post_id.is_none());
    assert_eq!(store.len(), 2);
    assert_eq!(provider.call_count(), 2);
}

#[test]
fn empty_queue_processes_nothing() {
    let provider = ScriptedProvider::always(GOOD_ARTICLE);
    let orch = orchestrator(Settings::default(), StubCollector::scored(None), &provider, memory_store());
    let mut queue = GenerationQueue::new();
    assert!(queue.process_batch(&orch, 5).is_empty());
    assert_eq!(provider.call_count(), 0);
}

#[test]
fn finished_history_keeps_only_the_latest_jobs() {
    let provider = ScriptedProvider::always(GOOD_ARTICLE);
    let orch = orchestrator(Settings::default(), StubCollector::scored(None), &provider, memory_store());
    let mut queue = GenerationQueue::new().with_history_limit(2);
    let ids: Vec<u64> = (0..5)
        .map(|i| queue.enqueue(format!("Hotel {i}"), "Kyoto", GenerationOptions::default(), &Settings::default()))
        .collect();

    let reports = queue.process_batch(&orch, 10);
    assert_eq!(reports.len(), 5);
    let kept: Vec<u64> = queue.finished().iter().map(|j| j.id).collect();
    assert_eq!(kept, ids[3..].to_vec());

    let json = serde_json::to_string(&queue).unwrap();
    let restored: GenerationQueue = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.finished().len(), 2);
}
