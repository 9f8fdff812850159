//! FIFO of generation jobs, each carrying the settings it was enqueued with.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Settings;
use crate::error::ErrorCode;
use crate::orchestrator::{GenerationOutcome, GenerationRequest, Orchestrator};
use crate::types::GenerationOptions;

pub type JobId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedJob {
    pub id: JobId,
    pub hotel_name: String,
    pub location: String,
    pub options: GenerationOptions,
    /// Frozen at enqueue time; later settings changes do not affect the job.
    pub settings: Settings,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<JobOutcome>,
}

/// Compact result kept in the queue history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hqc_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
}

impl From<&GenerationOutcome> for JobOutcome {
    fn from(outcome: &GenerationOutcome) -> Self {
        match outcome {
            GenerationOutcome::Success(article) => JobOutcome {
                post_id: Some(article.post_id),
                hqc_score: Some(article.hqc_score),
                error_code: None,
            },
            GenerationOutcome::Failure(failure) => JobOutcome {
                post_id: None,
                hqc_score: None,
                error_code: Some(failure.error_code),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    pub job_id: JobId,
    pub hotel_name: String,
    pub outcome: GenerationOutcome,
}

const DEFAULT_HISTORY_LIMIT: usize = 100;

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationQueue {
    next_id: JobId,
    pending: VecDeque<QueuedJob>,
    /// Most recent finished jobs, oldest first, at most `history_limit`.
    finished: VecDeque<QueuedJob>,
    #[serde(default = "default_history_limit")]
    history_limit: usize,
}

impl Default for GenerationQueue {
    fn default() -> Self {
        Self {
            next_id: 0,
            pending: VecDeque::new(),
            finished: VecDeque::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl GenerationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the finished-job history; zero keeps none.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self.trim_history();
        self
    }

    fn trim_history(&mut self) {
        while self.finished.len() > self.history_limit {
            self.finished.pop_front();
        }
    }

    pub fn enqueue(
        &mut self,
        hotel_name: impl Into<String>,
        location: impl Into<String>,
        options: GenerationOptions,
        settings: &Settings,
    ) -> JobId {
        self.next_id += 1;
        let job = QueuedJob {
            id: self.next_id,
            hotel_name: hotel_name.into(),
            location: location.into(),
            options,
            settings: settings.clone(),
            status: JobStatus::Pending,
            outcome: None,
        };
        debug!(job_id = job.id, hotel = %job.hotel_name, "Job enqueued");
        self.pending.push_back(job);
        self.next_id
    }

    pub fn pending(&self) -> impl Iterator<Item = &QueuedJob> {
        self.pending.iter()
    }

    pub fn finished(&self) -> &VecDeque<QueuedJob> {
        &self.finished
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Runs up to `batch_size` pending jobs (at least one) in order.
    pub fn process_batch(&mut self, orchestrator: &Orchestrator, batch_size: usize) -> Vec<JobReport> {
        let take = batch_size.max(1).min(self.pending.len());
        let mut reports = Vec::with_capacity(take);

        for _ in 0..take {
            let Some(mut job) = self.pending.pop_front() else {
                break;
            };
            let request = GenerationRequest {
                hotel_name: job.hotel_name.clone(),
                location: job.location.clone(),
                options: job.options.clone(),
            };
            let outcome = orchestrator.generate_with_settings(&request, &job.settings);

            job.status = if outcome.is_success() {
                JobStatus::Completed
            } else {
                JobStatus::Failed
            };
            job.outcome = Some(JobOutcome::from(&outcome));
            info!(job_id = job.id, hotel = %job.hotel_name, status = ?job.status, "Job processed");

            reports.push(JobReport {
                job_id: job.id,
                hotel_name: job.hotel_name.clone(),
                outcome,
            });
            self.finished.push_back(job);
            self.trim_history();
        }
        reports
    }
}
