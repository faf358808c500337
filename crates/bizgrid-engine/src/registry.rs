//! In-memory job registry shared between the HTTP surface and job tasks.
//!
//! One producer (the job's own task) mutates a record through [`JobRegistry::update`];
//! any number of readers take snapshots. All mutation happens under the
//! write lock in a single closure, so a reader never observes a torn
//! progress/stats/status combination. Records are never deleted within the
//! process lifetime.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use bizgrid_core::{Business, JobStatus, RunStats, SearchJobConfig, StopReason};

/// Externally visible length of a job id (a UUID v4 prefix).
const JOB_ID_LEN: usize = 8;

/// The full observable state of one discovery job.
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub job_id: String,
    pub status: JobStatus,
    /// 0..=100, recomputed after each (keyword, location) pair.
    pub progress: u8,
    pub config: SearchJobConfig,
    /// Populated only once the job completes; empty for failed and
    /// cancelled jobs.
    pub businesses: Vec<Business>,
    pub stats: RunStats,
    /// Count of accepted businesses so far; equals `businesses.len()` once
    /// the job completes.
    pub valid_count: u64,
    pub stop_reason: Option<StopReason>,
    pub stop_detail: String,
    pub current_keyword: String,
    pub current_city: String,
    pub created_at: DateTime<Utc>,
}

struct JobEntry {
    record: JobRecord,
    cancel: Arc<AtomicBool>,
}

/// Process-wide map from job id to job state. Cheap to clone; clones share
/// the same underlying store.
#[derive(Clone, Default)]
pub struct JobRegistry {
    inner: Arc<RwLock<HashMap<String, JobEntry>>>,
}

impl JobRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pending job for `config` and returns its id.
    pub async fn create(&self, config: SearchJobConfig) -> String {
        let job_id: String = Uuid::new_v4().simple().to_string()[..JOB_ID_LEN].to_owned();
        let record = JobRecord {
            job_id: job_id.clone(),
            status: JobStatus::Pending,
            progress: 0,
            config,
            businesses: Vec::new(),
            stats: RunStats::default(),
            valid_count: 0,
            stop_reason: None,
            stop_detail: String::new(),
            current_keyword: String::new(),
            current_city: String::new(),
            created_at: Utc::now(),
        };

        let mut jobs = self.inner.write().await;
        jobs.insert(
            job_id.clone(),
            JobEntry {
                record,
                cancel: Arc::new(AtomicBool::new(false)),
            },
        );
        job_id
    }

    /// A point-in-time copy of a job's state.
    pub async fn snapshot(&self, job_id: &str) -> Option<JobRecord> {
        let jobs = self.inner.read().await;
        jobs.get(job_id).map(|entry| entry.record.clone())
    }

    /// Mutates a job's record under the write lock. All fields changed by
    /// `mutate` become visible to readers together.
    pub async fn update<F>(&self, job_id: &str, mutate: F)
    where
        F: FnOnce(&mut JobRecord),
    {
        let mut jobs = self.inner.write().await;
        if let Some(entry) = jobs.get_mut(job_id) {
            mutate(&mut entry.record);
        }
    }

    /// Requests cancellation of a running or pending job. Returns `true` if
    /// the job exists and was not already terminal; the engine observes the
    /// flag at its next iteration boundary.
    pub async fn cancel(&self, job_id: &str) -> bool {
        let jobs = self.inner.read().await;
        match jobs.get(job_id) {
            Some(entry) if !entry.record.status.is_terminal() => {
                entry.cancel.store(true, Ordering::Relaxed);
                true
            }
            _ => false,
        }
    }

    /// The cancellation flag shared with a job's engine task.
    pub async fn cancel_flag(&self, job_id: &str) -> Option<Arc<AtomicBool>> {
        let jobs = self.inner.read().await;
        jobs.get(job_id).map(|entry| Arc::clone(&entry.cancel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bizgrid_core::GeographyMode;

    fn config() -> SearchJobConfig {
        SearchJobConfig {
            keywords: vec!["plumber".to_owned()],
            geography_mode: GeographyMode::State,
            state: "TX".to_owned(),
            cities: None,
            min_results: 10,
        }
    }

    #[tokio::test]
    async fn create_returns_short_id_and_pending_record() {
        let registry = JobRegistry::new();
        let job_id = registry.create(config()).await;

        assert_eq!(job_id.len(), 8);
        let record = registry.snapshot(&job_id).await.expect("job exists");
        assert_eq!(record.status, JobStatus::Pending);
        assert_eq!(record.progress, 0);
        assert!(record.businesses.is_empty());
    }

    #[tokio::test]
    async fn snapshot_of_unknown_job_is_none() {
        let registry = JobRegistry::new();
        assert!(registry.snapshot("nope").await.is_none());
    }

    #[tokio::test]
    async fn update_changes_are_visible_atomically() {
        let registry = JobRegistry::new();
        let job_id = registry.create(config()).await;

        registry
            .update(&job_id, |job| {
                job.status = JobStatus::Running;
                job.progress = 40;
                job.stats.total_searched = 7;
            })
            .await;

        let record = registry.snapshot(&job_id).await.expect("job exists");
        assert_eq!(record.status, JobStatus::Running);
        assert_eq!(record.progress, 40);
        assert_eq!(record.stats.total_searched, 7);
    }

    #[tokio::test]
    async fn cancel_sets_flag_for_live_jobs_only() {
        let registry = JobRegistry::new();
        let job_id = registry.create(config()).await;

        assert!(registry.cancel(&job_id).await);
        let flag = registry.cancel_flag(&job_id).await.expect("flag exists");
        assert!(flag.load(Ordering::Relaxed));

        registry
            .update(&job_id, |job| job.status = JobStatus::Completed)
            .await;
        assert!(!registry.cancel(&job_id).await, "terminal jobs cannot be cancelled");
        assert!(!registry.cancel("missing").await);
    }

    #[tokio::test]
    async fn clones_share_the_same_store() {
        let registry = JobRegistry::new();
        let job_id = registry.create(config()).await;

        let clone = registry.clone();
        assert!(clone.snapshot(&job_id).await.is_some());
    }
}
