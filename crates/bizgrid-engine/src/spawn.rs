//! Fire-and-forget execution of discovery jobs.
//!
//! Each submitted job runs as its own tokio task. The task's outcome —
//! including panics — is always written back into the job registry, so the
//! only way a caller observes a job is through its record.

use std::any::Any;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use futures::FutureExt;

use bizgrid_core::regions::{load_regions, resolve_locations, RegionsFile};
use bizgrid_core::{AppConfig, JobStatus, StopReason};
use bizgrid_places::PlacesClient;
use bizgrid_scraper::EmailScraper;

use crate::engine::{DiscoveryEngine, EngineSettings};
use crate::registry::JobRegistry;

/// Spawns the background task for a previously created job.
///
/// The job moves `Pending → Running → {Completed, Failed, Cancelled}`
/// entirely within the spawned task; this function returns immediately.
pub fn spawn_job(registry: &JobRegistry, config: &AppConfig, job_id: &str) {
    let registry = registry.clone();
    let config = config.clone();
    let job_id = job_id.to_owned();

    tokio::spawn(async move {
        let result = std::panic::AssertUnwindSafe(run_job(&registry, &config, &job_id))
            .catch_unwind()
            .await;

        if let Err(panic) = result {
            let detail = panic_detail(panic.as_ref());
            tracing::error!(job_id = %job_id, detail = %detail, "discovery job panicked");
            mark_failed(&registry, &job_id, StopReason::Error, detail).await;
        }
    });
}

async fn run_job(registry: &JobRegistry, config: &AppConfig, job_id: &str) {
    let Some(snapshot) = registry.snapshot(job_id).await else {
        tracing::error!(job_id, "spawned for unknown job id");
        return;
    };
    let job_config = snapshot.config;

    let Some(api_key) = config.places_api_key.clone() else {
        mark_failed(
            registry,
            job_id,
            StopReason::ApiKeyMissing,
            StopReason::ApiKeyMissing.default_detail().to_owned(),
        )
        .await;
        return;
    };

    let overrides = load_region_overrides(config);
    let locations = resolve_locations(&job_config, overrides.as_ref());

    let places = match PlacesClient::new(
        &api_key,
        config.places_timeout_secs,
        config.places_radius_meters,
        config.places_details_delay_ms,
    ) {
        Ok(client) => client,
        Err(e) => {
            mark_failed(registry, job_id, StopReason::Error, e.to_string()).await;
            return;
        }
    };

    let scraper = match EmailScraper::new(config.scraper_timeout_secs, &config.scraper_user_agent)
    {
        Ok(scraper) => scraper,
        Err(e) => {
            mark_failed(registry, job_id, StopReason::Error, e.to_string()).await;
            return;
        }
    };

    let cancel = registry
        .cancel_flag(job_id)
        .await
        .unwrap_or_else(|| Arc::new(AtomicBool::new(false)));

    registry
        .update(job_id, |job| job.status = JobStatus::Running)
        .await;

    let settings = EngineSettings {
        page_delay_ms: config.places_page_delay_ms,
        quota_cooldown_secs: config.places_quota_cooldown_secs,
    };
    let engine = DiscoveryEngine::new(
        places,
        scraper,
        registry.clone(),
        job_id.to_owned(),
        job_config,
        locations,
        settings,
        cancel,
    );

    let outcome = engine.run().await;
    let valid = outcome.businesses.len();

    registry
        .update(job_id, |job| {
            job.stats = outcome.stats;
            job.stop_reason = Some(outcome.reason);
            job.stop_detail = outcome.detail;
            if outcome.reason == StopReason::Cancelled {
                job.status = JobStatus::Cancelled;
            } else {
                job.status = JobStatus::Completed;
                job.progress = 100;
                job.valid_count = valid as u64;
                job.businesses = outcome.businesses;
            }
        })
        .await;

    tracing::info!(job_id, valid, "discovery job finished");
}

fn load_region_overrides(config: &AppConfig) -> Option<RegionsFile> {
    let path = config.regions_path.as_deref()?;
    match load_regions(path) {
        Ok(file) => Some(file),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "ignoring unreadable regions override file"
            );
            None
        }
    }
}

async fn mark_failed(registry: &JobRegistry, job_id: &str, reason: StopReason, detail: String) {
    registry
        .update(job_id, |job| {
            job.status = JobStatus::Failed;
            job.stop_reason = Some(reason);
            job.stop_detail = detail;
            // Failed jobs expose no partial business list; stats and
            // progress keep their last written values for diagnosis.
            job.businesses.clear();
        })
        .await;
}

fn panic_detail(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "job task panicked".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bizgrid_core::{GeographyMode, SearchJobConfig};

    fn app_config_without_key() -> AppConfig {
        AppConfig {
            env: bizgrid_core::Environment::Test,
            bind_addr: "127.0.0.1:0".parse().expect("valid addr"),
            log_level: "info".to_owned(),
            places_api_key: None,
            regions_path: None,
            default_min_results: 500,
            places_timeout_secs: 30,
            places_radius_meters: 40_000,
            places_details_delay_ms: 0,
            places_page_delay_ms: 0,
            places_quota_cooldown_secs: 0,
            scraper_timeout_secs: 8,
            scraper_user_agent: "bizgrid-test/0.1".to_owned(),
        }
    }

    fn job_config() -> SearchJobConfig {
        SearchJobConfig {
            keywords: vec!["plumber".to_owned()],
            geography_mode: GeographyMode::State,
            state: "TX".to_owned(),
            cities: None,
            min_results: 1,
        }
    }

    #[tokio::test]
    async fn missing_api_key_fails_the_job_with_specific_reason() {
        let registry = JobRegistry::new();
        let job_id = registry.create(job_config()).await;

        run_job(&registry, &app_config_without_key(), &job_id).await;

        let record = registry.snapshot(&job_id).await.expect("job exists");
        assert_eq!(record.status, JobStatus::Failed);
        assert_eq!(record.stop_reason, Some(StopReason::ApiKeyMissing));
        assert!(record.stop_detail.contains("GOOGLE_PLACES_API_KEY"));
        assert!(record.businesses.is_empty());
    }

    #[test]
    fn panic_detail_extracts_str_and_string() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_detail(boxed.as_ref()), "boom");

        let boxed: Box<dyn Any + Send> = Box::new("dynamic".to_owned());
        assert_eq!(panic_detail(boxed.as_ref()), "dynamic");

        let boxed: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_detail(boxed.as_ref()), "job task panicked");
    }
}
