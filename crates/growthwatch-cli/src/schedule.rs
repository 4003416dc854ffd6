//! In-process recurring batch runs.

use std::sync::Arc;

use growthwatch_core::AppConfig;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::run::{run_batch, RunOptions};

/// Builds and starts a scheduler running the batch on `config.run_cron`.
///
/// The returned handle must be kept alive; dropping it stops the job.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the cron expression is invalid or the
/// scheduler cannot start.
pub(crate) async fn build_scheduler(
    config: Arc<AppConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    let cron = config.run_cron.clone();
    let running = Arc::new(Mutex::new(()));

    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let config = Arc::clone(&config);
        let running = Arc::clone(&running);

        Box::pin(async move {
            let Ok(_guard) = running.try_lock() else {
                tracing::warn!("scheduler: previous batch still running; skipping this tick");
                return;
            };
            tracing::info!("scheduler: starting batch run");
            match run_batch(&config, &RunOptions::default()).await {
                Ok(outcome) => tracing::info!(
                    run_id = %outcome.run_id,
                    succeeded = outcome.succeeded,
                    partial = outcome.partial,
                    skipped = outcome.skipped,
                    "scheduler: batch run complete"
                ),
                Err(e) => tracing::error!(error = %e, "scheduler: batch run failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = %cron, "scheduler: registered batch job");
    scheduler.start().await?;
    Ok(scheduler)
}
