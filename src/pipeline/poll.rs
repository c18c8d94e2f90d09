use crate::error::BatchError;
use crate::vertex::BatchJobService;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::info;
use vertexbatch_schema::BatchPredictionJob;

/// How the status loop waits for a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Sleep between status fetches.
    pub interval: Duration,
    /// Total wait bound. `None` waits until the job leaves the in-progress set.
    pub max_wait: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            max_wait: None,
        }
    }
}

/// Re-fetch `job` every `policy.interval` while it is queued, pending or running.
///
/// Returns the first fetched resource whose state is terminal.
pub async fn wait_for_terminal<J>(
    jobs: &J,
    mut job: BatchPredictionJob,
    policy: &PollPolicy,
) -> Result<BatchPredictionJob, BatchError>
where
    J: BatchJobService + ?Sized,
{
    let started = Instant::now();

    while job.state.is_in_progress() {
        if let Some(max_wait) = policy.max_wait {
            let waited = started.elapsed();
            if waited >= max_wait {
                return Err(BatchError::PollTimeout {
                    name: job.name,
                    waited,
                });
            }
        }

        sleep(policy.interval).await;
        job = jobs.get(&job.name).await?;
        info!("  - Job status: {}", job.state);
    }

    Ok(job)
}
