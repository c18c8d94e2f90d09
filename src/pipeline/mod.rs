//! The batch run: upload, submit, wait, flatten.

mod poll;
mod report;
mod results;

pub use poll::{PollPolicy, wait_for_terminal};
pub use report::{REPORT_HEADER, read_report, write_report};
pub use results::{ReportRow, parse_predictions};

use crate::config::{Config, Settings};
use crate::error::BatchError;
use crate::gcs::{GcsUri, ObjectStore, find_predictions};
use crate::vertex::BatchJobService;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use vertexbatch_schema::{BatchPredictionJob, CreateBatchPredictionJob, JobState};

/// How a run that did not error ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// The job succeeded and the report was written.
    ReportWritten {
        job: BatchPredictionJob,
        path: PathBuf,
        rows: usize,
    },
    /// The job succeeded but no `*/predictions.jsonl` was found.
    NoResultsFile { job: BatchPredictionJob },
    /// The job reached a terminal state other than succeeded.
    JobFailed { job: BatchPredictionJob },
}

pub struct BatchPipeline {
    settings: Settings,
    store: Arc<dyn ObjectStore>,
    jobs: Arc<dyn BatchJobService>,
}

impl BatchPipeline {
    pub fn new(
        settings: Settings,
        store: Arc<dyn ObjectStore>,
        jobs: Arc<dyn BatchJobService>,
    ) -> Self {
        Self {
            settings,
            store,
            jobs,
        }
    }

    /// Validate `cfg` first; nothing touches the collaborators if that fails.
    pub fn from_config(
        cfg: &Config,
        store: Arc<dyn ObjectStore>,
        jobs: Arc<dyn BatchJobService>,
    ) -> Result<Self, BatchError> {
        Ok(Self::new(cfg.validate()?, store, jobs))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub async fn run(&self) -> Result<RunOutcome, BatchError> {
        let input = self.upload_prompts().await?;
        let job = self.submit_job(&input).await?;

        info!("Waiting for job to complete...");
        let job = wait_for_terminal(self.jobs.as_ref(), job, &self.settings.poll).await?;

        self.process_results(job).await
    }

    /// Upload the local prompt file to its fixed object path.
    pub async fn upload_prompts(&self) -> Result<GcsUri, BatchError> {
        info!(
            "Uploading prompts to GCS bucket: {}...",
            self.settings.bucket_name
        );
        let bytes = tokio::fs::read(&self.settings.prompts_path)
            .await
            .map_err(|e| {
                BatchError::Io(std::io::Error::new(
                    e.kind(),
                    format!("{}: {e}", self.settings.prompts_path.display()),
                ))
            })?;
        let dest = self.settings.input_uri();
        self.store.upload(&dest, bytes).await?;
        Ok(dest)
    }

    pub async fn submit_job(&self, input: &GcsUri) -> Result<BatchPredictionJob, BatchError> {
        info!("Creating batch prediction job...");
        let request = CreateBatchPredictionJob::jsonl(
            format!("batch-prediction-{}", Utc::now().format("%Y%m%d-%H%M%S")),
            self.settings.model_resource(),
            input.to_string(),
            self.settings.output_uri().to_string(),
        );
        let job = self.jobs.create(&request).await?;

        info!("Batch job created: {}", job.name);
        info!(
            "View job status: {}",
            self.settings.console_url(job.job_id())
        );
        Ok(job)
    }

    /// Write the report for a succeeded job, or log why there is none.
    pub async fn process_results(
        &self,
        job: BatchPredictionJob,
    ) -> Result<RunOutcome, BatchError> {
        if job.state != JobState::Succeeded {
            warn!("Job failed. Final state: {}", job.state);
            match job.error.as_ref() {
                Some(error) => warn!("Error: {error}"),
                None => warn!("Error: <none reported>"),
            }
            return Ok(RunOutcome::JobFailed { job });
        }

        info!("Job succeeded!");
        let Some(output_dir) = job.output_directory() else {
            warn!("Could not find prediction results file.");
            return Ok(RunOutcome::NoResultsFile { job });
        };
        let output_dir: GcsUri = output_dir.parse()?;

        let matches = find_predictions(self.store.as_ref(), &output_dir).await?;
        let Some(first) = matches.first() else {
            warn!("Could not find prediction results file.");
            return Ok(RunOutcome::NoResultsFile { job });
        };
        if matches.len() > 1 {
            warn!(
                using = %first,
                ignored = matches.len() - 1,
                "Multiple prediction files found; only the first is processed"
            );
        }

        info!("Downloading and processing results...");
        let body = self.store.download(first).await?;
        let rows = parse_predictions(&body)?;

        let path = self.settings.results_path.clone();
        write_report(&path, &rows)?;
        info!("Results saved to {}", path.display());

        Ok(RunOutcome::ReportWritten {
            job,
            path,
            rows: rows.len(),
        })
    }
}
