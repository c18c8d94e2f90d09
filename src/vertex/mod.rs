mod client;

pub use client::VertexBatchClient;

use crate::error::BatchError;
use async_trait::async_trait;
use vertexbatch_schema::{BatchPredictionJob, CreateBatchPredictionJob};

/// Managed batch prediction service.
#[async_trait]
pub trait BatchJobService: Send + Sync {
    /// Create a job. Every call creates a new job; there is no idempotency key.
    async fn create(
        &self,
        request: &CreateBatchPredictionJob,
    ) -> Result<BatchPredictionJob, BatchError>;

    /// Fetch the current job resource by its full resource name.
    async fn get(&self, name: &str) -> Result<BatchPredictionJob, BatchError>;
}
