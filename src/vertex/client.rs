use super::BatchJobService;
use crate::error::{BatchError, classify_upstream_error};
use crate::google_oauth::TokenSource;
use crate::utils::logging::with_pretty_json_debug;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;
use url::Url;
use vertexbatch_schema::{BatchPredictionJob, CreateBatchPredictionJob};

/// Vertex AI v1 REST client for `batchPredictionJobs`.
pub struct VertexBatchClient {
    client: reqwest::Client,
    tokens: Arc<dyn TokenSource>,
    endpoint: Url,
    project_id: String,
    location: String,
}

impl VertexBatchClient {
    pub fn new(
        client: reqwest::Client,
        tokens: Arc<dyn TokenSource>,
        endpoint: Url,
        project_id: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            client,
            tokens,
            endpoint,
            project_id: project_id.into(),
            location: location.into(),
        }
    }

    fn jobs_url(&self) -> Result<Url, BatchError> {
        Ok(self.endpoint.join(&format!(
            "v1/projects/{}/locations/{}/batchPredictionJobs",
            self.project_id, self.location
        ))?)
    }

    async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, BatchError> {
        if !resp.status().is_success() {
            return Err(classify_upstream_error(resp).await);
        }
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl BatchJobService for VertexBatchClient {
    async fn create(
        &self,
        request: &CreateBatchPredictionJob,
    ) -> Result<BatchPredictionJob, BatchError> {
        let url = self.jobs_url()?;
        with_pretty_json_debug(request, |body| {
            debug!(url = %url, body = %body, "Creating batch prediction job");
        });

        let resp = self
            .client
            .post(url)
            .bearer_auth(self.tokens.access_token().await?)
            .json(request)
            .send()
            .await?;
        Self::read_json(resp).await
    }

    async fn get(&self, name: &str) -> Result<BatchPredictionJob, BatchError> {
        let url = self.endpoint.join(&format!("v1/{}", name.trim_start_matches('/')))?;
        let resp = self
            .client
            .get(url)
            .bearer_auth(self.tokens.access_token().await?)
            .send()
            .await?;
        let job: BatchPredictionJob = Self::read_json(resp).await?;
        debug!(name = %job.name, state = %job.state, "Fetched batch prediction job");
        Ok(job)
    }
}
