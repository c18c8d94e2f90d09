//! Vertex AI `BatchPredictionJob` resource (v1 REST).
//!
//! Reference: <https://cloud.google.com/vertex-ai/docs/reference/rest/v1/projects.locations.batchPredictionJobs>

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::rpc::RpcStatus;

/// Job lifecycle state as reported by the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobState {
    #[serde(rename = "JOB_STATE_QUEUED")]
    Queued,
    #[serde(rename = "JOB_STATE_PENDING")]
    Pending,
    #[serde(rename = "JOB_STATE_RUNNING")]
    Running,
    #[serde(rename = "JOB_STATE_SUCCEEDED")]
    Succeeded,
    #[serde(rename = "JOB_STATE_FAILED")]
    Failed,
    #[serde(rename = "JOB_STATE_CANCELLING")]
    Cancelling,
    #[serde(rename = "JOB_STATE_CANCELLED")]
    Cancelled,
    #[serde(rename = "JOB_STATE_PAUSED")]
    Paused,
    #[serde(rename = "JOB_STATE_EXPIRED")]
    Expired,
    #[serde(rename = "JOB_STATE_UPDATING")]
    Updating,
    #[serde(rename = "JOB_STATE_PARTIALLY_SUCCEEDED")]
    PartiallySucceeded,
    /// Also the landing spot for state names this client does not know.
    #[default]
    #[serde(rename = "JOB_STATE_UNSPECIFIED")]
    #[serde(other)]
    Unspecified,
}

impl JobState {
    /// Queued, pending and running are the only states the poll loop waits on.
    pub fn is_in_progress(self) -> bool {
        matches!(self, JobState::Queued | JobState::Pending | JobState::Running)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Unspecified => "JOB_STATE_UNSPECIFIED",
            JobState::Queued => "JOB_STATE_QUEUED",
            JobState::Pending => "JOB_STATE_PENDING",
            JobState::Running => "JOB_STATE_RUNNING",
            JobState::Succeeded => "JOB_STATE_SUCCEEDED",
            JobState::Failed => "JOB_STATE_FAILED",
            JobState::Cancelling => "JOB_STATE_CANCELLING",
            JobState::Cancelled => "JOB_STATE_CANCELLED",
            JobState::Paused => "JOB_STATE_PAUSED",
            JobState::Expired => "JOB_STATE_EXPIRED",
            JobState::Updating => "JOB_STATE_UPDATING",
            JobState::PartiallySucceeded => "JOB_STATE_PARTIALLY_SUCCEEDED",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `batchPredictionJobs.create`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBatchPredictionJob {
    pub display_name: String,

    /// Publisher model path, e.g. `publishers/google/models/gemini-2.5-pro`.
    pub model: String,

    pub input_config: InputConfig,

    pub output_config: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputConfig {
    pub instances_format: String,
    pub gcs_source: GcsSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcsSource {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
    pub predictions_format: String,
    pub gcs_destination: GcsDestination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcsDestination {
    pub output_uri_prefix: String,
}

impl CreateBatchPredictionJob {
    /// JSONL in, JSONL out, one source file and one destination prefix.
    pub fn jsonl(
        display_name: impl Into<String>,
        model: impl Into<String>,
        source_uri: impl Into<String>,
        destination_prefix: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            model: model.into(),
            input_config: InputConfig {
                instances_format: "jsonl".to_string(),
                gcs_source: GcsSource {
                    uris: vec![source_uri.into()],
                },
            },
            output_config: OutputConfig {
                predictions_format: "jsonl".to_string(),
                gcs_destination: GcsDestination {
                    output_uri_prefix: destination_prefix.into(),
                },
            },
        }
    }
}

/// Where the service actually wrote the predictions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gcs_output_directory: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Job resource returned by create and get.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPredictionJob {
    /// `projects/{project}/locations/{location}/batchPredictionJobs/{id}`.
    pub name: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub state: JobState,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_config: Option<OutputConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_info: Option<OutputInfo>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl BatchPredictionJob {
    /// Trailing numeric id of the resource name.
    pub fn job_id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// Output directory reported by the service, falling back to the requested prefix.
    pub fn output_directory(&self) -> Option<&str> {
        self.output_info
            .as_ref()
            .and_then(|info| info.gcs_output_directory.as_deref())
            .or_else(|| {
                self.output_config
                    .as_ref()
                    .map(|cfg| cfg.gcs_destination.output_uri_prefix.as_str())
            })
    }
}
