use super::Config;
use crate::error::BatchError;
use crate::gcs::GcsUri;
use crate::pipeline::PollPolicy;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Object path of the uploaded prompt file inside the bucket.
pub const INPUT_OBJECT: &str = "batch-prediction-input/prompts.jsonl";

/// Prefix under which the batch job writes its output.
pub const OUTPUT_PREFIX: &str = "batch-prediction-output/";

/// File name the job writes inside each output subdirectory.
pub const PREDICTIONS_FILE_NAME: &str = "predictions.jsonl";

const DEFAULT_STORAGE_ENDPOINT: &str = "https://storage.googleapis.com/";

/// Validated configuration handed to every pipeline step.
#[derive(Debug, Clone)]
pub struct Settings {
    pub project_id: String,
    pub location: String,
    pub bucket_name: String,
    pub model_id: String,
    pub prompts_path: PathBuf,
    pub results_path: PathBuf,
    pub poll: PollPolicy,
    pub aiplatform_endpoint: Url,
    pub storage_endpoint: Url,
}

impl Settings {
    pub(super) fn from_config(cfg: &Config) -> Result<Self, BatchError> {
        let location = cfg.location.trim().to_string();
        let aiplatform_endpoint = match &cfg.aiplatform_endpoint {
            Some(url) => url.clone(),
            None => default_aiplatform_endpoint(&location)?,
        };
        let storage_endpoint = match &cfg.storage_endpoint {
            Some(url) => url.clone(),
            None => Url::parse(DEFAULT_STORAGE_ENDPOINT)?,
        };

        Ok(Self {
            project_id: cfg.project_id.trim().to_string(),
            location,
            bucket_name: cfg.bucket_name.trim().to_string(),
            model_id: cfg.model_id.clone(),
            prompts_path: cfg.prompts_path.clone(),
            results_path: cfg.results_path.clone(),
            poll: PollPolicy {
                interval: Duration::from_secs(cfg.poll_interval_secs),
                max_wait: cfg.max_wait_secs.map(Duration::from_secs),
            },
            aiplatform_endpoint,
            storage_endpoint,
        })
    }

    /// `gs://<bucket>/batch-prediction-input/prompts.jsonl`.
    pub fn input_uri(&self) -> GcsUri {
        GcsUri::new(&self.bucket_name, INPUT_OBJECT)
    }

    /// `gs://<bucket>/batch-prediction-output/`.
    pub fn output_uri(&self) -> GcsUri {
        GcsUri::new(&self.bucket_name, OUTPUT_PREFIX)
    }

    /// Publisher model resource path used in the create request.
    pub fn model_resource(&self) -> String {
        format!("publishers/google/models/{}", self.model_id)
    }

    /// Cloud console page for a job id.
    pub fn console_url(&self, job_id: &str) -> String {
        format!(
            "https://console.cloud.google.com/vertex-ai/locations/{}/batch-predictions/{}?project={}",
            self.location, job_id, self.project_id
        )
    }
}

/// Regional endpoint, or the global host when `location` is `global`.
fn default_aiplatform_endpoint(location: &str) -> Result<Url, BatchError> {
    let url = if location == "global" {
        Url::parse("https://aiplatform.googleapis.com/")?
    } else {
        Url::parse(&format!("https://{location}-aiplatform.googleapis.com/"))?
    };
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(location: &str) -> Settings {
        let cfg = Config {
            project_id: "demo-project".to_string(),
            location: location.to_string(),
            bucket_name: "demo-bucket".to_string(),
            ..Config::default()
        };
        cfg.validate().expect("valid config")
    }

    #[test]
    fn derives_storage_uris() {
        let s = settings("us-central1");
        assert_eq!(
            s.input_uri().to_string(),
            "gs://demo-bucket/batch-prediction-input/prompts.jsonl"
        );
        assert_eq!(
            s.output_uri().to_string(),
            "gs://demo-bucket/batch-prediction-output/"
        );
    }

    #[test]
    fn regional_and_global_endpoints() {
        assert_eq!(
            settings("europe-west4").aiplatform_endpoint.as_str(),
            "https://europe-west4-aiplatform.googleapis.com/"
        );
        assert_eq!(
            settings("global").aiplatform_endpoint.as_str(),
            "https://aiplatform.googleapis.com/"
        );
    }

    #[test]
    fn console_url_uses_job_id() {
        let s = settings("us-central1");
        assert_eq!(
            s.console_url("1234"),
            "https://console.cloud.google.com/vertex-ai/locations/us-central1/batch-predictions/1234?project=demo-project"
        );
        assert_eq!(
            s.model_resource(),
            "publishers/google/models/gemini-2.5-pro"
        );
    }

    #[test]
    fn poll_policy_defaults_to_unbounded() {
        let s = settings("us-central1");
        assert_eq!(s.poll.interval, Duration::from_secs(30));
        assert_eq!(s.poll.max_wait, None);
    }
}
