mod settings;

pub use settings::{INPUT_OBJECT, OUTPUT_PREFIX, PREDICTIONS_FILE_NAME, Settings};

use crate::error::BatchError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use url::Url;

/// Application configuration managed by Figment.
///
/// Sources, lowest precedence first: built-in defaults, `config.toml` in the
/// working directory (if present), then raw environment variables whose
/// UPPER_SNAKE_CASE names match the field names.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Google Cloud project id (required, non-empty).
    /// Env: `PROJECT_ID`.
    #[serde(default, deserialize_with = "deserialize_string_lax")]
    pub project_id: String,

    /// Vertex AI region, e.g. `us-central1`, or `global` (required, non-empty).
    /// Env: `LOCATION`.
    #[serde(default, deserialize_with = "deserialize_string_lax")]
    pub location: String,

    /// Cloud Storage bucket for batch input and output (required, non-empty).
    /// Env: `BUCKET_NAME`.
    #[serde(default, deserialize_with = "deserialize_string_lax")]
    pub bucket_name: String,

    /// Publisher model id.
    /// Env: `MODEL_ID`. Default: `gemini-2.5-pro`.
    #[serde(default = "default_model_id")]
    pub model_id: String,

    /// Log level for tracing subscriber initialization when `RUST_LOG` is unset.
    /// Env: `LOGLEVEL`. Default: `info`.
    #[serde(default = "default_loglevel")]
    pub loglevel: String,

    /// Local newline-delimited JSON prompt file.
    /// Env: `PROMPTS_PATH`. Default: `prompts.jsonl`.
    #[serde(default = "default_prompts_path")]
    pub prompts_path: PathBuf,

    /// Local CSV report written on success.
    /// Env: `RESULTS_PATH`. Default: `batch_prediction_results.csv`.
    #[serde(default = "default_results_path")]
    pub results_path: PathBuf,

    /// Seconds between job status fetches.
    /// Env: `POLL_INTERVAL_SECS`. Default: `30`.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Upper bound on the total wait for a terminal state. Unset waits forever.
    /// Env: `MAX_WAIT_SECS`.
    #[serde(default)]
    pub max_wait_secs: Option<u64>,

    /// Optional upstream HTTP proxy used for every reqwest client.
    /// Env: `PROXY`. Example: `http://127.0.0.1:1080`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// Credential file (gcloud ADC `authorized_user` or `service_account` JSON).
    /// Env: `CREDENTIALS_PATH` or `GOOGLE_APPLICATION_CREDENTIALS`.
    /// Default: the gcloud application default credentials file.
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,

    /// Pre-minted OAuth access token; skips credential file loading when set.
    /// Env: `ACCESS_TOKEN`.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Override for the Vertex AI API base URL.
    /// Env: `AIPLATFORM_ENDPOINT`. Default: derived from `location`.
    #[serde(default)]
    pub aiplatform_endpoint: Option<Url>,

    /// Override for the Cloud Storage API base URL.
    /// Env: `STORAGE_ENDPOINT`. Default: `https://storage.googleapis.com/`.
    #[serde(default)]
    pub storage_endpoint: Option<Url>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            location: String::new(),
            bucket_name: String::new(),
            model_id: default_model_id(),
            loglevel: default_loglevel(),
            prompts_path: default_prompts_path(),
            results_path: default_results_path(),
            poll_interval_secs: default_poll_interval_secs(),
            max_wait_secs: None,
            proxy: None,
            credentials_path: None,
            access_token: None,
            aiplatform_endpoint: None,
            storage_endpoint: None,
        }
    }
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";

const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

const ENV_KEYS: &[&str] = &[
    "PROJECT_ID",
    "LOCATION",
    "BUCKET_NAME",
    "MODEL_ID",
    "LOGLEVEL",
    "PROMPTS_PATH",
    "RESULTS_PATH",
    "POLL_INTERVAL_SECS",
    "MAX_WAIT_SECS",
    "PROXY",
    "CREDENTIALS_PATH",
    "ACCESS_TOKEN",
    "AIPLATFORM_ENDPOINT",
    "STORAGE_ENDPOINT",
];

impl Config {
    /// Builds a Figment that merges defaults, an optional config TOML file and the environment.
    pub fn figment() -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        let figment = if Path::new(DEFAULT_CONFIG_FILE).is_file() {
            figment.merge(Toml::file(DEFAULT_CONFIG_FILE))
        } else {
            figment
        };
        figment.merge(env_provider())
    }

    /// Loads configuration from all sources. Required fields are checked by [`Config::validate`].
    pub fn load() -> Result<Self, BatchError> {
        Self::from_figment(&Self::figment())
    }

    pub fn from_figment(figment: &Figment) -> Result<Self, BatchError> {
        figment
            .extract()
            .map_err(|err| BatchError::Config(err.to_string()))
    }

    /// Checks every required value and returns the settings the pipeline runs with.
    ///
    /// All missing keys are reported together.
    pub fn validate(&self) -> Result<Settings, BatchError> {
        let missing: Vec<&'static str> = [
            ("PROJECT_ID", &self.project_id),
            ("LOCATION", &self.location),
            ("BUCKET_NAME", &self.bucket_name),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(key, _)| key)
        .collect();

        if !missing.is_empty() {
            return Err(BatchError::MissingConfig { missing });
        }
        if self.poll_interval_secs == 0 {
            return Err(BatchError::Config(
                "POLL_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }

        Settings::from_config(self)
    }
}

/// Raw environment provider restricted to known keys.
fn env_provider() -> Env {
    Env::raw().filter_map(|key| {
        if key.as_str().eq_ignore_ascii_case(CREDENTIALS_ENV) {
            return Some("credentials_path".into());
        }
        ENV_KEYS
            .iter()
            .find(|known| key.as_str().eq_ignore_ascii_case(known))
            .map(|known| known.to_ascii_lowercase().into())
    })
}

/// Accepts strings and numbers, since raw env values like `PROJECT_ID=123456` parse as integers.
fn deserialize_string_lax<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;

    match v {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        _ => Err(serde::de::Error::custom("expected a string or a number")),
    }
}

fn default_model_id() -> String {
    "gemini-2.5-pro".to_string()
}

fn default_loglevel() -> String {
    "info".to_string()
}

fn default_prompts_path() -> PathBuf {
    PathBuf::from("prompts.jsonl")
}

fn default_results_path() -> PathBuf {
    PathBuf::from("batch_prediction_results.csv")
}

fn default_poll_interval_secs() -> u64 {
    30
}
