use crate::config::Config;
use crate::error::BatchError;
use std::time::Duration;

const USER_AGENT: &str = concat!("vertexbatch/", env!("CARGO_PKG_VERSION"));

/// Shared reqwest client for the token, storage and Vertex AI calls.
pub fn build_http_client(cfg: &Config) -> Result<reqwest::Client, BatchError> {
    let mut builder = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(300));
    if let Some(proxy_url) = cfg.proxy.as_ref() {
        let proxy = reqwest::Proxy::all(proxy_url.as_str())
            .map_err(|e| BatchError::Config(format!("invalid proxy url {proxy_url}: {e}")))?;
        builder = builder.proxy(proxy);
    }
    Ok(builder.build()?)
}
