use super::BatchError;
use crate::utils::logging::with_pretty_json_debug;
use vertexbatch_schema::GoogleErrorBody;

pub const UPSTREAM_BODY_PREVIEW_CHARS: usize = 300;

/// Turn a non-2xx response into a `BatchError`, preferring the structured
/// Google error envelope when the body carries one.
pub(crate) async fn classify_upstream_error(resp: reqwest::Response) -> BatchError {
    let status = resp.status();
    let bytes = resp.bytes().await.unwrap_or_default();

    if let Ok(error) = serde_json::from_slice::<GoogleErrorBody>(&bytes) {
        with_pretty_json_debug(&error, |pretty_error| {
            tracing::debug!(%status, body = %pretty_error, "Upstream structured error");
        });
        return BatchError::UpstreamMapped {
            status,
            body: error.inner,
        };
    }

    let raw_body = String::from_utf8_lossy(&bytes).into_owned();
    tracing::debug!(
        %status,
        body = %format!("{:.len$}", raw_body, len = UPSTREAM_BODY_PREVIEW_CHARS),
        "Upstream unstructured error"
    );

    BatchError::UpstreamFallback {
        status,
        body: raw_body,
    }
}
