//! Cloud Storage access: the `ObjectStore` seam, its JSON API client and the
//! predictions-file lookup.

mod client;
mod uri;

pub use client::GcsClient;
pub use uri::GcsUri;

use crate::config::PREDICTIONS_FILE_NAME;
use crate::error::BatchError;
use async_trait::async_trait;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `bytes` to `dest`, replacing any existing object.
    async fn upload(&self, dest: &GcsUri, bytes: Vec<u8>) -> Result<(), BatchError>;

    /// Every object whose name starts with `prefix.object`.
    async fn list(&self, prefix: &GcsUri) -> Result<Vec<GcsUri>, BatchError>;

    async fn download(&self, src: &GcsUri) -> Result<Vec<u8>, BatchError>;
}

/// Resolve `<output_dir>/*/predictions.jsonl`, sorted lexicographically.
///
/// `*` matches exactly one non-empty path segment.
pub async fn find_predictions<S>(store: &S, output_dir: &GcsUri) -> Result<Vec<GcsUri>, BatchError>
where
    S: ObjectStore + ?Sized,
{
    let prefix = GcsUri::new(output_dir.bucket.clone(), output_dir.as_prefix());
    let mut matches: Vec<GcsUri> = store
        .list(&prefix)
        .await?
        .into_iter()
        .filter(|uri| uri.bucket == prefix.bucket && is_predictions_file(&prefix.object, &uri.object))
        .collect();
    matches.sort();
    Ok(matches)
}

fn is_predictions_file(prefix: &str, name: &str) -> bool {
    let Some(rest) = name.strip_prefix(prefix) else {
        return false;
    };
    match rest.split_once('/') {
        Some((dir, file)) => !dir.is_empty() && file == PREDICTIONS_FILE_NAME,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_one_level_deep_only() {
        let prefix = "batch-prediction-output/";
        assert!(is_predictions_file(
            prefix,
            "batch-prediction-output/prediction-model-1/predictions.jsonl"
        ));
        assert!(!is_predictions_file(
            prefix,
            "batch-prediction-output/predictions.jsonl"
        ));
        assert!(!is_predictions_file(
            prefix,
            "batch-prediction-output/a/b/predictions.jsonl"
        ));
        assert!(!is_predictions_file(
            prefix,
            "batch-prediction-output//predictions.jsonl"
        ));
        assert!(!is_predictions_file(
            prefix,
            "batch-prediction-output/a/predictions.jsonl.tmp"
        ));
        assert!(!is_predictions_file(prefix, "elsewhere/a/predictions.jsonl"));
    }
}
