use crate::error::BatchError;
use std::fmt;
use std::str::FromStr;

/// A `gs://bucket/object` location. `object` may be empty (bucket root) or end
/// with `/` (a prefix).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GcsUri {
    pub bucket: String,
    pub object: String,
}

impl GcsUri {
    pub fn new(bucket: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            object: object.into(),
        }
    }

    /// Object path with exactly one trailing `/`, or empty for the bucket root.
    pub fn as_prefix(&self) -> String {
        let trimmed = self.object.trim_end_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("{trimmed}/")
        }
    }
}

impl FromStr for GcsUri {
    type Err = BatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix("gs://")
            .ok_or_else(|| BatchError::InvalidGcsUri(s.to_string()))?;
        let (bucket, object) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(BatchError::InvalidGcsUri(s.to_string()));
        }
        Ok(Self::new(bucket, object))
    }
}

impl fmt::Display for GcsUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gs://{}/{}", self.bucket, self.object)
    }
}
