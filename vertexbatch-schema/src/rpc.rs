use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// `google.rpc.Status`, as carried by a failed batch job's `error` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RpcStatus {
    #[serde(default)]
    pub code: i32,

    #[serde(default)]
    pub message: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<Value>,
}

impl fmt::Display for RpcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code {}: {}", self.code, self.message)
    }
}

/// Standard Google API error envelope returned with non-2xx responses.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GoogleErrorBody {
    #[serde(rename = "error")]
    pub inner: GoogleErrorObject,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GoogleErrorObject {
    #[serde(default)]
    pub code: u16,

    #[serde(default)]
    pub message: String,

    /// Canonical status name such as `PERMISSION_DENIED`. Cloud Storage omits it.
    #[serde(default)]
    pub status: String,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_aiplatform_error() {
        let body: GoogleErrorBody = serde_json::from_value(json!({
            "error": {
                "code": 403,
                "message": "Permission denied on resource project demo.",
                "status": "PERMISSION_DENIED",
                "details": [{"@type": "type.googleapis.com/google.rpc.ErrorInfo"}]
            }
        }))
        .unwrap();

        assert_eq!(body.inner.code, 403);
        assert_eq!(body.inner.status, "PERMISSION_DENIED");
        assert!(body.inner.extra.contains_key("details"));
    }

    #[test]
    fn parses_storage_error_without_status() {
        let body: GoogleErrorBody = serde_json::from_value(json!({
            "error": {
                "code": 404,
                "message": "The specified bucket does not exist.",
                "errors": [{"reason": "notFound"}]
            }
        }))
        .unwrap();

        assert_eq!(body.inner.code, 404);
        assert!(body.inner.status.is_empty());
    }

    #[test]
    fn rpc_status_display() {
        let status = RpcStatus {
            code: 3,
            message: "bad input".to_string(),
            details: Vec::new(),
        };
        assert_eq!(status.to_string(), "code 3: bad input");
    }
}
