use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A single conversation turn as it appears in batch request and response rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    /// Usually `"user"` or `"model"`. Kept as raw string for transparent pass-through.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Ordered parts that constitute a single message.
    ///
    /// Unlike the live generate-content schema this is lenient: batch output rows are
    /// written by the service and a missing `parts` list reads as empty.
    #[serde(default)]
    pub parts: Vec<Part>,

    #[serde(default, flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One atomic piece of content inside a `Content` turn.
///
/// Only `text` is read by the report; every other part type (inlineData,
/// functionCall, fileData, ...) is preserved in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Optional model-thought marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,

    /// Inline text data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Content {
    /// Text of the first part, if that part carries text.
    pub fn first_text(&self) -> Option<&str> {
        self.parts.first().and_then(|part| part.text.as_deref())
    }
}
