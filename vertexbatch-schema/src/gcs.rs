use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Cloud Storage JSON API `objects.list` page.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GcsObjectList {
    #[serde(default)]
    pub items: Vec<GcsObject>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Object resource. Only the fields the pipeline reads are typed.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GcsObject {
    pub name: String,

    #[serde(default)]
    pub bucket: String,

    /// Decimal byte count; the API encodes uint64 values as strings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}
