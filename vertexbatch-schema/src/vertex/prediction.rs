use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::gemini::Content;

const RESPONSE_TEXT_POINTER: &str = "/candidates/0/content/parts/0/text";

/// One line of a batch job's `predictions.jsonl`.
///
/// `response` stays a raw `Value` so it can be written back out unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictionLine {
    #[serde(default)]
    pub request: Option<PredictionRequest>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,

    /// Row-level error text. Empty or absent when the row succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_time: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Echo of the original prompt record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictionRequest {
    #[serde(default)]
    pub contents: Vec<Content>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PredictionLine {
    /// `request.contents[0].parts[0].text`.
    pub fn prompt_text(&self) -> Option<&str> {
        self.request
            .as_ref()
            .and_then(|req| req.contents.first())
            .and_then(Content::first_text)
    }

    /// `response.candidates[0].content.parts[0].text`, or an empty string.
    ///
    /// Only that path is read; the rest of the response may have any shape.
    pub fn response_text(&self) -> String {
        self.response
            .as_ref()
            .and_then(|value| value.pointer(RESPONSE_TEXT_POINTER))
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_default()
    }

    /// Row-level error, if the service recorded one.
    pub fn row_error(&self) -> Option<&str> {
        self.status.as_deref().filter(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn line(value: Value) -> PredictionLine {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn extracts_prompt_and_response_text() {
        let row = line(json!({
            "request": {"contents": [{"role": "user", "parts": [{"text": "Why is the sky blue?"}]}]},
            "response": {"candidates": [{"content": {"role": "model", "parts": [{"text": "  Rayleigh.\n"}]}}]},
            "status": "",
            "processed_time": "2025-06-01T10:05:00.000+00:00"
        }));

        assert_eq!(row.prompt_text(), Some("Why is the sky blue?"));
        assert_eq!(row.response_text(), "  Rayleigh.\n");
        assert_eq!(row.row_error(), None);
    }

    #[test]
    fn missing_request_has_no_prompt() {
        let row = line(json!({"response": {}}));
        assert_eq!(row.prompt_text(), None);

        let row = line(json!({"request": {"contents": []}}));
        assert_eq!(row.prompt_text(), None);

        let row = line(json!({"request": {"contents": [{"parts": [{"fileData": {}}]}]}}));
        assert_eq!(row.prompt_text(), None);
    }

    #[test]
    fn absent_or_empty_response_yields_empty_text() {
        for value in [
            json!({"request": {}}),
            json!({"request": {}, "response": null}),
            json!({"request": {}, "response": {}}),
            json!({"request": {}, "response": {"candidates": []}}),
            json!({"request": {}, "response": {"candidates": [{"finishReason": "SAFETY"}]}}),
            json!({"request": {}, "response": "not an object"}),
        ] {
            assert_eq!(line(value).response_text(), "");
        }
    }

    #[test]
    fn odd_unrelated_fields_do_not_hide_response_text() {
        let row = line(json!({
            "request": {},
            "response": {
                "candidates": [
                    {"content": {"parts": [{"text": "answer"}]}, "index": 0},
                    {"content": {"parts": [{"text": "other"}]}, "index": -1}
                ],
                "usageMetadata": "not an object",
                "modelVersion": 7
            }
        }));
        assert_eq!(row.response_text(), "answer");

        let row = line(json!({
            "request": {},
            "response": {"candidates": [{"content": {"parts": [{"inlineData": {}}, {"text": "second"}]}}]}
        }));
        assert_eq!(row.response_text(), "");
    }

    #[test]
    fn row_error_ignores_blank_status() {
        let row = line(json!({"request": {}, "status": "  "}));
        assert_eq!(row.row_error(), None);

        let row = line(json!({"request": {}, "status": "Bad Request: invalid content"}));
        assert_eq!(row.row_error(), Some("Bad Request: invalid content"));
    }
}
