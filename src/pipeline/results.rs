use crate::error::BatchError;
use crate::utils::json::to_spaced_ascii_string;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use vertexbatch_schema::PredictionLine;

/// One row of the CSV report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub prompt: String,
    pub parsed_output: String,
    pub raw_response: String,
}

impl ReportRow {
    /// Flatten one prediction line. `line_no` is 1-based and only used for errors.
    pub fn from_line(line: &PredictionLine, line_no: usize) -> Result<Self, BatchError> {
        let prompt = line.prompt_text().ok_or_else(|| {
            BatchError::malformed(line_no, "missing request.contents[0].parts[0].text")
        })?;

        let raw_response = match line.response.as_ref() {
            Some(value) if !value.is_null() => to_spaced_ascii_string(value)?,
            _ => to_spaced_ascii_string(&Value::Object(serde_json::Map::new()))?,
        };

        Ok(Self {
            prompt: prompt.to_string(),
            parsed_output: line.response_text().trim().to_string(),
            raw_response,
        })
    }
}

/// Parse a `predictions.jsonl` body into report rows, preserving line order.
///
/// Blank lines are skipped. The first malformed line aborts the whole parse.
pub fn parse_predictions(body: &[u8]) -> Result<Vec<ReportRow>, BatchError> {
    let mut rows = Vec::new();

    for (idx, raw) in body.split(|b| *b == b'\n').enumerate() {
        let raw = raw.trim_ascii();
        if raw.is_empty() {
            continue;
        }
        let line_no = idx + 1;
        let line: PredictionLine = serde_json::from_slice(raw)
            .map_err(|e| BatchError::malformed(line_no, e.to_string()))?;
        if let Some(status) = line.row_error() {
            warn!(line = line_no, status = %status, "Prediction row reported an error");
        }
        rows.push(ReportRow::from_line(&line, line_no)?);
    }

    Ok(rows)
}
