//! Response parser — model text → typed `Analysis`.

use serde_json::Value;
use tracing::warn;

use crate::llm_client::strip_json_fences;
use crate::models::analysis::{Analysis, AnalysisFailure, AnalysisResult};

/// Parses the model's answer into the five-field record.
/// Anything that does not fit the schema becomes `Analysis::Degraded`,
/// including well-formed JSON whose verdict is not Yes / No / Partially.
pub fn parse_analysis(raw: &str) -> Analysis {
    let value: Value = match serde_json::from_str(strip_json_fences(raw)) {
        Ok(value) => value,
        Err(e) => {
            warn!("Model answer is not JSON: {e}");
            return Analysis::Degraded(AnalysisFailure::Parse(e.to_string()));
        }
    };

    match serde_json::from_value::<AnalysisResult>(value) {
        Ok(result) => Analysis::Matched(result),
        Err(e) => {
            warn!("Model JSON does not match the analysis schema: {e}");
            Analysis::Degraded(AnalysisFailure::Parse(e.to_string()))
        }
    }
}
