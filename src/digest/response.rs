use serde_json::Value;

use crate::error::CapabilityError;

/// Recognized shapes of a summarization capability response body.
#[derive(Debug, Clone, PartialEq)]
pub enum CapabilityResponse {
    SummaryText(String),
    GeneratedText(String),
    ServiceError {
        message: String,
        estimated_time: Option<f64>,
    },
    Unrecognized,
}

impl CapabilityResponse {
    pub fn into_text(self) -> Result<String, CapabilityError> {
        match self {
            Self::SummaryText(text) | Self::GeneratedText(text) => Ok(text),
            Self::ServiceError {
                message,
                estimated_time,
            } => Err(CapabilityError::ServiceError(match estimated_time {
                Some(secs) => format!("{message} (estimated_time={secs:.0}s)"),
                None => message,
            })),
            Self::Unrecognized => Err(CapabilityError::Unrecognized),
        }
    }
}

fn text_or_unrecognized(
    value: &Value,
    wrap: fn(String) -> CapabilityResponse,
) -> CapabilityResponse {
    match value.as_str().map(str::trim) {
        Some(text) if !text.is_empty() => wrap(text.to_string()),
        _ => CapabilityResponse::Unrecognized,
    }
}

/// The first text field present in an item decides its outcome, even when blank.
fn parse_item(item: &Value) -> Option<CapabilityResponse> {
    if let Some(value) = item.get("summary_text") {
        return Some(text_or_unrecognized(value, CapabilityResponse::SummaryText));
    }
    item.get("generated_text")
        .map(|value| text_or_unrecognized(value, CapabilityResponse::GeneratedText))
}

pub fn parse_response(json: &Value) -> CapabilityResponse {
    match json {
        Value::Array(items) => items
            .iter()
            .find_map(parse_item)
            .unwrap_or(CapabilityResponse::Unrecognized),
        Value::Object(map) => match map.get("error") {
            Some(err) => CapabilityResponse::ServiceError {
                message: err
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| err.to_string()),
                estimated_time: map.get("estimated_time").and_then(Value::as_f64),
            },
            None => CapabilityResponse::Unrecognized,
        },
        _ => CapabilityResponse::Unrecognized,
    }
}

#[cfg(test)]
mod tests {
    use super::{CapabilityResponse, parse_response};
    use crate::error::CapabilityError;
    use serde_json::json;

    #[test]
    fn reads_summary_text_from_first_item() {
        let got = parse_response(&json!([{"summary_text": "X"}]));
        assert_eq!(got, CapabilityResponse::SummaryText("X".to_string()));
    }

    #[test]
    fn reads_generated_text_when_summary_missing() {
        let got = parse_response(&json!([{"generated_text": "from a text model"}]));
        assert_eq!(
            got,
            CapabilityResponse::GeneratedText("from a text model".to_string())
        );
    }

    #[test]
    fn prefers_summary_text_within_one_item() {
        let got = parse_response(&json!([{"generated_text": "g", "summary_text": "s"}]));
        assert_eq!(got, CapabilityResponse::SummaryText("s".to_string()));
    }

    #[test]
    fn skips_items_without_text() {
        let got = parse_response(&json!([{"score": 0.1}, {"summary_text": "later"}]));
        assert_eq!(got, CapabilityResponse::SummaryText("later".to_string()));
    }

    #[test]
    fn blank_and_foreign_shapes_are_unrecognized() {
        assert_eq!(
            parse_response(&json!([{"summary_text": "   "}])),
            CapabilityResponse::Unrecognized
        );
        assert_eq!(parse_response(&json!([])), CapabilityResponse::Unrecognized);
        assert_eq!(
            parse_response(&json!({"summary_text": "not in a list"})),
            CapabilityResponse::Unrecognized
        );
        assert_eq!(parse_response(&json!("text")), CapabilityResponse::Unrecognized);
    }

    #[test]
    fn blank_summary_text_does_not_fall_through_to_generated_text() {
        assert_eq!(
            parse_response(&json!([{"summary_text": "", "generated_text": "g"}])),
            CapabilityResponse::Unrecognized
        );
        assert_eq!(
            parse_response(&json!([{"generated_text": " "}, {"summary_text": "later"}])),
            CapabilityResponse::Unrecognized
        );
        assert_eq!(
            parse_response(&json!([{"summary_text": null}])),
            CapabilityResponse::Unrecognized
        );
    }

    #[test]
    fn service_error_object_is_mapped_to_failure() {
        let got = parse_response(&json!({
            "error": "Model facebook/bart-large-cnn is currently loading",
            "estimated_time": 20.0
        }));
        assert!(matches!(
            got.clone(),
            CapabilityResponse::ServiceError { estimated_time: Some(t), .. } if t == 20.0
        ));
        let err = got.into_text().expect_err("service error is a failure");
        assert!(matches!(err, CapabilityError::ServiceError(msg) if msg.contains("loading")));
    }
}
