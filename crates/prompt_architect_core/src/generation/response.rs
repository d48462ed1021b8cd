//! Response text shaping for model output.

use super::{GenerationError, GenerationOperation, GenerationResult};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

static FENCED_JSON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json)?\s*\n([\s\S]*?)\n\s*```").expect("valid fence regex"));

/// Returns the JSON payload of a model reply.
///
/// Uses the first fenced code block when present, otherwise the whole reply.
pub(crate) fn extract_json(text: &str) -> &str {
    FENCED_JSON_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map_or(text, |m| m.as_str())
        .trim()
}

/// Parses a model reply into `T`.
///
/// Parse failures are logged without the reply text and surface as
/// [`GenerationError::InvalidResponse`].
pub(crate) fn parse_json<T: DeserializeOwned>(
    text: &str,
    operation: GenerationOperation,
) -> GenerationResult<T> {
    serde_json::from_str(extract_json(text)).map_err(|err| {
        warn!(
            "event=generation_parse module=generation status=error op={} line={} column={} reply_chars={}",
            operation.as_str(),
            err.line(),
            err.column(),
            text.chars().count()
        );
        GenerationError::InvalidResponse { operation }
    })
}

#[cfg(test)]
mod tests {
    use super::{extract_json, parse_json};
    use crate::generation::{GenerationError, GenerationOperation};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        key: String,
    }

    #[test]
    fn extracts_json_fence() {
        let text = "Here you go:\n```json\n{\"key\": \"value\"}\n```\nthanks";
        assert_eq!(extract_json(text), "{\"key\": \"value\"}");
    }

    #[test]
    fn extracts_plain_fence() {
        let text = "```\n{\"key\": 1}\n```";
        assert_eq!(extract_json(text), "{\"key\": 1}");
    }

    #[test]
    fn raw_json_is_trimmed() {
        assert_eq!(extract_json("  {\"key\": \"v\"}\n"), "{\"key\": \"v\"}");
    }

    #[test]
    fn parse_failure_maps_to_invalid_response() {
        let err = parse_json::<Payload>("not json", GenerationOperation::Compose).unwrap_err();
        assert_eq!(
            err,
            GenerationError::InvalidResponse {
                operation: GenerationOperation::Compose
            }
        );
    }

    #[test]
    fn parse_reads_fenced_payload() {
        let parsed: Payload =
            parse_json("```json\n{\"key\": \"ok\"}\n```", GenerationOperation::Suggest).unwrap();
        assert_eq!(parsed.key, "ok");
    }
}
