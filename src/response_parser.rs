use serde_json::{Deserializer, Value};
use thiserror::Error;
use tracing::debug;

const FENCE: &str = "```";
const JSON_TAG: &str = "json";

#[derive(Debug, Error)]
pub enum ResponseParseError {
    #[error("empty response, no JSON found")]
    EmptyResponse,
    #[error("no JSON object or array delimiter found in response")]
    NoJsonDelimiter,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Removes one leading fence (optionally tagged `json`, any case) and one
/// trailing fence.
fn strip_code_fence(text: &str) -> &str {
    let mut body = text;
    if let Some(rest) = body.strip_prefix(FENCE) {
        body = match rest.get(..JSON_TAG.len()) {
            Some(tag) if tag.eq_ignore_ascii_case(JSON_TAG) => &rest[JSON_TAG.len()..],
            _ => rest,
        };
    }
    if let Some(rest) = body.strip_suffix(FENCE) {
        body = rest;
    }
    body.trim()
}

/// Pulls the first JSON object or array out of a model reply.
///
/// Prose before the first `{`/`[` is skipped and anything after the first
/// complete value is ignored, so `Here you go: {...} Enjoy!` parses.
pub fn extract_json(raw_text: &str) -> Result<Value, ResponseParseError> {
    let text = raw_text.trim_start_matches('\u{feff}').trim();
    if text.is_empty() {
        return Err(ResponseParseError::EmptyResponse);
    }

    let text = strip_code_fence(text);
    let start = text
        .find(['{', '['])
        .ok_or(ResponseParseError::NoJsonDelimiter)?;

    let mut stream = Deserializer::from_str(&text[start..]).into_iter::<Value>();
    match stream.next() {
        Some(Ok(value)) => {
            let consumed = start + stream.byte_offset();
            if consumed < text.len() {
                debug!(ignored_bytes = text.len() - consumed, "ignoring trailing content after JSON value");
            }
            Ok(value)
        }
        Some(Err(e)) => Err(ResponseParseError::InvalidJson(e)),
        // Unreachable in practice: the slice starts with a delimiter.
        None => Err(ResponseParseError::NoJsonDelimiter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fenced_json_inside_prose() {
        let raw = "Here you go:\n```json\n{\"breakfast\":[]}\n```\nEnjoy!";
        assert_eq!(extract_json(raw).unwrap(), json!({"breakfast": []}));
    }

    #[test]
    fn leading_fence_with_uppercase_tag() {
        let raw = "```JSON\n[{\"lunch\": [{\"id\": \"r1\"}]}]\n```";
        assert_eq!(extract_json(raw).unwrap(), json!([{"lunch": [{"id": "r1"}]}]));
    }

    #[test]
    fn bare_fence_and_bom() {
        let raw = "\u{feff}  ```\n{\"dinner\": null}\n```  ";
        assert_eq!(extract_json(raw).unwrap(), json!({"dinner": null}));
    }

    #[test]
    fn trailing_prose_with_braces_is_ignored() {
        let raw = "{\"a\": 1} and then {not json}";
        assert_eq!(extract_json(raw).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn first_delimiter_wins() {
        let raw = "days: [1, 2] then {\"a\": 1}";
        assert_eq!(extract_json(raw).unwrap(), json!([1, 2]));
    }

    #[test]
    fn empty_and_whitespace_only() {
        assert!(matches!(extract_json(""), Err(ResponseParseError::EmptyResponse)));
        assert!(matches!(extract_json("\u{feff} \n\t"), Err(ResponseParseError::EmptyResponse)));
    }

    #[test]
    fn no_delimiter() {
        assert!(matches!(extract_json("no json here"), Err(ResponseParseError::NoJsonDelimiter)));
    }

    #[test]
    fn invalid_json_carries_diagnostic() {
        let err = extract_json("Menu: {\"breakfast\": [}").unwrap_err();
        match err {
            ResponseParseError::InvalidJson(inner) => assert!(inner.line() >= 1),
            other => panic!("expected InvalidJson, got {:?}", other),
        }
    }

    #[test]
    fn truncated_json_is_invalid() {
        assert!(matches!(
            extract_json("{\"breakfast\": [{\"id\": \"r1\"}"),
            Err(ResponseParseError::InvalidJson(_))
        ));
    }
}
