use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use vibeflow_utils::context::{ContextField, ContextPatch, ContextValue};
use vibeflow_utils::types::Phase;

use crate::{ExtractionInput, ExtractionStrategy};

/// A fenced JSON object in a market-analysis reply.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarketJsonBlock;

const MARKET_FIELDS: [ContextField; 5] = [
    ContextField::MarketSize,
    ContextField::TargetSegments,
    ContextField::CompetitiveLandscape,
    ContextField::MarketOpportunity,
    ContextField::FullMarketAnalysis,
];

static FENCED_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json|JSON)?[ \t]*\r?\n\s*(\{.*?\})\s*```").unwrap());

fn to_context_value(value: Value) -> Option<ContextValue> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(ContextValue::Text(s)),
        Value::Array(items) => Some(ContextValue::List(
            items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect(),
        )),
        other => Some(ContextValue::Text(other.to_string())),
    }
}

impl ExtractionStrategy for MarketJsonBlock {
    fn name(&self) -> &'static str {
        "market-json"
    }

    fn applies_to(&self, phase: Phase) -> bool {
        phase == Phase::MarketAnalysis
    }

    fn extract(&self, input: &ExtractionInput<'_>) -> ContextPatch {
        for caps in FENCED_OBJECT.captures_iter(input.response) {
            let Some(body) = caps.get(1) else { continue };
            let object = match serde_json::from_str::<Value>(body.as_str()) {
                Ok(Value::Object(object)) => object,
                Ok(_) => continue,
                Err(e) => {
                    tracing::debug!(error = %e, "Fenced block is not valid JSON");
                    continue;
                }
            };

            let mut patch = ContextPatch::new();
            for (key, value) in object {
                let Some(field) = ContextField::from_name(&key) else {
                    continue;
                };
                if !MARKET_FIELDS.contains(&field) {
                    continue;
                }
                if let Some(value) = to_context_value(value) {
                    patch.insert(field, value);
                }
            }
            if !patch.is_empty() {
                return patch;
            }
        }
        ContextPatch::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibeflow_utils::context::ConversationContext;
    use vibeflow_utils::test_support::MARKET_JSON_REPLY;

    fn extract(response: &str) -> ContextPatch {
        let ctx = ConversationContext::new();
        MarketJsonBlock.extract(&ExtractionInput {
            phase: Phase::MarketAnalysis,
            sub_phase: None,
            response,
            last_user_input: "",
            context: &ctx,
        })
    }

    #[test]
    fn test_parses_fenced_object() {
        let patch = extract(MARKET_JSON_REPLY);
        assert_eq!(patch.len(), 4);
        assert_eq!(
            patch.get(ContextField::CompetitiveLandscape),
            Some(&ContextValue::text("Toggl, Harvest, Clockify"))
        );
    }

    #[test]
    fn test_skips_invalid_block_and_reads_next() {
        let reply = "```json\n{ not json }\n```\n\nRetry:\n```\n{\"marketSize\": 42, \"other\": 1}\n```";
        let patch = extract(reply);
        assert_eq!(patch.len(), 1);
        assert_eq!(
            patch.get(ContextField::MarketSize),
            Some(&ContextValue::text("42"))
        );
    }

    #[test]
    fn test_ignores_non_market_keys() {
        let reply = "```json\n{\"techStack\": \"Rust\", \"marketSize\": null}\n```";
        assert!(extract(reply).is_empty());
        assert!(extract("no fences here").is_empty());
    }

    #[test]
    fn test_array_values_become_text_for_text_fields() {
        let reply = "```json\n{\"targetSegments\": [\"Designers\", \"Developers\"]}\n```";
        let patch = extract(reply);
        assert_eq!(
            patch.get(ContextField::TargetSegments),
            Some(&ContextValue::text("Designers | Developers"))
        );
    }
}
