use vibeflow_formats::{TagKind, scan_tags};
use vibeflow_utils::context::{ContextField, ContextPatch, ContextValue};
use vibeflow_utils::types::Phase;

use crate::{ExtractionInput, ExtractionStrategy};

/// Any `<answer>` or `<data>` tag naming a known context field.
///
/// Catches replies that used the tag format for a different step than the
/// one the store expected.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericTagScan;

impl ExtractionStrategy for GenericTagScan {
    fn name(&self) -> &'static str {
        "tag-scan"
    }

    fn applies_to(&self, phase: Phase) -> bool {
        !vibeflow_formats::is_free_form(phase)
    }

    fn extract(&self, input: &ExtractionInput<'_>) -> ContextPatch {
        let mut patch = ContextPatch::new();
        for tag in scan_tags(input.response, &[TagKind::Answer, TagKind::Data]) {
            let Some(field) = ContextField::from_name(&tag.field) else {
                tracing::trace!(field = %tag.field, "Skipping tag with unknown field");
                continue;
            };
            if patch.get(field).is_none() {
                patch.insert(field, ContextValue::Text(tag.value));
            }
        }
        patch
    }
}

/// `<data>` tags in design and architecture replies, with loosely spelled
/// field names (`tech_stack`, `Color Palette`, `structure`).
#[derive(Debug, Clone, Copy, Default)]
pub struct LooseDataScan;

const DESIGN_ALIASES: &[(&str, ContextField)] = &[
    ("designoptions", ContextField::DesignOptions),
    ("options", ContextField::DesignOptions),
    ("designchoice", ContextField::DesignChoice),
    ("choice", ContextField::DesignChoice),
    ("colorpalette", ContextField::ColorPalette),
    ("palette", ContextField::ColorPalette),
    ("colors", ContextField::ColorPalette),
    ("typography", ContextField::Typography),
    ("fonts", ContextField::Typography),
];

const ARCHITECTURE_ALIASES: &[(&str, ContextField)] = &[
    ("techstack", ContextField::TechStack),
    ("stack", ContextField::TechStack),
    ("projectstructure", ContextField::ProjectStructure),
    ("structure", ContextField::ProjectStructure),
    ("architecturedecisions", ContextField::ArchitectureDecisions),
    ("decisions", ContextField::ArchitectureDecisions),
];

fn aliases_for(phase: Phase) -> &'static [(&'static str, ContextField)] {
    match phase {
        Phase::Design => DESIGN_ALIASES,
        Phase::Architecture => ARCHITECTURE_ALIASES,
        _ => &[],
    }
}

/// Lowercase ASCII alphanumerics only.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl ExtractionStrategy for LooseDataScan {
    fn name(&self) -> &'static str {
        "data-scan"
    }

    fn applies_to(&self, phase: Phase) -> bool {
        matches!(phase, Phase::Design | Phase::Architecture)
    }

    fn extract(&self, input: &ExtractionInput<'_>) -> ContextPatch {
        let aliases = aliases_for(input.phase);
        let mut patch = ContextPatch::new();
        for tag in scan_tags(input.response, &[TagKind::Data]) {
            let key = normalize(&tag.field);
            let Some(&(_, field)) = aliases.iter().find(|(alias, _)| *alias == key) else {
                continue;
            };
            if patch.get(field).is_none() {
                patch.insert(field, ContextValue::Text(tag.value));
            }
        }
        patch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibeflow_utils::context::ConversationContext;

    fn run(strategy: &dyn ExtractionStrategy, phase: Phase, response: &str) -> ContextPatch {
        let ctx = ConversationContext::new();
        strategy.extract(&ExtractionInput {
            phase,
            sub_phase: None,
            response,
            last_user_input: "",
            context: &ctx,
        })
    }

    #[test]
    fn test_generic_scan_accepts_both_tag_kinds() {
        let reply = "<answer field=\"competitors\">Toggl</answer>\n\
                     <data field=\"marketSize\">$4B</data>\n\
                     <answer field=\"mood\">happy</answer>";
        let patch = run(&GenericTagScan, Phase::Discovery, reply);
        assert_eq!(patch.len(), 2);
        assert_eq!(
            patch.get(ContextField::MarketSize),
            Some(&ContextValue::text("$4B"))
        );
    }

    #[test]
    fn test_generic_scan_keeps_first_occurrence() {
        let reply = "<answer field=\"competitors\">Toggl</answer>\
                     <answer field=\"competitors\">Harvest</answer>";
        let patch = run(&GenericTagScan, Phase::Discovery, reply);
        assert_eq!(
            patch.get(ContextField::Competitors),
            Some(&ContextValue::text("Toggl"))
        );
    }

    #[test]
    fn test_generic_scan_coerces_list_fields() {
        let reply = "<data field=\"architectureDecisions\">Use SQLite | Ship as a desktop app</data>";
        let patch = run(&GenericTagScan, Phase::Architecture, reply);
        assert_eq!(
            patch.get(ContextField::ArchitectureDecisions),
            Some(&ContextValue::List(vec![
                "Use SQLite".to_string(),
                "Ship as a desktop app".to_string()
            ]))
        );
    }

    #[test]
    fn test_loose_scan_normalizes_names() {
        let reply = "<data field=\"tech_stack\">Tauri + Rust</data>\n\
                     <data field=\"Structure\">src/, crates/</data>\n\
                     <answer field=\"stack\">ignored</answer>";
        let patch = run(&LooseDataScan, Phase::Architecture, reply);
        assert_eq!(
            patch.get(ContextField::TechStack),
            Some(&ContextValue::text("Tauri + Rust"))
        );
        assert!(patch.get(ContextField::ProjectStructure).is_some());
        assert_eq!(patch.len(), 2);
    }

    #[test]
    fn test_loose_scan_respects_phase() {
        let reply = "<data field=\"palette\">#112233</data>";
        assert!(run(&LooseDataScan, Phase::Architecture, reply).is_empty());
        assert!(!run(&LooseDataScan, Phase::Design, reply).is_empty());
        assert!(!LooseDataScan.applies_to(Phase::Discovery));
    }
}
