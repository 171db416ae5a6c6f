use vibeflow_utils::context::{ContextField, ContextPatch, ContextValue};
use vibeflow_utils::types::Phase;

use crate::{ExtractionInput, ExtractionStrategy};

/// Classifies the user's last message during discovery by what the model
/// talks about in its reply.
///
/// A reply that mentions personas or target users implies the message it
/// answers was about target users. Rules are tried in order and the first
/// rule whose trigger appears decides the field; if that field is already
/// known the strategy yields nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscoveryKeywords;

/// (field, lowercase trigger phrases)
const RULES: &[(ContextField, &[&str])] = &[
    (
        ContextField::TargetUsers,
        &["target user", "persona", "audience", "who will use"],
    ),
    (
        ContextField::Competitors,
        &["competitor", "competition", "alternatives", "existing solution"],
    ),
    (
        ContextField::Differentiator,
        &["differentiat", "unique", "stand out", "sets you apart"],
    ),
    (
        ContextField::MainFeatures,
        &["main feature", "key feature", "core feature", "functionalit"],
    ),
    (
        ContextField::ProjectIdea,
        &["project idea", "your idea", "great idea", "interesting project"],
    ),
];

/// The field a reply's trigger phrases point at.
fn classify(response: &str) -> Option<ContextField> {
    let lower = response.to_lowercase();
    RULES
        .iter()
        .find(|(_, triggers)| triggers.iter().any(|t| lower.contains(t)))
        .map(|(field, _)| *field)
}

impl ExtractionStrategy for DiscoveryKeywords {
    fn name(&self) -> &'static str {
        "discovery-keywords"
    }

    fn applies_to(&self, phase: Phase) -> bool {
        phase == Phase::Discovery
    }

    fn extract(&self, input: &ExtractionInput<'_>) -> ContextPatch {
        let answer = input.last_user_input.trim();
        if answer.is_empty() {
            return ContextPatch::new();
        }
        match classify(input.response) {
            Some(field) if !input.context.is_set(field) => {
                ContextPatch::new().with(field, ContextValue::text(answer))
            }
            _ => ContextPatch::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibeflow_utils::context::ConversationContext;
    use vibeflow_utils::test_support::UNTAGGED_PERSONA_QUESTION;

    fn extract(ctx: &ConversationContext, response: &str, user: &str) -> ContextPatch {
        DiscoveryKeywords.extract(&ExtractionInput {
            phase: Phase::Discovery,
            sub_phase: None,
            response,
            last_user_input: user,
            context: ctx,
        })
    }

    #[test]
    fn test_persona_reply_classifies_user_input() {
        let ctx = ConversationContext::new();
        let patch = extract(&ctx, UNTAGGED_PERSONA_QUESTION, "  Freelance designers  ");
        assert_eq!(
            patch.get(ContextField::TargetUsers),
            Some(&ContextValue::text("Freelance designers"))
        );
        assert_eq!(patch.len(), 1);
    }

    #[test]
    fn test_known_field_yields_nothing() {
        let mut ctx = ConversationContext::new();
        ctx.set(ContextField::TargetUsers, ContextValue::text("X"));
        assert!(extract(&ctx, UNTAGGED_PERSONA_QUESTION, "Someone else").is_empty());
    }

    #[test]
    fn test_no_trigger_or_no_input() {
        let ctx = ConversationContext::new();
        assert!(extract(&ctx, "Thanks! Anything else?", "Sure").is_empty());
        assert!(extract(&ctx, "Who is your competition?", "   ").is_empty());
    }

    #[test]
    fn test_rule_order() {
        assert_eq!(
            classify("What makes you unique compared to your competitors?"),
            Some(ContextField::Competitors)
        );
        assert_eq!(
            classify("Great idea! What are the KEY FEATURES?"),
            Some(ContextField::MainFeatures)
        );
        assert_eq!(classify("Great idea!"), Some(ContextField::ProjectIdea));
        assert!(!DiscoveryKeywords.applies_to(Phase::Design));
    }
}
