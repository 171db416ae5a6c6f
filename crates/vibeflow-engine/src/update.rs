use vibeflow_extraction::{ExtractionInput, ExtractionOutcome};
use vibeflow_utils::context::ContextField;
use vibeflow_utils::logging::log_extraction_outcome;
use vibeflow_utils::types::SubPhase;

use crate::store::WorkflowStore;

/// What one model response changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextUpdate {
    /// Format key, fallback strategy name, `free-form` or `none`.
    pub source: String,
    /// Fields actually written to the context.
    pub fields: Vec<ContextField>,
    /// Step moved to, when the primary format matched and a next step exists.
    pub advanced_to: Option<SubPhase>,
}

impl ContextUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl WorkflowStore {
    /// Fold a model response into the active workflow's context.
    ///
    /// Free-form phases are left alone. A primary format hit overwrites its
    /// fields and moves to the next step; fallback results only fill fields
    /// that are still empty and never move the step.
    pub fn parse_and_update_context(
        &mut self,
        response: &str,
        last_user_input: &str,
    ) -> ContextUpdate {
        let workflow = self.workflow();
        // a missing or stale step has no format and goes to the fallbacks
        let sub_phase = workflow.current_sub_phase;
        let outcome = self.extractor.extract(&ExtractionInput {
            phase: workflow.current_phase,
            sub_phase,
            response,
            last_user_input,
            context: &workflow.conversation_context,
        });
        let source = outcome.source().to_string();

        let workflow = self.workflow_mut();
        let (fields, advanced_to) = match outcome {
            ExtractionOutcome::Primary {
                patch,
                next_sub_phase,
                ..
            } => {
                workflow.conversation_context.apply(&patch);
                // the last step stays current once answered
                workflow.current_sub_phase = next_sub_phase.or(sub_phase);
                (patch.fields().collect(), next_sub_phase)
            }
            ExtractionOutcome::Fallback { patch, .. } => {
                (workflow.conversation_context.merge_fallback(&patch), None)
            }
            ExtractionOutcome::FreeForm | ExtractionOutcome::Miss => (Vec::new(), None),
        };

        let names: Vec<&str> = fields.iter().map(ContextField::as_str).collect();
        log_extraction_outcome(&source, &names, advanced_to.is_some());

        ContextUpdate {
            source,
            fields,
            advanced_to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibeflow_utils::context::{ContextPatch, ContextValue};
    use vibeflow_utils::test_support::{
        MARKET_JSON_REPLY, UNTAGGED_PERSONA_QUESTION, answer_tag, data_tag, specifications_reply,
    };
    use vibeflow_utils::types::Phase;

    fn store_in(phase: Phase) -> WorkflowStore {
        let mut store = WorkflowStore::default();
        store.init_project_workflow("p1");
        store.set_phase(phase);
        store
    }

    #[test]
    fn test_primary_extraction_advances_sub_phase() {
        let mut store = store_in(Phase::Discovery);
        store.set_current_sub_phase(Some(SubPhase::ProjectIdea));
        let update = store.parse_and_update_context(
            "blah <answer field=\"projectIdea\">Todo app for students</answer>",
            "a todo app",
        );
        assert_eq!(update.source, "discovery:project-idea");
        assert_eq!(update.fields, vec![ContextField::ProjectIdea]);
        assert_eq!(update.advanced_to, Some(SubPhase::TargetUsers));
        assert_eq!(
            store.conversation_context().project_idea.as_deref(),
            Some("Todo app for students")
        );
        assert_eq!(store.current_sub_phase(), Some(SubPhase::TargetUsers));
    }

    #[test]
    fn test_unset_sub_phase_falls_back_without_overwriting() {
        let mut store = store_in(Phase::Discovery);
        store.set_conversation_context(
            &ContextPatch::new().with_text(ContextField::ProjectIdea, "X"),
        );
        assert_eq!(store.current_sub_phase(), None);

        let update =
            store.parse_and_update_context(&answer_tag(ContextField::ProjectIdea, "Y"), "");
        assert_ne!(update.source, "discovery:project-idea");
        assert!(update.is_empty());
        assert_eq!(update.advanced_to, None);
        assert_eq!(store.conversation_context().project_idea.as_deref(), Some("X"));
        assert_eq!(store.current_sub_phase(), None);
    }

    #[test]
    fn test_unset_sub_phase_fills_empty_fields_only() {
        let mut store = store_in(Phase::MarketAnalysis);
        let update = store.parse_and_update_context(
            &data_tag(ContextField::MarketSize, "TAM $4B"),
            "",
        );
        assert_eq!(update.fields, vec![ContextField::MarketSize]);
        assert_eq!(update.advanced_to, None);
        assert_eq!(store.current_sub_phase(), None);
    }

    #[test]
    fn test_step_left_over_from_previous_phase_is_not_a_format() {
        let mut store = store_in(Phase::Discovery);
        store.set_current_sub_phase(Some(SubPhase::Differentiator));
        store.complete_phase(Phase::Discovery, None);
        assert_eq!(store.current_phase(), Phase::MarketAnalysis);
        store.set_conversation_context(
            &ContextPatch::new().with_text(ContextField::MarketSize, "known"),
        );

        let update = store.parse_and_update_context(
            &data_tag(ContextField::MarketSize, "TAM $4B"),
            "",
        );
        assert_eq!(update.advanced_to, None);
        assert_eq!(store.conversation_context().market_size.as_deref(), Some("known"));
        assert_eq!(store.current_sub_phase(), Some(SubPhase::Differentiator));
    }

    #[test]
    fn test_last_step_stays_current() {
        let mut store = store_in(Phase::Architecture);
        store.set_current_sub_phase(Some(SubPhase::Structure));
        let update = store.parse_and_update_context(
            &data_tag(ContextField::ProjectStructure, "src/, crates/"),
            "",
        );
        assert_eq!(update.advanced_to, None);
        assert_eq!(update.fields, vec![ContextField::ProjectStructure]);
        assert_eq!(store.current_sub_phase(), Some(SubPhase::Structure));
    }

    #[test]
    fn test_fallback_never_overwrites() {
        let mut store = store_in(Phase::Discovery);
        store.set_conversation_context(
            &ContextPatch::new().with_text(ContextField::TargetUsers, "X"),
        );
        store.set_current_sub_phase(Some(SubPhase::MainFeatures));

        let update =
            store.parse_and_update_context(UNTAGGED_PERSONA_QUESTION, "Agencies with 50 people");
        assert!(update.is_empty());
        assert_eq!(store.conversation_context().target_users.as_deref(), Some("X"));
        assert_eq!(store.current_sub_phase(), Some(SubPhase::MainFeatures));
    }

    #[test]
    fn test_fallback_fills_and_does_not_advance() {
        let mut store = store_in(Phase::Discovery);
        store.set_current_sub_phase(Some(SubPhase::ProjectIdea));
        let update = store.parse_and_update_context(UNTAGGED_PERSONA_QUESTION, "Freelancers");
        assert_eq!(update.source, "discovery-keywords");
        assert_eq!(update.fields, vec![ContextField::TargetUsers]);
        assert_eq!(update.advanced_to, None);
        assert_eq!(store.current_sub_phase(), Some(SubPhase::ProjectIdea));
    }

    #[test]
    fn test_primary_tag_overwrites_existing_value() {
        let mut store = store_in(Phase::Discovery);
        store.set_conversation_context(
            &ContextPatch::new().with_text(ContextField::TargetUsers, "X"),
        );
        store.set_current_sub_phase(Some(SubPhase::TargetUsers));
        store.parse_and_update_context(&answer_tag(ContextField::TargetUsers, "Y"), "");
        assert_eq!(store.conversation_context().target_users.as_deref(), Some("Y"));
    }

    #[test]
    fn test_free_form_phase_is_untouched() {
        let mut store = store_in(Phase::Qa);
        let update =
            store.parse_and_update_context(&answer_tag(ContextField::ProjectIdea, "nope"), "");
        assert_eq!(update.source, "free-form");
        assert!(store.conversation_context().is_empty());
    }

    #[test]
    fn test_market_json_fallback() {
        let mut store = store_in(Phase::MarketAnalysis);
        store.set_conversation_context(
            &ContextPatch::new().with_text(ContextField::MarketSize, "known"),
        );
        let update = store.parse_and_update_context(MARKET_JSON_REPLY, "");
        assert_eq!(update.source, "market-json");
        assert_eq!(update.fields.len(), 3);
        assert_eq!(store.conversation_context().market_size.as_deref(), Some("known"));
    }

    #[test]
    fn test_specifications_summary_only_grows() {
        let mut store = store_in(Phase::Specifications);
        let long = "x".repeat(900);
        store.set_conversation_context(
            &ContextPatch::new().with_text(ContextField::SpecificationsSummary, long.clone()),
        );
        let update = store.parse_and_update_context(&specifications_reply(), "");
        assert_eq!(update.source, "specifications");
        assert!(!update.fields.contains(&ContextField::SpecificationsSummary));
        assert!(update.fields.contains(&ContextField::UserStories));
        assert_eq!(
            store
                .conversation_context()
                .get(ContextField::SpecificationsSummary),
            Some(ContextValue::Text(long))
        );
    }
}
