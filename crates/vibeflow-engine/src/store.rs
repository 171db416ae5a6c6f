//! The per-project phase state machine
//!
//! [`WorkflowStore`] keeps one [`ProjectWorkflow`] per project id plus a
//! pointer to the active project. Every operation resolves its target
//! through that pointer, so the stored workflow is always the live one and
//! switching projects never has to copy state back. With no active project,
//! operations act on a detached workflow that is never persisted under an id.

use std::collections::BTreeMap;

use chrono::Utc;

use vibeflow_extraction::ContextExtractor;
use vibeflow_utils::context::{ContextPatch, ConversationContext};
use vibeflow_utils::logging::{log_phase_transition, project_span};
use vibeflow_utils::types::{Phase, PhaseStatus, PhaseTable, ProjectId, SubPhase};

use crate::options::EngineOptions;
use crate::workflow::ProjectWorkflow;

#[derive(Debug)]
pub struct WorkflowStore {
    pub(crate) project_workflows: BTreeMap<ProjectId, ProjectWorkflow>,
    pub(crate) active_project_id: Option<ProjectId>,
    pub(crate) detached: ProjectWorkflow,
    pub(crate) active_skills: Vec<String>,
    pub(crate) options: EngineOptions,
    pub(crate) extractor: ContextExtractor,
}

impl Default for WorkflowStore {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

impl WorkflowStore {
    #[must_use]
    pub fn new(options: EngineOptions) -> Self {
        let extractor = ContextExtractor::new(options.extraction);
        Self {
            project_workflows: BTreeMap::new(),
            active_project_id: None,
            detached: ProjectWorkflow::default(),
            active_skills: Vec::new(),
            options,
            extractor,
        }
    }

    /// Replace the extractor, e.g. with a custom fallback chain.
    #[must_use]
    pub fn with_extractor(mut self, extractor: ContextExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    // ---- accessors ----

    #[must_use]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    #[must_use]
    pub fn active_project_id(&self) -> Option<&str> {
        self.active_project_id.as_deref()
    }

    /// The workflow operations currently act on.
    #[must_use]
    pub fn workflow(&self) -> &ProjectWorkflow {
        self.active_project_id
            .as_ref()
            .and_then(|id| self.project_workflows.get(id))
            .unwrap_or(&self.detached)
    }

    pub(crate) fn workflow_mut(&mut self) -> &mut ProjectWorkflow {
        match &self.active_project_id {
            Some(id) => self.project_workflows.entry(id.clone()).or_default(),
            None => &mut self.detached,
        }
    }

    #[must_use]
    pub fn current_phase(&self) -> Phase {
        self.workflow().current_phase
    }

    #[must_use]
    pub fn current_sub_phase(&self) -> Option<SubPhase> {
        self.workflow().current_sub_phase
    }

    #[must_use]
    pub fn phases(&self) -> &PhaseTable {
        &self.workflow().phases
    }

    #[must_use]
    pub fn conversation_context(&self) -> &ConversationContext {
        &self.workflow().conversation_context
    }

    /// Stored workflow of any project, active or not.
    #[must_use]
    pub fn project_workflow(&self, id: &str) -> Option<&ProjectWorkflow> {
        self.project_workflows.get(id)
    }

    pub fn project_ids(&self) -> impl Iterator<Item = &str> {
        self.project_workflows.keys().map(String::as_str)
    }

    /// Skills derived by the last state-document read. Not persisted.
    #[must_use]
    pub fn active_skills(&self) -> &[String] {
        &self.active_skills
    }

    // ---- project selection ----

    /// Make `project_id` active, or clear the selection with `None`.
    ///
    /// An unseen project gets a fresh workflow. The loaded workflow's
    /// current phase is then re-derived from its statuses: the successor of
    /// the latest completed or approved phase. Clearing the selection resets
    /// the detached workflow and leaves stored projects alone.
    pub fn switch_to_project(&mut self, project_id: Option<&str>) {
        let _span = project_span(project_id, "switch").entered();
        let Some(id) = project_id else {
            self.active_project_id = None;
            self.detached = ProjectWorkflow::default();
            tracing::debug!("Cleared active project");
            return;
        };

        self.active_project_id = Some(id.to_string());
        let workflow = self.project_workflows.entry(id.to_string()).or_default();
        if let Some(phase) = workflow.phase_after_latest_done() {
            workflow.current_phase = phase;
        }
        tracing::debug!(phase = %workflow.current_phase, "Switched project");
    }

    /// Create a workflow for `project_id` and make it active. An existing
    /// project is simply switched to.
    pub fn init_project_workflow(&mut self, project_id: &str) {
        if self.project_workflows.contains_key(project_id) {
            self.switch_to_project(Some(project_id));
            return;
        }
        self.project_workflows
            .insert(project_id.to_string(), ProjectWorkflow::default());
        self.active_project_id = Some(project_id.to_string());
        tracing::info!(project_id, "Initialized project workflow");
    }

    /// Remove a project's stored workflow.
    ///
    /// Deleting the active project clears the selection; its workflow stays
    /// reachable as the detached one until the next switch or reset.
    pub fn delete_project_workflow(&mut self, project_id: &str) {
        let Some(removed) = self.project_workflows.remove(project_id) else {
            return;
        };
        if self.active_project_id.as_deref() == Some(project_id) {
            tracing::warn!(project_id, "Deleted the active project's workflow");
            self.active_project_id = None;
            self.detached = removed;
        }
    }

    // ---- transitions ----

    /// Enter `phase`: `in_progress`, fresh start time, becomes current.
    pub fn set_phase(&mut self, phase: Phase) {
        let workflow = self.workflow_mut();
        let info = &mut workflow.phases[phase];
        info.status = PhaseStatus::InProgress;
        info.started_at = Some(Utc::now());
        workflow.current_phase = phase;
        tracing::debug!(phase = %phase, "Phase started");
    }

    /// Set the current step. Not checked against the current phase.
    pub fn set_current_sub_phase(&mut self, sub_phase: Option<SubPhase>) {
        self.workflow_mut().current_sub_phase = sub_phase;
    }

    /// Overwrite one phase's status, touching nothing else.
    ///
    /// With strict transitions enabled, an update that would lower the
    /// status rank is refused. Returns whether the status was written.
    pub fn update_phase_status(&mut self, phase: Phase, status: PhaseStatus) -> bool {
        let strict = self.options.strict_status_transitions;
        let info = &mut self.workflow_mut().phases[phase];
        if strict && info.status.is_regression_to(status) {
            tracing::warn!(
                phase = %phase,
                from = %info.status,
                to = %status,
                "Refusing status regression"
            );
            return false;
        }
        info.status = status;
        true
    }

    /// Finish `phase` and start its successor.
    ///
    /// `phase` becomes `completed` with a completion time and records
    /// `artifact`, clearing any earlier path when it is `None`. The successor
    /// (clamped at the last phase) becomes `in_progress` with a fresh start
    /// time and the current phase.
    /// Completing the last phase leaves it `completed`.
    pub fn complete_phase(&mut self, phase: Phase, artifact: Option<String>) {
        let now = Utc::now();
        let next = phase.next();
        let project_id = self.active_project_id.clone();
        let workflow = self.workflow_mut();

        let info = &mut workflow.phases[phase];
        info.status = PhaseStatus::Completed;
        info.completed_at = Some(now);
        info.artifact = artifact;

        if next != phase {
            let next_info = &mut workflow.phases[next];
            next_info.status = PhaseStatus::InProgress;
            next_info.started_at = Some(now);
        }
        workflow.current_phase = next;

        log_phase_transition(project_id.as_deref(), phase, next);
    }

    /// Shallow merge: every field in `patch` overwrites the stored value.
    pub fn set_conversation_context(&mut self, patch: &ContextPatch) {
        self.workflow_mut().conversation_context.apply(patch);
    }

    /// Start the active project over. With no active project only the
    /// detached workflow is reset.
    pub fn reset_workflow(&mut self) {
        *self.workflow_mut() = ProjectWorkflow::default();
        tracing::info!(
            project_id = self.active_project_id.as_deref().unwrap_or("<none>"),
            "Workflow reset"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibeflow_utils::context::ContextField;

    fn store_with(id: &str) -> WorkflowStore {
        let mut store = WorkflowStore::default();
        store.init_project_workflow(id);
        store
    }

    #[test]
    fn test_new_store_is_detached_welcome() {
        let store = WorkflowStore::default();
        assert_eq!(store.active_project_id(), None);
        assert_eq!(store.current_phase(), Phase::Welcome);
        assert_eq!(store.project_ids().count(), 0);
    }

    #[test]
    fn test_init_creates_and_activates() {
        let store = store_with("p1");
        assert_eq!(store.active_project_id(), Some("p1"));
        assert!(store.project_workflow("p1").is_some());
        assert_eq!(store.current_phase(), Phase::Welcome);
    }

    #[test]
    fn test_init_existing_switches_without_reset() {
        let mut store = store_with("p1");
        store.set_phase(Phase::Discovery);
        store.init_project_workflow("p2");
        store.init_project_workflow("p1");
        assert_eq!(store.active_project_id(), Some("p1"));
        assert_eq!(store.current_phase(), Phase::Discovery);
    }

    #[test]
    fn test_switch_keeps_previous_project_state() {
        let mut store = store_with("p1");
        store.set_phase(Phase::Discovery);
        store.set_conversation_context(
            &ContextPatch::new().with_text(ContextField::ProjectIdea, "Todo app"),
        );

        store.switch_to_project(Some("p2"));
        assert_eq!(store.current_phase(), Phase::Welcome);
        assert!(store.conversation_context().is_empty());

        store.switch_to_project(Some("p1"));
        assert_eq!(store.current_phase(), Phase::Discovery);
        assert!(store.conversation_context().is_set(ContextField::ProjectIdea));
    }

    #[test]
    fn test_switch_recomputes_phase_from_statuses() {
        let mut store = store_with("p1");
        store.set_phase(Phase::Welcome);
        store.update_phase_status(Phase::Specifications, PhaseStatus::Approved);
        store.switch_to_project(Some("p2"));
        store.switch_to_project(Some("p1"));
        assert_eq!(store.current_phase(), Phase::Design);
    }

    #[test]
    fn test_switch_to_none_resets_detached_only() {
        let mut store = store_with("p1");
        store.set_phase(Phase::Design);
        store.switch_to_project(None);
        assert_eq!(store.active_project_id(), None);
        assert_eq!(store.current_phase(), Phase::Welcome);
        assert_eq!(
            store.project_workflow("p1").unwrap().current_phase,
            Phase::Design
        );
    }

    #[test]
    fn test_set_phase_marks_in_progress() {
        let mut store = store_with("p1");
        store.set_phase(Phase::MarketAnalysis);
        let info = &store.phases()[Phase::MarketAnalysis];
        assert_eq!(info.status, PhaseStatus::InProgress);
        assert!(info.started_at.is_some());
        assert_eq!(store.current_phase(), Phase::MarketAnalysis);
    }

    #[test]
    fn test_complete_phase_starts_successor() {
        let mut store = store_with("p1");
        store.complete_phase(Phase::Discovery, Some("DISCOVERY.xml".to_string()));
        let phases = store.phases();
        assert_eq!(phases[Phase::Discovery].status, PhaseStatus::Completed);
        assert_eq!(phases[Phase::Discovery].artifact.as_deref(), Some("DISCOVERY.xml"));
        assert!(phases[Phase::Discovery].completed_at.is_some());
        assert_eq!(phases[Phase::MarketAnalysis].status, PhaseStatus::InProgress);
        assert_eq!(store.current_phase(), Phase::MarketAnalysis);
    }

    #[test]
    fn test_complete_without_artifact_clears_recorded_path() {
        let mut store = store_with("p1");
        store.complete_phase(Phase::Design, Some("DESIGN-SYSTEM.html".to_string()));
        store.complete_phase(Phase::Design, None);
        assert_eq!(store.phases()[Phase::Design].artifact, None);
        assert!(store.workflow().artifacts().is_empty());
    }

    #[test]
    fn test_complete_last_phase_is_clamped() {
        let mut store = store_with("p1");
        store.complete_phase(Phase::Deployment, None);
        assert_eq!(store.current_phase(), Phase::Deployment);
        assert_eq!(store.phases()[Phase::Deployment].status, PhaseStatus::Completed);
    }

    #[test]
    fn test_update_status_has_no_side_effects() {
        let mut store = store_with("p1");
        assert!(store.update_phase_status(Phase::Qa, PhaseStatus::AwaitingApproval));
        assert_eq!(store.phases()[Phase::Qa].status, PhaseStatus::AwaitingApproval);
        assert_eq!(store.current_phase(), Phase::Welcome);
        assert_eq!(store.phases()[Phase::Deployment].status, PhaseStatus::Pending);
        // regressions are allowed by default
        assert!(store.update_phase_status(Phase::Qa, PhaseStatus::Pending));
    }

    #[test]
    fn test_strict_transitions_refuse_regression() {
        let options = EngineOptions {
            strict_status_transitions: true,
            ..EngineOptions::default()
        };
        let mut store = WorkflowStore::new(options);
        store.init_project_workflow("p1");
        assert!(store.update_phase_status(Phase::Design, PhaseStatus::Completed));
        assert!(!store.update_phase_status(Phase::Design, PhaseStatus::InProgress));
        assert_eq!(store.phases()[Phase::Design].status, PhaseStatus::Completed);
    }

    #[test]
    fn test_context_merge_overwrites_matching_keys() {
        let mut store = store_with("p1");
        store.set_conversation_context(
            &ContextPatch::new()
                .with_text(ContextField::ProjectIdea, "v1")
                .with_text(ContextField::Competitors, "Toggl"),
        );
        store.set_conversation_context(
            &ContextPatch::new().with_text(ContextField::ProjectIdea, "v2"),
        );
        let ctx = store.conversation_context();
        assert_eq!(ctx.project_idea.as_deref(), Some("v2"));
        assert_eq!(ctx.competitors.as_deref(), Some("Toggl"));
    }

    #[test]
    fn test_reset_active_project() {
        let mut store = store_with("p1");
        store.complete_phase(Phase::Discovery, None);
        store.reset_workflow();
        assert_eq!(store.current_phase(), Phase::Welcome);
        assert_eq!(
            store.project_workflow("p1"),
            Some(&ProjectWorkflow::default())
        );
    }

    #[test]
    fn test_reset_without_project_touches_only_detached() {
        let mut store = store_with("p1");
        store.set_phase(Phase::Qa);
        store.switch_to_project(None);
        store.set_phase(Phase::Design);
        store.reset_workflow();
        assert_eq!(store.current_phase(), Phase::Welcome);
        assert_eq!(store.project_workflow("p1").unwrap().current_phase, Phase::Qa);
    }

    #[test]
    fn test_delete_inactive_project() {
        let mut store = store_with("p1");
        store.init_project_workflow("p2");
        store.delete_project_workflow("p1");
        assert!(store.project_workflow("p1").is_none());
        assert_eq!(store.active_project_id(), Some("p2"));
    }

    #[test]
    fn test_delete_active_project_detaches() {
        let mut store = store_with("p1");
        store.set_phase(Phase::Architecture);
        store.delete_project_workflow("p1");
        assert_eq!(store.active_project_id(), None);
        assert_eq!(store.project_ids().count(), 0);
        assert_eq!(store.current_phase(), Phase::Architecture);
    }

    #[test]
    fn test_set_current_sub_phase_is_not_validated() {
        let mut store = store_with("p1");
        store.set_phase(Phase::Discovery);
        store.set_current_sub_phase(Some(SubPhase::TechStack));
        assert_eq!(store.current_sub_phase(), Some(SubPhase::TechStack));
    }
}
