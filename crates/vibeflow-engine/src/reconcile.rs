//! Re-deriving progress from what exists on disk
//!
//! A phase whose artifact file is present is treated as completed, whatever
//! the stored status says. Phases are judged independently: a later phase
//! can be marked completed while an earlier one without an artifact stays
//! as it was.

use std::path::Path;

use chrono::Utc;

use vibeflow_utils::context::{ContextField, ConversationContext};
use vibeflow_utils::fs::ProjectFs;
use vibeflow_utils::types::{Phase, PhaseStatus};

use crate::store::WorkflowStore;

/// Artifact file names that prove a phase complete, in preference order.
#[must_use]
pub const fn artifact_candidates(phase: Phase) -> &'static [&'static str] {
    match phase {
        Phase::Discovery => &["DISCOVERY.xml"],
        Phase::MarketAnalysis => &["MARKET-ANALYSIS.xml", "MARKET_ANALYSIS.xml"],
        Phase::Specifications => &["SPECIFICATIONS.xml"],
        Phase::Design => &["DESIGN-SYSTEM.xml", "DESIGN-SYSTEM.html"],
        Phase::Architecture => &["ARCHITECTURE.md"],
        _ => &[],
    }
}

/// Market analysis can finish in conversation alone.
fn market_analysis_in_context(context: &ConversationContext) -> bool {
    context.is_set(ContextField::MarketSize)
        || context.is_set(ContextField::FullMarketAnalysis)
        || (context.is_set(ContextField::TargetSegments)
            && context.is_set(ContextField::CompetitiveLandscape)
            && context.is_set(ContextField::MarketOpportunity))
}

/// Outcome of an artifact scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Phases found satisfied, in lifecycle order.
    pub satisfied: Vec<Phase>,
    /// Current phase after the scan.
    pub current_phase: Phase,
}

impl WorkflowStore {
    /// Mark phases with artifacts under `project_path` as completed and move
    /// to the phase after the latest one.
    ///
    /// Satisfied phases get a fresh completion time and, if none was
    /// recorded, the artifact file name. Nothing satisfied means
    /// `discovery`. Probe failures count as absent.
    pub async fn recalculate_current_phase_from_artifacts(
        &mut self,
        fs: &dyn ProjectFs,
        project_path: &Path,
    ) -> ReconcileReport {
        let mut found: Vec<(Phase, Option<&'static str>)> = Vec::new();
        for phase in Phase::ALL {
            let mut artifact = None;
            for name in artifact_candidates(phase) {
                if fs.exists(&project_path.join(name)).await {
                    artifact = Some(*name);
                    break;
                }
            }
            if artifact.is_some() {
                found.push((phase, artifact));
            } else if phase == Phase::MarketAnalysis
                && market_analysis_in_context(self.conversation_context())
            {
                found.push((phase, None));
            }
        }

        let now = Utc::now();
        let workflow = self.workflow_mut();
        for (phase, artifact) in &found {
            let info = &mut workflow.phases[*phase];
            info.status = PhaseStatus::Completed;
            info.completed_at = Some(now);
            if info.artifact.is_none() {
                info.artifact = artifact.map(str::to_string);
            }
        }
        workflow.current_phase = found
            .last()
            .map_or(Phase::Discovery, |(phase, _)| phase.next());

        let report = ReconcileReport {
            satisfied: found.iter().map(|(phase, _)| *phase).collect(),
            current_phase: workflow.current_phase,
        };
        tracing::info!(
            project_path = %project_path.display(),
            satisfied = ?report.satisfied,
            phase = %report.current_phase,
            "Reconciled phases from artifacts"
        );
        report
    }

    /// Same scan over stored statuses only: the phase after the latest
    /// completed or approved one, else `discovery` with an active project
    /// and `welcome` without.
    pub fn recalculate_current_phase(&mut self) -> Phase {
        let has_project = self.active_project_id.is_some();
        let workflow = self.workflow_mut();
        workflow.current_phase = match workflow.phase_after_latest_done() {
            Some(phase) => phase,
            None if has_project => Phase::Discovery,
            None => Phase::Welcome,
        };
        workflow.current_phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibeflow_utils::context::ContextPatch;
    use vibeflow_utils::fs::MemoryFs;

    fn project() -> WorkflowStore {
        let mut store = WorkflowStore::default();
        store.init_project_workflow("p1");
        store
    }

    #[tokio::test]
    async fn test_nothing_on_disk_means_discovery() {
        let mut store = project();
        let report = store
            .recalculate_current_phase_from_artifacts(&MemoryFs::new(), Path::new("/proj"))
            .await;
        assert!(report.satisfied.is_empty());
        assert_eq!(report.current_phase, Phase::Discovery);
        assert_eq!(store.current_phase(), Phase::Discovery);
    }

    #[tokio::test]
    async fn test_gap_is_preserved() {
        let fs = MemoryFs::new()
            .with_file("/proj/DISCOVERY.xml", "<discovery/>")
            .with_file("/proj/SPECIFICATIONS.xml", "<specs/>");
        let mut store = project();
        let report = store
            .recalculate_current_phase_from_artifacts(&fs, Path::new("/proj"))
            .await;

        assert_eq!(report.satisfied, vec![Phase::Discovery, Phase::Specifications]);
        assert_eq!(store.current_phase(), Phase::Design);
        let phases = store.phases();
        assert_eq!(phases[Phase::Specifications].status, PhaseStatus::Completed);
        assert_eq!(phases[Phase::MarketAnalysis].status, PhaseStatus::Pending);
        assert_eq!(
            phases[Phase::Discovery].artifact.as_deref(),
            Some("DISCOVERY.xml")
        );
    }

    #[tokio::test]
    async fn test_alternate_spellings() {
        let fs = MemoryFs::new()
            .with_file("/proj/MARKET_ANALYSIS.xml", "")
            .with_file("/proj/DESIGN-SYSTEM.html", "");
        let mut store = project();
        let report = store
            .recalculate_current_phase_from_artifacts(&fs, Path::new("/proj"))
            .await;
        assert_eq!(report.satisfied, vec![Phase::MarketAnalysis, Phase::Design]);
        assert_eq!(report.current_phase, Phase::Architecture);
        assert_eq!(
            store.phases()[Phase::Design].artifact.as_deref(),
            Some("DESIGN-SYSTEM.html")
        );
    }

    #[tokio::test]
    async fn test_market_analysis_from_context() {
        let fs = MemoryFs::new().with_file("/proj/DISCOVERY.xml", "");
        let mut store = project();
        store.set_conversation_context(
            &ContextPatch::new()
                .with_text(ContextField::TargetSegments, "Freelancers")
                .with_text(ContextField::CompetitiveLandscape, "Toggl")
                .with_text(ContextField::MarketOpportunity, "Invoicing"),
        );
        let report = store
            .recalculate_current_phase_from_artifacts(&fs, Path::new("/proj"))
            .await;
        assert_eq!(report.current_phase, Phase::Specifications);
        assert_eq!(store.phases()[Phase::MarketAnalysis].artifact, None);
    }

    #[tokio::test]
    async fn test_partial_market_context_is_not_enough() {
        let mut store = project();
        store.set_conversation_context(
            &ContextPatch::new().with_text(ContextField::TargetSegments, "Freelancers"),
        );
        let report = store
            .recalculate_current_phase_from_artifacts(&MemoryFs::new(), Path::new("/proj"))
            .await;
        assert!(report.satisfied.is_empty());
    }

    #[tokio::test]
    async fn test_architecture_artifact_moves_to_execution() {
        let fs = MemoryFs::new().with_file("/proj/ARCHITECTURE.md", "# Arch");
        let mut store = project();
        store.complete_phase(Phase::Architecture, Some("docs/ARCH.md".to_string()));
        store
            .recalculate_current_phase_from_artifacts(&fs, Path::new("/proj"))
            .await;
        assert_eq!(store.current_phase(), Phase::Execution);
        // an existing path is kept
        assert_eq!(
            store.phases()[Phase::Architecture].artifact.as_deref(),
            Some("docs/ARCH.md")
        );
    }

    #[test]
    fn test_sync_variant_defaults() {
        let mut store = WorkflowStore::default();
        assert_eq!(store.recalculate_current_phase(), Phase::Welcome);

        store.init_project_workflow("p1");
        assert_eq!(store.recalculate_current_phase(), Phase::Discovery);

        store.update_phase_status(Phase::Design, PhaseStatus::Completed);
        assert_eq!(store.recalculate_current_phase(), Phase::Architecture);
        assert_eq!(store.current_phase(), Phase::Architecture);
    }

    #[test]
    fn test_candidates_only_for_artifact_phases() {
        assert!(artifact_candidates(Phase::Welcome).is_empty());
        assert!(artifact_candidates(Phase::Qa).is_empty());
        assert_eq!(artifact_candidates(Phase::Design).len(), 2);
    }
}
