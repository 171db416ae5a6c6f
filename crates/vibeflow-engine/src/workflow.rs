use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use vibeflow_utils::context::ConversationContext;
use vibeflow_utils::types::{Phase, PhaseTable, SubPhase};

/// Everything tracked for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectWorkflow {
    pub current_phase: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_sub_phase: Option<SubPhase>,
    #[serde(default)]
    pub phases: PhaseTable,
    #[serde(default)]
    pub conversation_context: ConversationContext,
}

impl Default for ProjectWorkflow {
    fn default() -> Self {
        Self {
            current_phase: Phase::Welcome,
            current_sub_phase: None,
            phases: PhaseTable::new(),
            conversation_context: ConversationContext::new(),
        }
    }
}

impl ProjectWorkflow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded artifact paths by phase.
    #[must_use]
    pub fn artifacts(&self) -> BTreeMap<Phase, String> {
        self.phases
            .iter()
            .filter_map(|info| info.artifact.clone().map(|path| (info.phase, path)))
            .collect()
    }

    /// Successor of the latest completed or approved phase, if any.
    #[must_use]
    pub fn phase_after_latest_done(&self) -> Option<Phase> {
        self.phases.latest_done().map(|phase| phase.next())
    }
}
