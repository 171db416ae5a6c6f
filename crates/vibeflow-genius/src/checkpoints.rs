use serde::{Deserialize, Serialize};

use vibeflow_utils::types::{Phase, PhaseStatus, PhaseTable};

/// The nine milestone flags shared with the external tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Checkpoints {
    pub discovery_complete: bool,
    pub market_analysis_complete: bool,
    pub specs_approved: bool,
    pub design_chosen: bool,
    pub architecture_approved: bool,
    pub execution_started: bool,
    pub execution_complete: bool,
    pub qa_passed: bool,
    pub deployed: bool,
}

/// Guidance for the first unmet checkpoint, in checkpoint order.
const ACTIONS: [&str; 9] = [
    "Run genius-interviewer to discover requirements",
    "Run genius-team to analyze the market",
    "Run genius-team to write and approve the specifications",
    "Run genius-designer to choose a design system",
    "Run genius-architect to approve the architecture",
    "Run genius-orchestrator to start execution",
    "Run genius-dev to finish the remaining tasks",
    "Run genius-qa to verify the build",
    "Run genius-deployer to ship the project",
];

impl Checkpoints {
    /// Derive flags from phase statuses.
    ///
    /// `execution_started` holds once execution has left `pending`; every
    /// other flag holds once its phase is completed or approved.
    #[must_use]
    pub fn from_phases(phases: &PhaseTable) -> Self {
        let done = |phase: Phase| phases[phase].status.is_done();
        Self {
            discovery_complete: done(Phase::Discovery),
            market_analysis_complete: done(Phase::MarketAnalysis),
            specs_approved: done(Phase::Specifications),
            design_chosen: done(Phase::Design),
            architecture_approved: done(Phase::Architecture),
            execution_started: phases[Phase::Execution].status != PhaseStatus::Pending,
            execution_complete: done(Phase::Execution),
            qa_passed: done(Phase::Qa),
            deployed: done(Phase::Deployment),
        }
    }

    /// Flags in document order.
    #[must_use]
    pub fn as_array(&self) -> [bool; 9] {
        [
            self.discovery_complete,
            self.market_analysis_complete,
            self.specs_approved,
            self.design_chosen,
            self.architecture_approved,
            self.execution_started,
            self.execution_complete,
            self.qa_passed,
            self.deployed,
        ]
    }

    #[must_use]
    pub fn all_met(&self) -> bool {
        self.as_array().iter().all(|met| *met)
    }

    /// What the external tool will ask for next, or `None` once deployed.
    #[must_use]
    pub fn next_required_action(&self) -> Option<&'static str> {
        self.as_array()
            .iter()
            .position(|met| !met)
            .map(|index| ACTIONS[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_phases_have_no_checkpoints() {
        let checkpoints = Checkpoints::from_phases(&PhaseTable::new());
        assert_eq!(checkpoints, Checkpoints::default());
        assert_eq!(
            checkpoints.next_required_action(),
            Some("Run genius-interviewer to discover requirements")
        );
    }

    #[test]
    fn test_approved_counts_as_done() {
        let mut phases = PhaseTable::new();
        phases[Phase::Discovery].status = PhaseStatus::Completed;
        phases[Phase::Specifications].status = PhaseStatus::Approved;
        phases[Phase::Design].status = PhaseStatus::AwaitingApproval;
        phases[Phase::Execution].status = PhaseStatus::InProgress;

        let checkpoints = Checkpoints::from_phases(&phases);
        assert!(checkpoints.discovery_complete);
        assert!(checkpoints.specs_approved);
        assert!(!checkpoints.design_chosen);
        assert!(checkpoints.execution_started);
        assert!(!checkpoints.execution_complete);
        assert_eq!(
            checkpoints.next_required_action(),
            Some("Run genius-team to analyze the market")
        );
    }

    #[test]
    fn test_all_met() {
        let mut phases = PhaseTable::new();
        for phase in Phase::ALL {
            phases[phase].status = PhaseStatus::Completed;
        }
        let checkpoints = Checkpoints::from_phases(&phases);
        assert!(checkpoints.all_met());
        assert_eq!(checkpoints.next_required_action(), None);
    }

    #[test]
    fn test_serializes_snake_case_keys() {
        let value = serde_json::to_value(Checkpoints::default()).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 9);
        assert!(keys.contains(&"market_analysis_complete".to_string()));
    }
}
