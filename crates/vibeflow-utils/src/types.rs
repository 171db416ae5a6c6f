use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use crate::error::VibeflowError;

/// Identifier of a project workflow (the project's id as known to the host app).
pub type ProjectId = String;

/// Phases of the project lifecycle.
///
/// Phases are totally ordered. The order drives "next phase" and
/// "latest completed" computations everywhere in the workspace:
///
/// ```text
/// welcome → discovery → market-analysis → specifications → design
///         → architecture → execution → qa → deployment
/// ```
///
/// # Example
///
/// ```rust
/// use vibeflow_utils::types::Phase;
///
/// assert_eq!(Phase::Discovery.next(), Phase::MarketAnalysis);
/// assert_eq!(Phase::Deployment.next(), Phase::Deployment);
/// assert_eq!(Phase::MarketAnalysis.as_str(), "market-analysis");
/// ```
///
/// # Serialization
///
/// `Phase` serializes to its kebab-case name (e.g. `"market-analysis"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// No project yet, onboarding.
    Welcome,
    /// Interview phase: understanding the project.
    Discovery,
    /// Market and competition analysis.
    MarketAnalysis,
    /// Writing specifications.
    Specifications,
    /// Design system creation.
    Design,
    /// Technical architecture.
    Architecture,
    /// Building the project.
    Execution,
    /// Quality assurance.
    Qa,
    /// Shipping to production.
    Deployment,
}

impl Phase {
    /// All phases in lifecycle order.
    pub const ALL: [Phase; 9] = [
        Phase::Welcome,
        Phase::Discovery,
        Phase::MarketAnalysis,
        Phase::Specifications,
        Phase::Design,
        Phase::Architecture,
        Phase::Execution,
        Phase::Qa,
        Phase::Deployment,
    ];

    /// The last phase of the lifecycle.
    pub const LAST: Phase = Phase::Deployment;

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::Discovery => "discovery",
            Self::MarketAnalysis => "market-analysis",
            Self::Specifications => "specifications",
            Self::Design => "design",
            Self::Architecture => "architecture",
            Self::Execution => "execution",
            Self::Qa => "qa",
            Self::Deployment => "deployment",
        }
    }

    /// Position of this phase in lifecycle order (0-based).
    #[must_use]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Phase at the given lifecycle position, if any.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Successor in lifecycle order, clamped at [`Phase::LAST`].
    #[must_use]
    pub fn next(&self) -> Self {
        Self::from_index(self.index() + 1).unwrap_or(Self::LAST)
    }

    /// Ordered sub-phase sequence of this phase (empty when the phase has none).
    #[must_use]
    pub const fn sub_phases(&self) -> &'static [SubPhase] {
        match self {
            Self::Discovery => &[
                SubPhase::ProjectIdea,
                SubPhase::TargetUsers,
                SubPhase::MainFeatures,
                SubPhase::Competitors,
                SubPhase::Differentiator,
            ],
            Self::MarketAnalysis => &[
                SubPhase::MarketSize,
                SubPhase::Segments,
                SubPhase::Competitive,
                SubPhase::Opportunity,
            ],
            Self::Design => &[SubPhase::DesignOptions, SubPhase::DesignChoice],
            Self::Architecture => &[SubPhase::TechStack, SubPhase::Structure],
            _ => &[],
        }
    }

    /// Short human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Welcome => "Welcome",
            Self::Discovery => "Discovery",
            Self::MarketAnalysis => "Market Analysis",
            Self::Specifications => "Specifications",
            Self::Design => "Design",
            Self::Architecture => "Architecture",
            Self::Execution => "Execution",
            Self::Qa => "QA",
            Self::Deployment => "Deployment",
        }
    }

    /// One-line description shown next to the label.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Welcome => "Get started with your new project",
            Self::Discovery => "Tell me about your project idea",
            Self::MarketAnalysis => "Understanding the market and competition",
            Self::Specifications => "Defining features and requirements",
            Self::Design => "Creating the visual identity",
            Self::Architecture => "Planning the technical foundation",
            Self::Execution => "Building your project",
            Self::Qa => "Testing and quality assurance",
            Self::Deployment => "Shipping to production",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = VibeflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| VibeflowError::UnknownPhase(s.to_string()))
    }
}

/// Status of a single phase.
///
/// Statuses are ranked `pending < in_progress < awaiting_approval < approved
/// < completed`. The rank is informational: transitions are not validated
/// unless strict transitions are enabled by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    #[default]
    Pending,
    InProgress,
    AwaitingApproval,
    Approved,
    Completed,
}

impl PhaseStatus {
    pub const ALL: [PhaseStatus; 5] = [
        PhaseStatus::Pending,
        PhaseStatus::InProgress,
        PhaseStatus::AwaitingApproval,
        PhaseStatus::Approved,
        PhaseStatus::Completed,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::AwaitingApproval => "awaiting_approval",
            Self::Approved => "approved",
            Self::Completed => "completed",
        }
    }

    #[must_use]
    pub const fn rank(&self) -> u8 {
        *self as u8
    }

    /// `completed` or `approved`: the phase counts as done.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Completed | Self::Approved)
    }

    /// True if moving from `self` to `to` would lower the status rank.
    #[must_use]
    pub const fn is_regression_to(&self, to: PhaseStatus) -> bool {
        to.rank() < self.rank()
    }
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhaseStatus {
    type Err = VibeflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| VibeflowError::UnknownStatus(s.to_string()))
    }
}

/// Finer-grained conversational step inside a phase.
///
/// Each variant belongs to exactly one phase (see [`SubPhase::phase`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubPhase {
    // discovery
    ProjectIdea,
    TargetUsers,
    MainFeatures,
    Competitors,
    Differentiator,
    // market-analysis
    MarketSize,
    Segments,
    Competitive,
    Opportunity,
    // design
    DesignOptions,
    DesignChoice,
    // architecture
    TechStack,
    Structure,
}

impl SubPhase {
    pub const ALL: [SubPhase; 13] = [
        SubPhase::ProjectIdea,
        SubPhase::TargetUsers,
        SubPhase::MainFeatures,
        SubPhase::Competitors,
        SubPhase::Differentiator,
        SubPhase::MarketSize,
        SubPhase::Segments,
        SubPhase::Competitive,
        SubPhase::Opportunity,
        SubPhase::DesignOptions,
        SubPhase::DesignChoice,
        SubPhase::TechStack,
        SubPhase::Structure,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectIdea => "project-idea",
            Self::TargetUsers => "target-users",
            Self::MainFeatures => "main-features",
            Self::Competitors => "competitors",
            Self::Differentiator => "differentiator",
            Self::MarketSize => "market-size",
            Self::Segments => "segments",
            Self::Competitive => "competitive",
            Self::Opportunity => "opportunity",
            Self::DesignOptions => "design-options",
            Self::DesignChoice => "design-choice",
            Self::TechStack => "tech-stack",
            Self::Structure => "structure",
        }
    }

    /// The phase this sub-phase belongs to.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        match self {
            Self::ProjectIdea
            | Self::TargetUsers
            | Self::MainFeatures
            | Self::Competitors
            | Self::Differentiator => Phase::Discovery,
            Self::MarketSize | Self::Segments | Self::Competitive | Self::Opportunity => {
                Phase::MarketAnalysis
            }
            Self::DesignOptions | Self::DesignChoice => Phase::Design,
            Self::TechStack | Self::Structure => Phase::Architecture,
        }
    }
}

impl fmt::Display for SubPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubPhase {
    type Err = VibeflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|sp| sp.as_str() == s)
            .ok_or_else(|| VibeflowError::UnknownSubPhase(s.to_string()))
    }
}

/// Status record of one phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseInfo {
    pub phase: Phase,
    pub status: PhaseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Path of the generated artifact (e.g. `DISCOVERY.xml`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
}

impl PhaseInfo {
    #[must_use]
    pub fn pending(phase: Phase) -> Self {
        Self {
            phase,
            status: PhaseStatus::Pending,
            started_at: None,
            completed_at: None,
            artifact: None,
        }
    }
}

/// One [`PhaseInfo`] per [`Phase`], always complete.
///
/// Serializes as a JSON object keyed by phase name. Entries missing from
/// a deserialized document are filled in as `pending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<Phase, PhaseInfo>",
    into = "BTreeMap<Phase, PhaseInfo>"
)]
pub struct PhaseTable {
    entries: [PhaseInfo; 9],
}

impl PhaseTable {
    /// All phases `pending`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Phase::ALL.map(PhaseInfo::pending),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PhaseInfo> {
        self.entries.iter()
    }

    /// Highest-ordered phase whose status is `completed` or `approved`.
    #[must_use]
    pub fn latest_done(&self) -> Option<Phase> {
        self.entries
            .iter()
            .rev()
            .find(|info| info.status.is_done())
            .map(|info| info.phase)
    }
}

impl Default for PhaseTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<Phase> for PhaseTable {
    type Output = PhaseInfo;

    fn index(&self, phase: Phase) -> &PhaseInfo {
        &self.entries[phase.index()]
    }
}

impl IndexMut<Phase> for PhaseTable {
    fn index_mut(&mut self, phase: Phase) -> &mut PhaseInfo {
        &mut self.entries[phase.index()]
    }
}

impl From<BTreeMap<Phase, PhaseInfo>> for PhaseTable {
    fn from(map: BTreeMap<Phase, PhaseInfo>) -> Self {
        let mut table = Self::new();
        for (phase, mut info) in map {
            // the key is authoritative
            info.phase = phase;
            table[phase] = info;
        }
        table
    }
}

impl From<PhaseTable> for BTreeMap<Phase, PhaseInfo> {
    fn from(table: PhaseTable) -> Self {
        table
            .entries
            .into_iter()
            .map(|info| (info.phase, info))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_order_is_total() {
        for (i, phase) in Phase::ALL.iter().enumerate() {
            assert_eq!(phase.index(), i);
            assert_eq!(Phase::from_index(i), Some(*phase));
        }
        assert_eq!(Phase::from_index(9), None);
    }

    #[test]
    fn test_phase_next_clamps_at_deployment() {
        assert_eq!(Phase::Welcome.next(), Phase::Discovery);
        assert_eq!(Phase::Architecture.next(), Phase::Execution);
        assert_eq!(Phase::Qa.next(), Phase::Deployment);
        assert_eq!(Phase::Deployment.next(), Phase::Deployment);
    }

    #[test]
    fn test_phase_string_forms() {
        for phase in Phase::ALL {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{}\"", phase.as_str()));
            assert_eq!(phase.as_str().parse::<Phase>().unwrap(), phase);
        }
        assert!("MARKET_ANALYSIS".parse::<Phase>().is_err());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&PhaseStatus::AwaitingApproval).unwrap();
        assert_eq!(json, "\"awaiting_approval\"");
        assert_eq!(
            "in_progress".parse::<PhaseStatus>().unwrap(),
            PhaseStatus::InProgress
        );
    }

    #[test]
    fn test_status_rank_and_done() {
        assert!(PhaseStatus::Completed.is_done());
        assert!(PhaseStatus::Approved.is_done());
        assert!(!PhaseStatus::AwaitingApproval.is_done());
        assert!(PhaseStatus::Completed.is_regression_to(PhaseStatus::Pending));
        assert!(!PhaseStatus::Pending.is_regression_to(PhaseStatus::InProgress));
    }

    #[test]
    fn test_sub_phases_belong_to_their_phase() {
        for phase in Phase::ALL {
            for sub in phase.sub_phases() {
                assert_eq!(sub.phase(), phase);
            }
        }
        assert_eq!(Phase::Discovery.sub_phases().len(), 5);
        assert_eq!(Phase::MarketAnalysis.sub_phases().len(), 4);
        assert_eq!(Phase::Design.sub_phases().len(), 2);
        assert_eq!(Phase::Architecture.sub_phases().len(), 2);
        assert!(Phase::Specifications.sub_phases().is_empty());
    }

    #[test]
    fn test_phase_table_fills_missing_entries() {
        let json = r#"{"discovery":{"phase":"discovery","status":"completed","artifact":"DISCOVERY.xml"}}"#;
        let table: PhaseTable = serde_json::from_str(json).unwrap();
        assert_eq!(table[Phase::Discovery].status, PhaseStatus::Completed);
        assert_eq!(
            table[Phase::Discovery].artifact.as_deref(),
            Some("DISCOVERY.xml")
        );
        assert_eq!(table[Phase::Qa].status, PhaseStatus::Pending);
        assert_eq!(table.iter().count(), 9);
    }

    #[test]
    fn test_phase_table_latest_done() {
        let mut table = PhaseTable::new();
        assert_eq!(table.latest_done(), None);
        table[Phase::Discovery].status = PhaseStatus::Completed;
        table[Phase::Design].status = PhaseStatus::Approved;
        assert_eq!(table.latest_done(), Some(Phase::Design));
    }
}
