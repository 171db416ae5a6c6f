//! Translation between the shared document's phase names and [`Phase`].

use vibeflow_utils::types::Phase;

/// Phase name the external tool writes for a fresh project.
pub const INITIAL_PHASE: &str = "IDEATION";

/// Map a document phase name to a workflow phase.
///
/// `IDEATION` and `DISCOVERY` both mean discovery. `WELCOME` and anything
/// unrecognized mean welcome.
#[must_use]
pub fn workflow_phase(name: &str) -> Phase {
    match name {
        "IDEATION" | "DISCOVERY" => Phase::Discovery,
        "MARKET_ANALYSIS" => Phase::MarketAnalysis,
        "SPECIFICATIONS" => Phase::Specifications,
        "DESIGN" => Phase::Design,
        "ARCHITECTURE" => Phase::Architecture,
        "EXECUTION" => Phase::Execution,
        "QA" => Phase::Qa,
        "DEPLOYMENT" => Phase::Deployment,
        "WELCOME" => Phase::Welcome,
        other => {
            tracing::debug!(phase = other, "Unrecognized state document phase, using welcome");
            Phase::Welcome
        }
    }
}

/// Document phase name written for a workflow phase.
#[must_use]
pub const fn genius_phase(phase: Phase) -> &'static str {
    match phase {
        Phase::Welcome => "WELCOME",
        Phase::Discovery => "DISCOVERY",
        Phase::MarketAnalysis => "MARKET_ANALYSIS",
        Phase::Specifications => "SPECIFICATIONS",
        Phase::Design => "DESIGN",
        Phase::Architecture => "ARCHITECTURE",
        Phase::Execution => "EXECUTION",
        Phase::Qa => "QA",
        Phase::Deployment => "DEPLOYMENT",
    }
}
