//! Recovering structured context from free-form model responses
//!
//! Extraction runs in two stages:
//!
//! 1. **Primary**: the format registered for the current phase and sub-phase
//!    parses its tagged field. A hit is authoritative and advances the
//!    sub-phase.
//! 2. **Fallback**: an ordered [`FallbackChain`] of heuristic strategies.
//!    The first strategy that produces a field the context does not already
//!    hold wins. Fallback values never overwrite and never advance.
//!
//! Extraction is pure: it reads the current context and returns an
//! [`ExtractionOutcome`]; applying the outcome is the store's job.

use vibeflow_config::ExtractionSettings;
use vibeflow_formats::{get_next_sub_phase, get_phase_format, is_free_form};
use vibeflow_utils::context::{ContextPatch, ConversationContext};
use vibeflow_utils::types::{Phase, SubPhase};

pub mod fallback;

pub use fallback::{
    DiscoveryKeywords, FallbackChain, GenericTagScan, LooseDataScan, MarketJsonBlock,
    SpecificationsMiner,
};

/// Bounds applied by the heuristic strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionLimits {
    /// Maximum number of user stories mined from one response.
    pub max_user_stories: usize,
    /// Shortest accepted requirement line, in characters.
    pub requirement_min_len: usize,
    /// Longest accepted requirement line, in characters.
    pub requirement_max_len: usize,
    /// Length of a mined summary, in characters.
    pub summary_max_chars: usize,
    /// Responses shorter than this are never summarized.
    pub summary_min_response_len: usize,
}

impl Default for ExtractionLimits {
    fn default() -> Self {
        Self::from(&ExtractionSettings::default())
    }
}

impl From<&ExtractionSettings> for ExtractionLimits {
    fn from(settings: &ExtractionSettings) -> Self {
        Self {
            max_user_stories: settings.max_user_stories,
            requirement_min_len: settings.requirement_min_len,
            requirement_max_len: settings.requirement_max_len,
            summary_max_chars: settings.summary_max_chars,
            summary_min_response_len: settings.summary_min_response_len,
        }
    }
}

/// Everything a strategy may look at for one conversational turn.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionInput<'a> {
    pub phase: Phase,
    pub sub_phase: Option<SubPhase>,
    /// The model's reply.
    pub response: &'a str,
    /// The user's message that prompted the reply.
    pub last_user_input: &'a str,
    /// Context as it stands before this turn.
    pub context: &'a ConversationContext,
}

/// One heuristic in the fallback chain.
pub trait ExtractionStrategy: Send + Sync {
    /// Stable name used in logs and outcomes.
    fn name(&self) -> &'static str;

    /// Whether this strategy is consulted in `phase`.
    fn applies_to(&self, phase: Phase) -> bool;

    /// Candidate fields found in the input. May include fields the context
    /// already holds; the chain filters those out.
    fn extract(&self, input: &ExtractionInput<'_>) -> ContextPatch;
}

/// Result of running the extractor over one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// The phase is free-form; nothing was attempted.
    FreeForm,
    /// The registered format matched. Apply authoritatively.
    Primary {
        format_key: String,
        patch: ContextPatch,
        /// Sub-phase to move to, `None` when already on the last step.
        next_sub_phase: Option<SubPhase>,
    },
    /// A fallback strategy produced fields. Merge without overwriting.
    Fallback {
        strategy: &'static str,
        patch: ContextPatch,
    },
    /// Nothing recognizable in the response.
    Miss,
}

impl ExtractionOutcome {
    /// Fields carried by the outcome, if any.
    #[must_use]
    pub fn patch(&self) -> Option<&ContextPatch> {
        match self {
            Self::Primary { patch, .. } | Self::Fallback { patch, .. } => Some(patch),
            Self::FreeForm | Self::Miss => None,
        }
    }

    /// Name of whatever produced the outcome, for logging.
    #[must_use]
    pub fn source(&self) -> &str {
        match self {
            Self::FreeForm => "free-form",
            Self::Primary { format_key, .. } => format_key,
            Self::Fallback { strategy, .. } => strategy,
            Self::Miss => "none",
        }
    }

    #[must_use]
    pub fn is_primary(&self) -> bool {
        matches!(self, Self::Primary { .. })
    }
}

/// Primary format lookup followed by the fallback chain.
#[derive(Debug)]
pub struct ContextExtractor {
    chain: FallbackChain,
}

impl Default for ContextExtractor {
    fn default() -> Self {
        Self::new(ExtractionLimits::default())
    }
}

impl ContextExtractor {
    /// Extractor with the standard fallback chain.
    #[must_use]
    pub fn new(limits: ExtractionLimits) -> Self {
        Self {
            chain: FallbackChain::standard(limits),
        }
    }

    /// Extractor with a caller-supplied fallback chain.
    #[must_use]
    pub fn with_chain(chain: FallbackChain) -> Self {
        Self { chain }
    }

    #[must_use]
    pub fn chain(&self) -> &FallbackChain {
        &self.chain
    }

    /// Run primary extraction, then the fallback chain if the primary
    /// format is missing or matched nothing.
    #[must_use]
    pub fn extract(&self, input: &ExtractionInput<'_>) -> ExtractionOutcome {
        if is_free_form(input.phase) {
            return ExtractionOutcome::FreeForm;
        }

        if let Some(format) = get_phase_format(input.phase, input.sub_phase) {
            let patch = format.extract(input.response);
            if !patch.is_empty() {
                return ExtractionOutcome::Primary {
                    format_key: format.key(),
                    patch,
                    next_sub_phase: get_next_sub_phase(input.phase, input.sub_phase),
                };
            }
            tracing::debug!(format = %format.key(), "Primary format matched nothing");
        }

        match self.chain.run(input) {
            Some((strategy, patch)) => ExtractionOutcome::Fallback { strategy, patch },
            None => ExtractionOutcome::Miss,
        }
    }
}
