//! Heuristic strategies consulted when the primary format misses.
//!
//! Standard order: generic tag scan, discovery keywords, market JSON block,
//! loose data-tag scan, specifications mining.

mod discovery_keywords;
mod market_json;
mod specifications;
mod tag_scan;

pub use discovery_keywords::DiscoveryKeywords;
pub use market_json::MarketJsonBlock;
pub use specifications::SpecificationsMiner;
pub use tag_scan::{GenericTagScan, LooseDataScan};

use vibeflow_utils::context::ContextPatch;

use crate::{ExtractionInput, ExtractionLimits, ExtractionStrategy};

/// Ordered strategies; the first one producing an acceptable field wins.
pub struct FallbackChain {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl FallbackChain {
    #[must_use]
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// The default tier order.
    #[must_use]
    pub fn standard(limits: ExtractionLimits) -> Self {
        Self::new(vec![
            Box::new(GenericTagScan),
            Box::new(DiscoveryKeywords),
            Box::new(MarketJsonBlock),
            Box::new(LooseDataScan),
            Box::new(SpecificationsMiner::new(limits)),
        ])
    }

    /// Append a strategy at the lowest priority.
    pub fn push(&mut self, strategy: Box<dyn ExtractionStrategy>) {
        self.strategies.push(strategy);
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// First non-empty result, after dropping fields the context would refuse.
    #[must_use]
    pub fn run(&self, input: &ExtractionInput<'_>) -> Option<(&'static str, ContextPatch)> {
        for strategy in self.strategies.iter().filter(|s| s.applies_to(input.phase)) {
            let mut patch = strategy.extract(input);
            patch.retain(|field, value| input.context.accepts_fallback(field, value));
            if !patch.is_empty() {
                return Some((strategy.name(), patch));
            }
            tracing::trace!(strategy = strategy.name(), "Fallback strategy produced nothing");
        }
        None
    }
}

impl std::fmt::Debug for FallbackChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackChain")
            .field("strategies", &self.names())
            .finish()
    }
}
