//! Free-text mining of specification replies
//!
//! Recognizes three things without any tags:
//! - user story lines (`US-001: ...`, `User Story 2: ...`, `As a ...`)
//! - bullet or numbered requirement lines, split into functional and
//!   non-functional by the heading they sit under (or by keywords when there
//!   is no heading)
//! - a truncated summary of long replies that are about specifications

use once_cell::sync::Lazy;
use regex::Regex;

use vibeflow_utils::context::{ContextField, ContextPatch, ContextValue, UserStory};
use vibeflow_utils::types::Phase;

use crate::{ExtractionInput, ExtractionLimits, ExtractionStrategy};

static STORY_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:[-*]\s+)?(?:\*\*)?(?:(US-\d+)|User\s+Story\s+(\d+))?(?:\*\*)?\s*[:.\-]?\s*(?:\*\*)?(.*?)\s*$",
    )
    .unwrap()
});

static AS_A: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^as\s+an?\s").unwrap());

static LIST_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:[-*\u{2022}]|\d+[.)])\s+(.+?)\s*$").unwrap());

static HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:#{1,6}\s+(.+?)|\*\*(.+?)\*\*:?|([A-Z][A-Za-z \-]+):)\s*$").unwrap()
});

const NON_FUNCTIONAL_KEYWORDS: &[&str] = &[
    "performance",
    "secur",
    "encrypt",
    "scalab",
    "availability",
    "uptime",
    "reliab",
    "latency",
    "response time",
    "must load",
    "accessib",
    "complian",
];

const RELEVANCE_KEYWORDS: &[&str] = &[
    "specification",
    "requirement",
    "user stor",
    "acceptance criteria",
    "feature",
];

/// Which requirement list a bullet belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    /// No heading seen yet: classify each line by keywords.
    Unlabeled,
    Functional,
    NonFunctional,
    /// A heading unrelated to requirements: bullets are ignored.
    Other,
}

impl Section {
    fn from_heading(heading: &str) -> Self {
        let lower = heading.to_lowercase();
        if lower.contains("non-functional")
            || lower.contains("non functional")
            || lower.contains("nfr")
            || lower.contains("quality attribute")
        {
            Self::NonFunctional
        } else if lower.contains("functional")
            || lower.contains("requirement")
            || lower.contains("feature")
        {
            Self::Functional
        } else {
            Self::Other
        }
    }
}

fn is_non_functional(line: &str) -> bool {
    let lower = line.to_lowercase();
    NON_FUNCTIONAL_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Parse a user story line into `(explicit id, description)`.
fn parse_story(line: &str) -> Option<(Option<String>, String)> {
    let caps = STORY_LINE.captures(line)?;
    let description = caps.get(3).map_or("", |m| m.as_str()).trim_matches('*').trim();
    if description.is_empty() {
        return None;
    }
    if let Some(id) = caps.get(1) {
        return Some((Some(id.as_str().to_uppercase()), description.to_string()));
    }
    if caps.get(2).is_some() || AS_A.is_match(description) {
        return Some((None, description.to_string()));
    }
    None
}

/// User stories, functional and non-functional requirements, and a summary.
#[derive(Debug, Clone, Copy)]
pub struct SpecificationsMiner {
    limits: ExtractionLimits,
}

impl SpecificationsMiner {
    #[must_use]
    pub fn new(limits: ExtractionLimits) -> Self {
        Self { limits }
    }

    fn stories(&self, response: &str) -> Vec<UserStory> {
        let mut stories = Vec::new();
        for line in response.lines() {
            if stories.len() >= self.limits.max_user_stories {
                break;
            }
            let Some((id, description)) = parse_story(line) else {
                continue;
            };
            let ordinal = stories.len() + 1;
            stories.push(match id {
                Some(id) => UserStory { id, description },
                None => UserStory::numbered(ordinal, description),
            });
        }
        stories
    }

    fn requirements(&self, response: &str) -> (Vec<String>, Vec<String>) {
        let mut functional = Vec::new();
        let mut non_functional = Vec::new();
        let mut section = Section::Unlabeled;

        for line in response.lines() {
            if let Some(item) = LIST_ITEM.captures(line).and_then(|c| c.get(1)) {
                let item = item.as_str();
                if parse_story(item).is_some() {
                    continue;
                }
                let len = item.chars().count();
                if len < self.limits.requirement_min_len || len > self.limits.requirement_max_len {
                    continue;
                }
                let target = match section {
                    Section::Functional => &mut functional,
                    Section::NonFunctional => &mut non_functional,
                    Section::Unlabeled if is_non_functional(item) => &mut non_functional,
                    Section::Unlabeled => &mut functional,
                    Section::Other => continue,
                };
                target.push(item.to_string());
            } else if let Some(caps) = HEADING.captures(line) {
                let heading = (1..=3)
                    .find_map(|i| caps.get(i))
                    .map_or("", |m| m.as_str());
                section = Section::from_heading(heading);
            }
        }
        (functional, non_functional)
    }

    fn summary(&self, response: &str) -> Option<String> {
        let trimmed = response.trim();
        if trimmed.chars().count() < self.limits.summary_min_response_len {
            return None;
        }
        let lower = trimmed.to_lowercase();
        if !RELEVANCE_KEYWORDS.iter().any(|k| lower.contains(k)) {
            return None;
        }
        let summary: String = trimmed.chars().take(self.limits.summary_max_chars).collect();
        Some(summary.trim_end().to_string())
    }
}

impl ExtractionStrategy for SpecificationsMiner {
    fn name(&self) -> &'static str {
        "specifications"
    }

    fn applies_to(&self, phase: Phase) -> bool {
        phase == Phase::Specifications
    }

    fn extract(&self, input: &ExtractionInput<'_>) -> ContextPatch {
        let mut patch = ContextPatch::new();

        let stories = self.stories(input.response);
        if !stories.is_empty() {
            patch.insert(ContextField::UserStories, ContextValue::Stories(stories));
        }

        let (functional, non_functional) = self.requirements(input.response);
        if !functional.is_empty() {
            patch.insert(
                ContextField::FunctionalRequirements,
                ContextValue::List(functional),
            );
        }
        if !non_functional.is_empty() {
            patch.insert(
                ContextField::NonFunctionalRequirements,
                ContextValue::List(non_functional),
            );
        }

        if let Some(summary) = self.summary(input.response) {
            patch.insert(ContextField::SpecificationsSummary, ContextValue::Text(summary));
        }
        patch
    }
}
