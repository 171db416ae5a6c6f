//! Conversation context accumulated across a project's phases
//!
//! The context is an open bag of optional facts. Every fact is addressed by
//! a closed [`ContextField`] key and carries a value of the field's declared
//! [`FieldKind`]. Values arrive as [`ContextPatch`]es and are merged either
//! authoritatively ([`ConversationContext::apply`]) or without overwriting
//! anything already known ([`ConversationContext::merge_fallback`]).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Shape of the value stored under a [`ContextField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    List,
    Stories,
    Map,
}

/// Key of a conversation context fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContextField {
    ProjectIdea,
    TargetUsers,
    MainFeatures,
    Competitors,
    Differentiator,
    DiscoveryAnswers,
    MarketSize,
    TargetSegments,
    CompetitiveLandscape,
    MarketOpportunity,
    FullMarketAnalysis,
    UserStories,
    FunctionalRequirements,
    NonFunctionalRequirements,
    SpecificationsSummary,
    DesignOptions,
    DesignChoice,
    ColorPalette,
    Typography,
    TechStack,
    ProjectStructure,
    ArchitectureDecisions,
}

impl ContextField {
    pub const ALL: [ContextField; 22] = [
        ContextField::ProjectIdea,
        ContextField::TargetUsers,
        ContextField::MainFeatures,
        ContextField::Competitors,
        ContextField::Differentiator,
        ContextField::DiscoveryAnswers,
        ContextField::MarketSize,
        ContextField::TargetSegments,
        ContextField::CompetitiveLandscape,
        ContextField::MarketOpportunity,
        ContextField::FullMarketAnalysis,
        ContextField::UserStories,
        ContextField::FunctionalRequirements,
        ContextField::NonFunctionalRequirements,
        ContextField::SpecificationsSummary,
        ContextField::DesignOptions,
        ContextField::DesignChoice,
        ContextField::ColorPalette,
        ContextField::Typography,
        ContextField::TechStack,
        ContextField::ProjectStructure,
        ContextField::ArchitectureDecisions,
    ];

    /// Wire name, as used in tag attributes and serialized context.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectIdea => "projectIdea",
            Self::TargetUsers => "targetUsers",
            Self::MainFeatures => "mainFeatures",
            Self::Competitors => "competitors",
            Self::Differentiator => "differentiator",
            Self::DiscoveryAnswers => "discoveryAnswers",
            Self::MarketSize => "marketSize",
            Self::TargetSegments => "targetSegments",
            Self::CompetitiveLandscape => "competitiveLandscape",
            Self::MarketOpportunity => "marketOpportunity",
            Self::FullMarketAnalysis => "fullMarketAnalysis",
            Self::UserStories => "userStories",
            Self::FunctionalRequirements => "functionalRequirements",
            Self::NonFunctionalRequirements => "nonFunctionalRequirements",
            Self::SpecificationsSummary => "specificationsSummary",
            Self::DesignOptions => "designOptions",
            Self::DesignChoice => "designChoice",
            Self::ColorPalette => "colorPalette",
            Self::Typography => "typography",
            Self::TechStack => "techStack",
            Self::ProjectStructure => "projectStructure",
            Self::ArchitectureDecisions => "architectureDecisions",
        }
    }

    /// Look up a field by its wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.as_str() == name)
    }

    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::DiscoveryAnswers => FieldKind::Map,
            Self::UserStories => FieldKind::Stories,
            Self::FunctionalRequirements
            | Self::NonFunctionalRequirements
            | Self::ArchitectureDecisions => FieldKind::List,
            _ => FieldKind::Text,
        }
    }

    /// Fallback extraction may replace this field with a strictly longer value.
    #[must_use]
    pub const fn fallback_may_extend(&self) -> bool {
        matches!(self, Self::SpecificationsSummary)
    }
}

impl fmt::Display for ContextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user story record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStory {
    /// Story identifier, e.g. `US-001`.
    pub id: String,
    pub description: String,
}

impl UserStory {
    /// Build a story with a synthetic `US-NNN` id (1-based `ordinal`).
    #[must_use]
    pub fn numbered(ordinal: usize, description: impl Into<String>) -> Self {
        Self {
            id: format!("US-{ordinal:03}"),
            description: description.into(),
        }
    }
}

/// Value of a context fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    Text(String),
    List(Vec<String>),
    Stories(Vec<UserStory>),
    Map(BTreeMap<String, String>),
}

impl ContextValue {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Stories(stories) => stories.is_empty(),
            Self::Map(map) => map.is_empty(),
        }
    }

    /// Length used when comparing competing values (characters for text,
    /// element count otherwise).
    #[must_use]
    pub fn measure(&self) -> usize {
        match self {
            Self::Text(s) => s.chars().count(),
            Self::List(items) => items.len(),
            Self::Stories(stories) => stories.len(),
            Self::Map(map) => map.len(),
        }
    }

    /// Convert to the requested kind.
    ///
    /// Text splits into list items on `|` or newlines; lists join with ` | `.
    #[must_use]
    pub fn coerce(self, kind: FieldKind) -> Self {
        match (self, kind) {
            (v @ Self::Text(_), FieldKind::Text)
            | (v @ Self::List(_), FieldKind::List)
            | (v @ Self::Stories(_), FieldKind::Stories)
            | (v @ Self::Map(_), FieldKind::Map) => v,
            (Self::Text(s), FieldKind::List) => Self::List(split_items(&s)),
            (Self::Text(s), FieldKind::Stories) => Self::Stories(
                split_items(&s)
                    .into_iter()
                    .enumerate()
                    .map(|(i, line)| UserStory::numbered(i + 1, line))
                    .collect(),
            ),
            (Self::Text(s), FieldKind::Map) => Self::Map(split_pairs(&s)),
            (Self::List(items), FieldKind::Text) => Self::Text(items.join(" | ")),
            (Self::Stories(stories), FieldKind::Text) => Self::Text(
                stories
                    .iter()
                    .map(|s| format!("{}: {}", s.id, s.description))
                    .collect::<Vec<_>>()
                    .join(" | "),
            ),
            (Self::Map(map), FieldKind::Text) => Self::Text(
                map.iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .collect::<Vec<_>>()
                    .join(" | "),
            ),
            (other, kind) => other.coerce(FieldKind::Text).coerce(kind),
        }
    }
}

fn split_items(s: &str) -> Vec<String> {
    s.split(['|', '\n'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn split_pairs(s: &str) -> BTreeMap<String, String> {
    split_items(s)
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item.split_once(':') {
            Some((k, v)) => (k.trim().to_string(), v.trim().to_string()),
            None => (format!("answer{}", i + 1), item),
        })
        .collect()
}

/// A set of field updates, applied in one merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextPatch {
    entries: BTreeMap<ContextField, ContextValue>,
}

impl ContextPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a text value.
    #[must_use]
    pub fn with_text(mut self, field: ContextField, value: impl Into<String>) -> Self {
        self.insert(field, ContextValue::Text(value.into()));
        self
    }

    /// Builder-style insert of any value.
    #[must_use]
    pub fn with(mut self, field: ContextField, value: ContextValue) -> Self {
        self.insert(field, value);
        self
    }

    /// Insert a value, coerced to the field's kind. Empty values are ignored.
    pub fn insert(&mut self, field: ContextField, value: ContextValue) {
        let value = value.coerce(field.kind());
        if !value.is_empty() {
            self.entries.insert(field, value);
        }
    }

    #[must_use]
    pub fn get(&self, field: ContextField) -> Option<&ContextValue> {
        self.entries.get(&field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = ContextField> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ContextField, &ContextValue)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    /// Keep only entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(ContextField, &ContextValue) -> bool) {
        self.entries.retain(|k, v| keep(*k, v));
    }

    /// Wire names of the patched fields, for logging.
    #[must_use]
    pub fn field_names(&self) -> Vec<&'static str> {
        self.entries.keys().map(ContextField::as_str).collect()
    }
}

impl FromIterator<(ContextField, ContextValue)> for ContextPatch {
    fn from_iter<I: IntoIterator<Item = (ContextField, ContextValue)>>(iter: I) -> Self {
        let mut patch = Self::new();
        for (field, value) in iter {
            patch.insert(field, value);
        }
        patch
    }
}

impl IntoIterator for ContextPatch {
    type Item = (ContextField, ContextValue);
    type IntoIter = std::collections::btree_map::IntoIter<ContextField, ContextValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Facts discovered about a project during the conversation.
///
/// All fields are optional and filled incrementally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_idea: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_users: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_features: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub differentiator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery_answers: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_segments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitive_landscape: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_opportunity: Option<String>,
    /// Free-text market analysis kept when the phase finishes in conversation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_market_analysis: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_stories: Option<Vec<UserStory>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functional_requirements: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_functional_requirements: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specifications_summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_options: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_choice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_palette: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typography: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_stack: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_structure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture_decisions: Option<Vec<String>>,
}

impl ConversationContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn text_slot(&mut self, field: ContextField) -> Option<&mut Option<String>> {
        Some(match field {
            ContextField::ProjectIdea => &mut self.project_idea,
            ContextField::TargetUsers => &mut self.target_users,
            ContextField::MainFeatures => &mut self.main_features,
            ContextField::Competitors => &mut self.competitors,
            ContextField::Differentiator => &mut self.differentiator,
            ContextField::MarketSize => &mut self.market_size,
            ContextField::TargetSegments => &mut self.target_segments,
            ContextField::CompetitiveLandscape => &mut self.competitive_landscape,
            ContextField::MarketOpportunity => &mut self.market_opportunity,
            ContextField::FullMarketAnalysis => &mut self.full_market_analysis,
            ContextField::SpecificationsSummary => &mut self.specifications_summary,
            ContextField::DesignOptions => &mut self.design_options,
            ContextField::DesignChoice => &mut self.design_choice,
            ContextField::ColorPalette => &mut self.color_palette,
            ContextField::Typography => &mut self.typography,
            ContextField::TechStack => &mut self.tech_stack,
            ContextField::ProjectStructure => &mut self.project_structure,
            _ => return None,
        })
    }

    fn list_slot(&mut self, field: ContextField) -> Option<&mut Option<Vec<String>>> {
        Some(match field {
            ContextField::FunctionalRequirements => &mut self.functional_requirements,
            ContextField::NonFunctionalRequirements => &mut self.non_functional_requirements,
            ContextField::ArchitectureDecisions => &mut self.architecture_decisions,
            _ => return None,
        })
    }

    /// Current value of a field, if present.
    #[must_use]
    pub fn get(&self, field: ContextField) -> Option<ContextValue> {
        let text = |v: &Option<String>| v.clone().map(ContextValue::Text);
        let list = |v: &Option<Vec<String>>| v.clone().map(ContextValue::List);
        match field {
            ContextField::ProjectIdea => text(&self.project_idea),
            ContextField::TargetUsers => text(&self.target_users),
            ContextField::MainFeatures => text(&self.main_features),
            ContextField::Competitors => text(&self.competitors),
            ContextField::Differentiator => text(&self.differentiator),
            ContextField::DiscoveryAnswers => {
                self.discovery_answers.clone().map(ContextValue::Map)
            }
            ContextField::MarketSize => text(&self.market_size),
            ContextField::TargetSegments => text(&self.target_segments),
            ContextField::CompetitiveLandscape => text(&self.competitive_landscape),
            ContextField::MarketOpportunity => text(&self.market_opportunity),
            ContextField::FullMarketAnalysis => text(&self.full_market_analysis),
            ContextField::UserStories => self.user_stories.clone().map(ContextValue::Stories),
            ContextField::FunctionalRequirements => list(&self.functional_requirements),
            ContextField::NonFunctionalRequirements => list(&self.non_functional_requirements),
            ContextField::SpecificationsSummary => text(&self.specifications_summary),
            ContextField::DesignOptions => text(&self.design_options),
            ContextField::DesignChoice => text(&self.design_choice),
            ContextField::ColorPalette => text(&self.color_palette),
            ContextField::Typography => text(&self.typography),
            ContextField::TechStack => text(&self.tech_stack),
            ContextField::ProjectStructure => text(&self.project_structure),
            ContextField::ArchitectureDecisions => list(&self.architecture_decisions),
        }
    }

    /// True when the field holds a non-empty value.
    #[must_use]
    pub fn is_set(&self, field: ContextField) -> bool {
        self.get(field).is_some_and(|v| !v.is_empty())
    }

    /// Store a value, coerced to the field's kind.
    pub fn set(&mut self, field: ContextField, value: ContextValue) {
        match value.coerce(field.kind()) {
            ContextValue::Text(s) => {
                if let Some(slot) = self.text_slot(field) {
                    *slot = Some(s);
                }
            }
            ContextValue::List(items) => {
                if let Some(slot) = self.list_slot(field) {
                    *slot = Some(items);
                }
            }
            ContextValue::Stories(stories) => self.user_stories = Some(stories),
            ContextValue::Map(map) => self.discovery_answers = Some(map),
        }
    }

    /// Authoritative shallow merge: every patched field is overwritten.
    pub fn apply(&mut self, patch: &ContextPatch) {
        for (field, value) in patch.iter() {
            self.set(field, value.clone());
        }
    }

    /// Whether a fallback value may be written to `field`.
    ///
    /// Unset fields always accept. Set fields refuse, except those that
    /// [`ContextField::fallback_may_extend`], which accept a strictly longer
    /// value.
    #[must_use]
    pub fn accepts_fallback(&self, field: ContextField, value: &ContextValue) -> bool {
        match self.get(field) {
            None => true,
            Some(current) if current.is_empty() => true,
            Some(current) => field.fallback_may_extend() && value.measure() > current.measure(),
        }
    }

    /// Non-overwriting merge used by heuristic extraction.
    ///
    /// Returns the fields that were actually written.
    pub fn merge_fallback(&mut self, patch: &ContextPatch) -> Vec<ContextField> {
        let mut written = Vec::new();
        for (field, value) in patch.iter() {
            if self.accepts_fallback(field, value) {
                self.set(field, value.clone());
                written.push(field);
            }
        }
        written
    }

    /// Fields currently holding a non-empty value.
    #[must_use]
    pub fn set_fields(&self) -> Vec<ContextField> {
        ContextField::ALL
            .iter()
            .copied()
            .filter(|f| self.is_set(*f))
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set_fields().is_empty()
    }
}
