//! Phase format registry
//!
//! For each conversational step (`phase:sub-phase`) the registry knows which
//! structured fields the model must append to its reply. One schema per
//! field ([`FieldSpec`]) drives both the instructions appended to the prompt
//! and the parser that reads the fields back.
//!
//! `execution`, `qa` and `deployment` are free-form: no format, no parsing.

pub mod tags;

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

use vibeflow_utils::context::{ContextField, ContextPatch, ContextValue};
use vibeflow_utils::types::{Phase, SubPhase};

pub use tags::{TagKind, TaggedValue, scan_tags};

/// Phases without structured output.
pub const FREE_FORM_PHASES: [Phase; 3] = [Phase::Execution, Phase::Qa, Phase::Deployment];

/// Schema of one structured field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub field: ContextField,
    pub tag: TagKind,
    /// Restricts the captured value (e.g. `[ABC]`); `None` accepts any text.
    pub value_pattern: Option<&'static str>,
    /// Placeholder shown inside the tag in the format instructions.
    pub placeholder: &'static str,
    /// Worked example value, if the format shows one.
    pub example: Option<&'static str>,
}

impl FieldSpec {
    const fn new(field: ContextField, tag: TagKind, placeholder: &'static str) -> Self {
        Self {
            field,
            tag,
            value_pattern: None,
            placeholder,
            example: None,
        }
    }

    const fn example(mut self, example: &'static str) -> Self {
        self.example = Some(example);
        self
    }

    const fn pattern(mut self, pattern: &'static str) -> Self {
        self.value_pattern = Some(pattern);
        self
    }

    fn render(&self, value: &str) -> String {
        if value.contains('\n') {
            self.tag.render(self.field.as_str(), &format!("\n{value}\n"))
        } else {
            self.tag.render(self.field.as_str(), value)
        }
    }
}

/// Static description of a format before its regexes are compiled.
struct FormatDef {
    phase: Phase,
    sub_phase: Option<SubPhase>,
    lead: &'static str,
    notes: Option<&'static str>,
    fields: &'static [FieldSpec],
}

/// Format descriptor for one conversational step.
#[derive(Debug)]
pub struct PhaseFormat {
    phase: Phase,
    sub_phase: Option<SubPhase>,
    prompt_suffix: String,
    fields: Vec<(FieldSpec, Regex)>,
}

impl PhaseFormat {
    fn compile(def: &FormatDef) -> Self {
        let mut suffix = format!("\nIMPORTANT: {}\n", def.lead);
        suffix.push_str(
            &def.fields
                .iter()
                .map(|f| f.render(f.placeholder))
                .collect::<Vec<_>>()
                .join("\n"),
        );
        if let Some(notes) = def.notes {
            suffix.push_str("\n\n");
            suffix.push_str(notes);
        }
        let examples: Vec<String> = def
            .fields
            .iter()
            .filter_map(|f| f.example.map(|e| f.render(e)))
            .collect();
        if !examples.is_empty() {
            suffix.push_str("\n\nExample:\n");
            suffix.push_str(&examples.join("\n"));
        }

        Self {
            phase: def.phase,
            sub_phase: def.sub_phase,
            prompt_suffix: suffix,
            fields: def
                .fields
                .iter()
                .map(|f| (*f, f.tag.field_regex(f.field.as_str(), f.value_pattern)))
                .collect(),
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn sub_phase(&self) -> Option<SubPhase> {
        self.sub_phase
    }

    /// Registry key: `phase:sub-phase`, or `phase` alone.
    #[must_use]
    pub fn key(&self) -> String {
        match self.sub_phase {
            Some(sub) => format!("{}:{}", self.phase, sub),
            None => self.phase.to_string(),
        }
    }

    /// Instructions appended to the user's prompt.
    #[must_use]
    pub fn prompt_suffix(&self) -> &str {
        &self.prompt_suffix
    }

    /// The context field this step is about (its first field).
    #[must_use]
    pub fn target_field(&self) -> ContextField {
        self.fields[0].0.field
    }

    pub fn field_specs(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().map(|(spec, _)| spec)
    }

    /// Pull this format's fields out of a model reply.
    ///
    /// Each field matches at most once (first occurrence). Missing or empty
    /// tags are simply absent from the patch.
    #[must_use]
    pub fn extract(&self, response: &str) -> ContextPatch {
        let mut patch = ContextPatch::new();
        for (spec, regex) in &self.fields {
            if let Some(value) = regex
                .captures(response)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim())
                .filter(|v| !v.is_empty())
            {
                patch.insert(spec.field, ContextValue::text(value));
            }
        }
        patch
    }
}

impl fmt::Display for PhaseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

use ContextField as F;
use TagKind::{Answer, Data};

static DEFINITIONS: &[FormatDef] = &[
    // discovery
    FormatDef {
        phase: Phase::Discovery,
        sub_phase: Some(SubPhase::ProjectIdea),
        lead: "After your conversational response, you MUST include the extracted project idea in this exact format:",
        notes: None,
        fields: &[FieldSpec::new(
            F::ProjectIdea,
            Answer,
            "A single sentence describing what the project does and the problem it solves",
        )
        .example("A mobile app that helps freelancers track their time and invoice clients automatically")],
    },
    FormatDef {
        phase: Phase::Discovery,
        sub_phase: Some(SubPhase::TargetUsers),
        lead: "After your conversational response, you MUST include the target users in this exact format:",
        notes: None,
        fields: &[FieldSpec::new(
            F::TargetUsers,
            Answer,
            "Description of the primary target users/personas",
        )
        .example("Freelance developers and designers who work with multiple clients and need to track billable hours")],
    },
    FormatDef {
        phase: Phase::Discovery,
        sub_phase: Some(SubPhase::MainFeatures),
        lead: "After your conversational response, you MUST include the main features in this exact format:",
        notes: Some("Use pipe (|) to separate features. Include 3-5 core MVP features."),
        fields: &[FieldSpec::new(
            F::MainFeatures,
            Answer,
            "Feature 1 | Feature 2 | Feature 3 | Feature 4 | Feature 5",
        )
        .example("Time tracking with one-click timer | Automatic invoice generation | Client management | Project categorization | Weekly reports")],
    },
    FormatDef {
        phase: Phase::Discovery,
        sub_phase: Some(SubPhase::Competitors),
        lead: "After your conversational response, you MUST include the competitors in this exact format:",
        notes: Some("Use pipe (|) to separate competitors. Include 2-4 existing alternatives."),
        fields: &[FieldSpec::new(
            F::Competitors,
            Answer,
            "Competitor 1 | Competitor 2 | Competitor 3",
        )
        .example("Toggl - popular but expensive | Harvest - feature-rich but complex | Clockify - free but limited invoicing")],
    },
    FormatDef {
        phase: Phase::Discovery,
        sub_phase: Some(SubPhase::Differentiator),
        lead: "After your conversational response, you MUST include the differentiator in this exact format:",
        notes: None,
        fields: &[FieldSpec::new(
            F::Differentiator,
            Answer,
            "What makes this solution unique and better than alternatives",
        )
        .example("AI-powered automatic categorization of work sessions and smart invoice suggestions based on project patterns")],
    },
    // market-analysis
    FormatDef {
        phase: Phase::MarketAnalysis,
        sub_phase: Some(SubPhase::MarketSize),
        lead: "After your analysis, you MUST include the market size data in this exact format:",
        notes: Some("Include Total Addressable Market (TAM), Serviceable Addressable Market (SAM), and Serviceable Obtainable Market (SOM)."),
        fields: &[FieldSpec::new(
            F::MarketSize,
            Data,
            "TAM: $X billion | SAM: $Y billion | SOM: $Z million",
        )
        .example("TAM: $15 billion (global time tracking software) | SAM: $3.2 billion (freelancer market segment) | SOM: $50 million (first 3 years, targeting tech freelancers)")],
    },
    FormatDef {
        phase: Phase::MarketAnalysis,
        sub_phase: Some(SubPhase::Segments),
        lead: "After your analysis, you MUST include the target segments in this exact format:",
        notes: Some("Use pipe (|) to separate segments. Include 2-4 key market segments."),
        fields: &[FieldSpec::new(
            F::TargetSegments,
            Data,
            "Segment 1: description | Segment 2: description | Segment 3: description",
        )
        .example("Solo freelancers: Individual contractors needing simple tracking | Small agencies: Teams of 2-10 needing collaboration | Consultants: Professionals billing by project milestones")],
    },
    FormatDef {
        phase: Phase::MarketAnalysis,
        sub_phase: Some(SubPhase::Competitive),
        lead: "After your analysis, you MUST include the competitive landscape in this exact format:",
        notes: Some("Use pipe (|) to separate competitors. Include key strengths and weaknesses for each."),
        fields: &[FieldSpec::new(
            F::CompetitiveLandscape,
            Data,
            "Competitor 1: strengths/weaknesses | Competitor 2: strengths/weaknesses",
        )
        .example("Toggl: Strong brand, good UX / Expensive, no invoicing | Harvest: Full-featured / Steep learning curve, dated UI | FreshBooks: Invoicing focus / Weak time tracking")],
    },
    FormatDef {
        phase: Phase::MarketAnalysis,
        sub_phase: Some(SubPhase::Opportunity),
        lead: "After your analysis, you MUST include the market opportunity summary in this exact format:",
        notes: None,
        fields: &[FieldSpec::new(
            F::MarketOpportunity,
            Data,
            "Summary of the market opportunity and why now is the right time",
        )
        .example("Growing gig economy (40% increase in freelancers since 2020) creates demand for simple, integrated time-to-invoice solutions. Existing tools are either too complex or lack invoicing. AI capabilities now enable smart automation that wasn't possible before.")],
    },
    // design
    FormatDef {
        phase: Phase::Design,
        sub_phase: Some(SubPhase::DesignOptions),
        lead: "Present 3 distinct design options (A, B, C) with clear structure.\nAfter presenting the options, include this format:",
        notes: Some("Each option should include: color palette (with hex codes), typography choices, and overall mood/feeling."),
        fields: &[FieldSpec::new(
            F::DesignOptions,
            Data,
            "Option A: [Name] - [Brief description of aesthetic/mood]\nOption B: [Name] - [Brief description of aesthetic/mood]\nOption C: [Name] - [Brief description of aesthetic/mood]",
        )],
    },
    FormatDef {
        phase: Phase::Design,
        sub_phase: Some(SubPhase::DesignChoice),
        lead: "After confirming the design choice, include this format:",
        notes: None,
        fields: &[
            FieldSpec::new(F::DesignChoice, Data, "A|B|C")
                .pattern("[ABC]")
                .example("B"),
            FieldSpec::new(
                F::ColorPalette,
                Data,
                "Primary: #hex | Secondary: #hex | Background: #hex | Text: #hex | Accent: #hex",
            )
            .example("Primary: #f97316 | Secondary: #ec4899 | Background: #050508 | Text: #ffffff | Accent: #22c55e"),
            FieldSpec::new(
                F::Typography,
                Data,
                "Headings: FontName | Body: FontName | Code: FontName",
            )
            .example("Headings: Space Grotesk | Body: Inter | Code: JetBrains Mono"),
        ],
    },
    // architecture
    FormatDef {
        phase: Phase::Architecture,
        sub_phase: Some(SubPhase::TechStack),
        lead: "After recommending the tech stack, include this format:",
        notes: None,
        fields: &[FieldSpec::new(
            F::TechStack,
            Data,
            "Frontend: tech | Backend: tech | Database: tech | Hosting: tech",
        )
        .example("Frontend: Next.js 14 + TypeScript | Backend: tRPC + Prisma | Database: PostgreSQL | Hosting: Vercel + Supabase")],
    },
    FormatDef {
        phase: Phase::Architecture,
        sub_phase: Some(SubPhase::Structure),
        lead: "After describing the project structure, include this format:",
        notes: None,
        fields: &[FieldSpec::new(
            F::ProjectStructure,
            Data,
            "Brief description of folder organization and key directories",
        )
        .example("Monorepo with apps/web (Next.js), packages/ui (shared components), packages/db (Prisma schema). Feature-based organization within web app.")],
    },
];

static REGISTRY: Lazy<BTreeMap<(Phase, Option<SubPhase>), PhaseFormat>> = Lazy::new(|| {
    DEFINITIONS
        .iter()
        .map(|def| ((def.phase, def.sub_phase), PhaseFormat::compile(def)))
        .collect()
});

/// Every registered format, in phase then sub-phase order.
pub fn all_formats() -> impl Iterator<Item = &'static PhaseFormat> {
    REGISTRY.values()
}

#[must_use]
pub fn is_free_form(phase: Phase) -> bool {
    FREE_FORM_PHASES.contains(&phase)
}

/// Format for a phase/sub-phase combination.
///
/// Looks up `phase:sub-phase` first, then `phase` alone. Free-form phases
/// never have a format.
#[must_use]
pub fn get_phase_format(phase: Phase, sub_phase: Option<SubPhase>) -> Option<&'static PhaseFormat> {
    if is_free_form(phase) {
        return None;
    }
    sub_phase
        .and_then(|sub| REGISTRY.get(&(phase, Some(sub))))
        .or_else(|| REGISTRY.get(&(phase, None)))
}

/// Step after `current` in `phase`'s sequence.
///
/// Design and architecture are two-step sequences like the others
/// (`design-options` then `design-choice`, `tech-stack` then `structure`),
/// so their first step advances too. `None` past the last step, when
/// `current` is not in the sequence, or for phases without one.
#[must_use]
pub fn get_next_sub_phase(phase: Phase, current: Option<SubPhase>) -> Option<SubPhase> {
    let steps = phase.sub_phases();
    let index = steps.iter().position(|s| Some(*s) == current)?;
    steps.get(index + 1).copied()
}

/// Entry step of `phase`, or `None` when the phase has no sequence.
#[must_use]
pub fn get_first_sub_phase(phase: Phase) -> Option<SubPhase> {
    phase.sub_phases().first().copied()
}

/// Whether `sub_phase` is the terminal step of `phase`.
///
/// Only `design-choice` and `structure` are terminal in the two-step design
/// and architecture sequences. Phases without a sequence always report
/// `true`.
#[must_use]
pub fn is_last_sub_phase(phase: Phase, sub_phase: Option<SubPhase>) -> bool {
    match phase.sub_phases().last() {
        Some(last) => sub_phase == Some(*last),
        None => true,
    }
}

/// Append the format instructions for the step to a user prompt.
///
/// Returns the prompt unchanged when the step has no format.
#[must_use]
pub fn build_prompt(phase: Phase, sub_phase: Option<SubPhase>, prompt: &str) -> String {
    match get_phase_format(phase, sub_phase) {
        Some(format) => format!("{prompt}\n{}", format.prompt_suffix()),
        None => prompt.to_string(),
    }
}
