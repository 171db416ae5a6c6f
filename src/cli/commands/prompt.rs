//! Prompt and extract commands
//!
//! `prompt` appends the format instructions for a step to the user's text;
//! `extract` folds the model's reply back into the context.

use anyhow::Result;
use serde_json::json;
use std::path::Path;

use super::common::{StoreSession, emit_json, file_or_stdin, text_or_stdin};

use crate::Config;
use crate::formats::build_prompt;
use crate::types::{Phase, SubPhase};

/// Print `text` with the current (or given) step's format suffix.
///
/// Without `--step`, an explicit `--phase` uses that phase's first step.
pub fn execute_prompt_command(
    text: Option<String>,
    phase: Option<&str>,
    step: Option<&str>,
    config: &Config,
) -> Result<()> {
    let text = text_or_stdin(text)?;
    let phase: Option<Phase> = phase.map(str::parse::<Phase>).transpose()?;
    let step: Option<SubPhase> = step.map(str::parse::<SubPhase>).transpose()?;

    let (phase, step) = match (phase, step) {
        (Some(phase), step) => (phase, step.or_else(|| phase.sub_phases().first().copied())),
        (None, Some(step)) => (step.phase(), Some(step)),
        (None, None) => {
            let session = StoreSession::open(config)?;
            let workflow = session.store.workflow();
            (workflow.current_phase, workflow.current_sub_phase)
        }
    };

    println!("{}", build_prompt(phase, step, text.trim_end()));
    Ok(())
}

pub fn execute_extract_command(
    response: Option<&Path>,
    last_user_input: &str,
    json: bool,
    config: &Config,
) -> Result<()> {
    let reply = file_or_stdin(response)?;
    let mut session = StoreSession::open(config)?;
    let update = session.store.parse_and_update_context(&reply, last_user_input);
    if !update.is_empty() || update.advanced_to.is_some() {
        session.save()?;
    }

    if json {
        let output = json!({
            "source": update.source,
            "fields": update.fields,
            "advancedTo": update.advanced_to,
        });
        println!("{}", emit_json(&output)?);
        return Ok(());
    }

    if update.is_empty() {
        println!("Nothing extracted ({})", update.source);
        return Ok(());
    }
    let names: Vec<&str> = update.fields.iter().map(|f| f.as_str()).collect();
    println!("✓ {} via {}", names.join(", "), update.source);
    if let Some(step) = update.advanced_to {
        println!("  Next step: {step}");
    }
    Ok(())
}
