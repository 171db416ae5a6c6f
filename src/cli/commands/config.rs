//! Config command implementation

use anyhow::Result;
use serde_json::json;

use super::common::emit_json;

use crate::Config;

/// Show each effective setting with its source.
pub fn execute_config_command(json: bool, config: &Config) -> Result<()> {
    let effective = config.effective_config();

    if json {
        let settings: serde_json::Map<String, serde_json::Value> = effective
            .into_iter()
            .map(|(key, (value, source))| (key, json!({ "value": value, "source": source })))
            .collect();
        println!("{}", emit_json(&serde_json::Value::Object(settings))?);
        return Ok(());
    }

    println!("Effective configuration:");
    for (key, (value, source)) in effective {
        println!("  {key:<26} {value:<40} ({source})");
    }
    Ok(())
}
