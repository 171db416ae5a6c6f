//! Shared fixtures for unit and integration tests.
//!
//! Model responses here are shaped like real assistant replies: a
//! conversational body followed (or not) by tagged fields.

use crate::context::ContextField;

/// `<answer field="NAME">value</answer>`
#[must_use]
pub fn answer_tag(field: ContextField, value: &str) -> String {
    format!("<answer field=\"{}\">{}</answer>", field.as_str(), value)
}

/// `<data field="NAME">value</data>`
#[must_use]
pub fn data_tag(field: ContextField, value: &str) -> String {
    format!("<data field=\"{}\">{}</data>", field.as_str(), value)
}

/// Conversational reply followed by one tagged field.
#[must_use]
pub fn reply_with_answer(body: &str, field: ContextField, value: &str) -> String {
    format!("{body}\n\n{}", answer_tag(field, value))
}

/// Discovery reply asking about the target audience, with no tags.
pub const UNTAGGED_PERSONA_QUESTION: &str = "Great idea! A time tracker with invoicing could \
really help. Now, who is your target user? Think about the persona that will open the app \
every morning.";

/// Market analysis reply carrying a fenced JSON block instead of tags.
pub const MARKET_JSON_REPLY: &str = r#"Here is what I found about the market.

```json
{
  "marketSize": "TAM $4.2B, SAM $600M, SOM $12M",
  "targetSegments": "Freelance designers and developers",
  "competitiveLandscape": "Toggl, Harvest, Clockify",
  "marketOpportunity": "Invoicing bundled with tracking for solo workers"
}
```

Let me know if you want to dig deeper into any segment."#;

/// Specifications reply with stories, requirement bullets and enough text for a summary.
#[must_use]
pub fn specifications_reply() -> String {
    let mut reply = String::from("Here are the specifications for FreelanceTrack.\n\n");
    reply.push_str("## User Stories\n");
    reply.push_str("US-001: As a freelancer, I want to start a timer with one click\n");
    reply.push_str("User Story 2: As a freelancer, I want to generate an invoice from tracked hours\n");
    reply.push_str("As a client, I want to receive invoices by email\n\n");
    reply.push_str("## Functional Requirements\n");
    reply.push_str("- The system shall track time per project\n");
    reply.push_str("- The system shall export invoices as PDF\n\n");
    reply.push_str("## Non-Functional Requirements\n");
    reply.push_str("1. Pages must load in under 2 seconds\n");
    reply.push_str("2. Data must be encrypted at rest\n\n");
    reply.push_str(
        "These specifications cover the core workflow of tracking billable time, turning it \
into invoices and delivering those invoices to clients. Each requirement maps back to a user \
story so that acceptance criteria stay traceable through design and implementation. Security \
and performance requirements apply to every screen of the application.",
    );
    reply
}

/// A STATE.json written by the cooperating CLI, with fields vibeflow does not own.
pub const GENIUS_STATE_DESIGN: &str = r#"{
  "version": "6.2.0",
  "project": {
    "name": "freelance-track",
    "created_at": "2026-01-01T00:00:00Z",
    "updated_at": "2026-01-02T00:00:00Z"
  },
  "phase": "DESIGN",
  "current_skill": "genius-designer",
  "skill_history": [
    {"skill": "genius-interviewer", "started_at": "2026-01-01T00:00:00Z"},
    "genius-specs",
    {"skill": "genius-designer", "started_at": "2026-01-02T00:00:00Z"}
  ],
  "checkpoints": {},
  "tasks": {"total": 12, "completed": 3, "failed": 0, "skipped": 0, "current_task_id": "T-4"},
  "artifacts": {},
  "git": {"enabled": true, "last_checkpoint": "abc123", "checkpoints": []},
  "errors": [],
  "warnings": ["low disk"]
}"#;
