//! The tag micro-format: `<answer field="NAME">...</answer>` and
//! `<data field="NAME">...</data>`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Which tag wraps a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    /// `<answer>`, used for interview answers.
    Answer,
    /// `<data>`, used for analysis and design outputs.
    Data,
}

impl TagKind {
    #[must_use]
    pub const fn tag_name(&self) -> &'static str {
        match self {
            Self::Answer => "answer",
            Self::Data => "data",
        }
    }

    fn from_tag_name(name: &str) -> Option<Self> {
        match name {
            "answer" => Some(Self::Answer),
            "data" => Some(Self::Data),
            _ => None,
        }
    }

    /// Render `<tag field="NAME">value</tag>`.
    #[must_use]
    pub fn render(&self, field: &str, value: &str) -> String {
        let tag = self.tag_name();
        format!("<{tag} field=\"{field}\">{value}</{tag}>")
    }

    /// Regex capturing the value of one field, across lines, shortest match.
    ///
    /// `value_pattern` narrows the capture (e.g. `[ABC]`); otherwise anything.
    #[must_use]
    pub fn field_regex(&self, field: &str, value_pattern: Option<&str>) -> Regex {
        let tag = self.tag_name();
        let value = value_pattern.unwrap_or(".*?");
        let pattern = format!(
            r#"(?s)<{tag}\s+field\s*=\s*"{}"\s*>\s*({value})\s*</{tag}>"#,
            regex::escape(field)
        );
        // field names are escaped and value patterns are static
        Regex::new(&pattern).unwrap_or_else(|e| panic!("invalid tag pattern {pattern}: {e}"))
    }
}

/// One tagged value found in a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedValue {
    pub kind: TagKind,
    /// Raw `field` attribute.
    pub field: String,
    /// Trimmed inner text.
    pub value: String,
}

static ANY_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<(answer|data)\s+field\s*=\s*"([^"]+)"\s*>(.*?)</(answer|data)>"#).unwrap()
});

/// Every well-formed tag in `response` whose kind is in `kinds`, in order.
///
/// Tags whose closing name does not match the opening one are skipped, as
/// are tags with an empty body.
#[must_use]
pub fn scan_tags(response: &str, kinds: &[TagKind]) -> Vec<TaggedValue> {
    ANY_TAG
        .captures_iter(response)
        .filter_map(|caps| {
            let open = caps.get(1)?.as_str();
            let close = caps.get(4)?.as_str();
            if open != close {
                return None;
            }
            let kind = TagKind::from_tag_name(open)?;
            if !kinds.contains(&kind) {
                return None;
            }
            let value = caps.get(3)?.as_str().trim();
            if value.is_empty() {
                return None;
            }
            Some(TaggedValue {
                kind,
                field: caps.get(2)?.as_str().trim().to_string(),
                value: value.to_string(),
            })
        })
        .collect()
}
