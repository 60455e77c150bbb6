//! Documentation Extractor
//!
//! Reads a property's JSDoc block into a description and example values.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ResolveError;
use crate::metadata::LiteralValue;
use crate::model::PropertyModel;

lazy_static! {
    /// Leading ` * ` gutter of a JSDoc line
    static ref GUTTER_RE: Regex = Regex::new(r"^\s*\*\s?").unwrap();
    /// Block tag at the start of a line: `@example ...`
    static ref TAG_RE: Regex = Regex::new(r"^@([A-Za-z]+)\s*(.*)$").unwrap();
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocSummary {
    pub description: Option<String>,
    pub examples: Vec<LiteralValue>,
}

pub trait DocExtractor {
    fn extract(&self, property: &PropertyModel) -> Result<DocSummary, ResolveError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsDocExtractor;

impl DocExtractor for JsDocExtractor {
    fn extract(&self, property: &PropertyModel) -> Result<DocSummary, ResolveError> {
        match &property.doc_comment {
            Some(comment) => parse_jsdoc(comment),
            None => Ok(DocSummary::default()),
        }
    }
}

/// Parses a raw `/** ... */` block.
pub fn parse_jsdoc(comment: &str) -> Result<DocSummary, ResolveError> {
    let body = comment
        .trim()
        .strip_prefix("/**")
        .and_then(|rest| rest.strip_suffix("*/"))
        .ok_or_else(|| ResolveError::Documentation {
            message: format!("not a JSDoc block: {}", first_line(comment)),
        })?;

    let mut description_lines: Vec<String> = Vec::new();
    let mut tags: Vec<(String, Vec<String>)> = Vec::new();

    for raw_line in body.lines() {
        let line = GUTTER_RE.replace(raw_line, "");
        let line = line.trim_end();
        if let Some(caps) = TAG_RE.captures(line.trim_start()) {
            let text = caps[2].trim();
            let lines = if text.is_empty() {
                Vec::new()
            } else {
                vec![text.to_string()]
            };
            tags.push((caps[1].to_string(), lines));
        } else if let Some((_, lines)) = tags.last_mut() {
            lines.push(line.to_string());
        } else {
            description_lines.push(description_line(raw_line, line).to_string());
        }
    }

    let description = description_lines.join("\n").trim().to_string();
    let examples = tags
        .into_iter()
        .filter(|(name, _)| name == "example")
        .map(|(_, lines)| lines.join("\n").trim().to_string())
        .filter(|text| !text.is_empty())
        .map(|text| parse_example(&text))
        .collect();

    Ok(DocSummary {
        description: (!description.is_empty()).then_some(description),
        examples,
    })
}

/// A description line with its gutter removed; blank source lines stay blank.
fn description_line<'l>(raw: &'l str, stripped: &'l str) -> &'l str {
    if raw.trim().is_empty() {
        ""
    } else {
        stripped.trim()
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

/// Example text as a literal: JSON when it parses, otherwise the trimmed text.
pub fn parse_example(text: &str) -> LiteralValue {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => LiteralValue::from_json(&value),
        Err(_) => LiteralValue::String(text.to_string()),
    }
}
