use crate::config::Config;
use crate::error::{Result, ZestError};
use crate::paths;
use std::path::Path;

/// Spec template shipped with the binary.
pub const DEFAULT_SPEC_TEMPLATE: &str = r#"---
id: "{id}"
name: "{name}"
status: new
created: "{date}"
---

# {name}

## Overview

What this spec delivers and why it matters.

## Research

Findings, constraints, prior art, open questions.

## Design

Approach, interfaces, data model, trade-offs.

## Implementation

Task breakdown and progress notes.

## Summary

What shipped, what changed from the design, follow-ups.
"#;

/// Where the spec template came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Configured(std::path::PathBuf),
    Override(std::path::PathBuf),
    Packaged,
}

/// Resolve the spec template text: configured path, else the project
/// override file, else the packaged default.
pub fn resolve(root: &Path, config: &Config) -> Result<(String, TemplateSource)> {
    if let Some(path) = config.template_path(root) {
        return match crate::io::read_optional(&path)? {
            Some(text) => Ok((text, TemplateSource::Configured(path))),
            None => Err(ZestError::TemplateNotFound(path)),
        };
    }

    let override_path = paths::template_override_path(root);
    if let Some(text) = crate::io::read_optional(&override_path)? {
        return Ok((text, TemplateSource::Override(override_path)));
    }

    Ok((DEFAULT_SPEC_TEMPLATE.to_string(), TemplateSource::Packaged))
}

/// Substitute every `{id}`, `{name}` and `{date}` token.
pub fn render(template: &str, id: &str, name: &str, date: &str) -> String {
    template
        .replace("{id}", id)
        .replace("{name}", name)
        .replace("{date}", date)
}

/// Today's UTC calendar date, `YYYY-MM-DD`.
pub fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}
