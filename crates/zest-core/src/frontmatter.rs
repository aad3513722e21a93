//! YAML frontmatter embedded at the top of markdown documents.
//!
//! A block starts on the first line with exactly `---` and ends at the next
//! line that is exactly `---`. Everything after the closing line is the body
//! and is never touched by this module.

use crate::error::Result;
use serde_yaml::{Mapping, Value};

const DELIMITER: &str = "---";

/// A document split into its frontmatter text and body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parts<'a> {
    /// Raw YAML between the delimiters (including its trailing newline).
    pub yaml: &'a str,
    /// Everything after the closing delimiter line.
    pub body: &'a str,
    yaml_start: usize,
}

fn strip_eol(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}

/// Locate the frontmatter block. Returns `None` when the document does not
/// open with a delimiter line or the block is never closed.
pub fn split(content: &str) -> Option<Parts<'_>> {
    let mut lines = content.split_inclusive('\n');
    let first = lines.next()?;
    if strip_eol(first) != DELIMITER || !first.ends_with('\n') {
        return None;
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if strip_eol(line) == DELIMITER {
            return Some(Parts {
                yaml: &content[yaml_start..offset],
                body: &content[offset + line.len()..],
                yaml_start,
            });
        }
        offset += line.len();
    }
    None
}

/// Parse a raw YAML block into a mapping. An empty block is an empty mapping;
/// a block that is valid YAML but not a mapping is an error.
pub fn parse_block(yaml: &str) -> Result<Mapping> {
    let value: Value = serde_yaml::from_str(yaml)?;
    if value.is_null() {
        return Ok(Mapping::new());
    }
    Ok(serde_yaml::from_value(value)?)
}

/// Decode the frontmatter of `content`; absent frontmatter is an empty mapping.
pub fn decode(content: &str) -> Result<Mapping> {
    match split(content) {
        Some(parts) => parse_block(parts.yaml),
        None => Ok(Mapping::new()),
    }
}

/// Render `mapping` as a frontmatter block followed by `body`.
pub fn encode(mapping: &Mapping, body: &str) -> Result<String> {
    let yaml = if mapping.is_empty() {
        String::new()
    } else {
        serde_yaml::to_string(mapping)?
    };
    Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n{body}"))
}

/// Read a scalar field as a string. Null, missing and non-scalar values are
/// `None`.
pub fn get_str(mapping: &Mapping, key: &str) -> Option<String> {
    match mapping.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Keep only `keys`, in their original order.
pub fn retain_keys(mapping: &Mapping, keys: &[&str]) -> Mapping {
    mapping
        .iter()
        .filter(|(k, _)| k.as_str().is_some_and(|k| keys.contains(&k)))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Set a top-level string field, returning the new document text, or `None`
/// when `content` has no frontmatter block.
///
/// The `key:` line is rewritten in place, or appended just before the
/// closing delimiter when the key is absent, so sibling fields keep their
/// exact bytes and the body is untouched. When the edited block does not
/// parse back to the expected mapping (multi-line value, unusual quoting)
/// the block is re-encoded instead; values survive, formatting may not.
pub fn set_field(content: &str, key: &str, value: &str) -> Result<Option<String>> {
    let Some(parts) = split(content) else {
        return Ok(None);
    };

    let mut expected = parse_block(parts.yaml)?;
    let present = expected.contains_key(key);
    expected.insert(Value::String(key.to_string()), Value::String(value.to_string()));

    let candidate = if present {
        rewrite_line(content, &parts, key, value)
    } else {
        Some(insert_line(content, &parts, key, value))
    };
    if let Some(rewritten) = candidate {
        let same = split(&rewritten)
            .and_then(|p| parse_block(p.yaml).ok())
            .is_some_and(|m| m == expected);
        if same {
            return Ok(Some(rewritten));
        }
    }

    tracing::debug!(key, "frontmatter line rewrite did not round-trip; re-encoding");
    encode(&expected, parts.body).map(Some)
}

fn rewrite_line(content: &str, parts: &Parts<'_>, key: &str, value: &str) -> Option<String> {
    let mut offset = parts.yaml_start;
    for line in parts.yaml.split_inclusive('\n') {
        let is_key_line = line
            .strip_prefix(key)
            .is_some_and(|rest| rest.starts_with(':'));
        if is_key_line {
            let eol = &line[strip_eol(line).len()..];
            let mut out = String::with_capacity(content.len() + value.len());
            out.push_str(&content[..offset]);
            out.push_str(key);
            out.push_str(": ");
            out.push_str(value);
            out.push_str(eol);
            out.push_str(&content[offset + line.len()..]);
            return Some(out);
        }
        offset += line.len();
    }
    None
}

fn insert_line(content: &str, parts: &Parts<'_>, key: &str, value: &str) -> String {
    let eol = if content.starts_with("---\r\n") { "\r\n" } else { "\n" };
    let close = parts.yaml_start + parts.yaml.len();
    format!("{}{key}: {value}{eol}{}", &content[..close], &content[close..])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
