use crate::error::{Result, ZestError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const SPECS_DIR: &str = "specs";
pub const CURRENT_POINTER: &str = "current";

pub const SPEC_FILE: &str = "spec.md";
pub const LEGACY_SPEC_FILE: &str = "README.md";

pub const ZEST_DIR: &str = ".zest-spec";
pub const CONFIG_FILE: &str = ".zest-spec/config.yaml";
pub const TEMPLATE_OVERRIDE: &str = ".zest-spec/template/spec.md";

/// Highest id a three-digit prefix can carry.
pub const MAX_SPEC_ID: u32 = 999;

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn specs_dir(root: &Path) -> PathBuf {
    root.join(SPECS_DIR)
}

pub fn spec_dir(root: &Path, dir_name: &str) -> PathBuf {
    specs_dir(root).join(dir_name)
}

pub fn current_pointer(root: &Path) -> PathBuf {
    specs_dir(root).join(CURRENT_POINTER)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn template_override_path(root: &Path) -> PathBuf {
    root.join(TEMPLATE_OVERRIDE)
}

/// Resolve the document inside a spec directory: `spec.md`, else the legacy
/// `README.md`, else `spec.md` (the name a new document gets).
pub fn spec_document(dir: &Path) -> PathBuf {
    let current = dir.join(SPEC_FILE);
    if current.exists() {
        return current;
    }
    let legacy = dir.join(LEGACY_SPEC_FILE);
    if legacy.exists() {
        return legacy;
    }
    current
}

// ---------------------------------------------------------------------------
// Spec directory names
// ---------------------------------------------------------------------------

static SPEC_DIR_RE: OnceLock<Regex> = OnceLock::new();

fn spec_dir_re() -> &'static Regex {
    SPEC_DIR_RE.get_or_init(|| Regex::new(r"^([0-9]{3})-(.+)$").unwrap())
}

/// `"001-init-project"` -> `Some("001")`.
pub fn parse_spec_id(dir_name: &str) -> Option<&str> {
    spec_dir_re()
        .captures(dir_name)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// `"001-init-project"` -> `Some("init-project")`.
pub fn parse_spec_slug(dir_name: &str) -> Option<&str> {
    spec_dir_re()
        .captures(dir_name)
        .and_then(|c| c.get(2))
        .map(|m| m.as_str())
}

pub fn is_spec_dir_name(name: &str) -> bool {
    spec_dir_re().is_match(name)
}

/// Display name for a slug: split on `-`, upper-case each word's first char.
pub fn display_name(slug: &str) -> String {
    slug.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_spec_id(n: u32) -> String {
    format!("{n:03}")
}

pub fn spec_dir_name(id: &str, slug: &str) -> String {
    format!("{id}-{slug}")
}

/// Zero-pad short numeric identifiers (`"7"` -> `"007"`); anything else is
/// returned unchanged.
pub fn normalize_spec_id(raw: &str) -> String {
    if !raw.is_empty() && raw.len() < 3 && raw.chars().all(|c| c.is_ascii_digit()) {
        format!("{raw:0>3}")
    } else {
        raw.to_string()
    }
}

// ---------------------------------------------------------------------------
// Slug validation
// ---------------------------------------------------------------------------

static SLUG_RE: OnceLock<Regex> = OnceLock::new();

fn slug_re() -> &'static Regex {
    SLUG_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

pub fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() || slug.len() > 64 || !slug_re().is_match(slug) {
        return Err(ZestError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
