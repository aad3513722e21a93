use crate::error::{Result, ZestError};
use crate::frontmatter;
use crate::spec::Spec;
use crate::types::{SpecRef, Status};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Outcome of a successful status update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub id: String,
    pub from: Status,
    pub to: Status,
    pub path: PathBuf,
}

/// Allowed iff `to` is strictly later than `from`. Skipping stages is fine.
pub fn check_transition(from: Status, to: Status) -> Result<()> {
    if to == from {
        return Err(ZestError::AlreadyAtStatus(to.to_string()));
    }
    if to < from {
        return Err(ZestError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        });
    }
    Ok(())
}

/// Move the referenced spec forward to `target`, rewriting only the
/// `status:` field of its document. Nothing is written on failure.
pub fn update_status(root: &Path, spec_ref: &SpecRef, target: &str) -> Result<StatusChange> {
    let to: Status = target.parse()?;
    let spec = Spec::resolve(root, spec_ref)?;
    let document = spec.document(root);

    let malformed = |reason: &str| ZestError::MalformedDocument {
        path: spec.path.clone(),
        reason: reason.to_string(),
    };

    let content = crate::io::read_optional(&document)?
        .ok_or_else(|| malformed("document does not exist"))?;
    let parts =
        frontmatter::split(&content).ok_or_else(|| malformed("no frontmatter block"))?;
    let fields = frontmatter::parse_block(parts.yaml)
        .map_err(|e| malformed(&format!("unparsable frontmatter: {e}")))?;

    let from = match fields.get("status") {
        None => Status::default(),
        Some(value) => match frontmatter::get_str(&fields, "status") {
            Some(raw) => Status::from_persisted(&raw)?,
            None => return Err(ZestError::InvalidCurrentStatus(render_value(value))),
        },
    };
    check_transition(from, to)?;

    let updated = frontmatter::set_field(&content, "status", to.as_str())?
        .ok_or_else(|| malformed("no frontmatter block"))?;
    crate::io::atomic_write(&document, updated.as_bytes())?;
    tracing::info!(spec = %spec.id, %from, %to, "status updated");

    Ok(StatusChange {
        id: spec.id,
        from,
        to,
        path: spec.path,
    })
}

/// Compact text of a non-scalar YAML value for error messages.
fn render_value(value: &serde_yaml::Value) -> String {
    serde_yaml::to_string(value)
        .map(|text| text.trim_end().replace('\n', " "))
        .unwrap_or_else(|_| format!("{value:?}"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
