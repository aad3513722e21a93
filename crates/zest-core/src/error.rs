use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ZestError {
    #[error("spec {0} not found")]
    NotFound(String),

    #[error("no current spec set")]
    NoCurrentSpec,

    #[error("spec directory {0} already exists")]
    AlreadyExists(String),

    #[error("invalid slug '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidSlug(String),

    #[error("spec id space exhausted: 999 is the highest id")]
    IdExhausted,

    #[error("invalid status '{status}'. Valid statuses: {valid}")]
    InvalidStatus { status: String, valid: String },

    #[error("invalid current status '{0}' in spec frontmatter")]
    InvalidCurrentStatus(String),

    #[error("spec is already at status '{0}'")]
    AlreadyAtStatus(String),

    #[error("invalid transition {from} -> {to}: status can only move forward")]
    InvalidTransition { from: String, to: String },

    #[error("malformed spec document {}: {reason}", path.display())]
    MalformedDocument { path: PathBuf, reason: String },

    #[error("template not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("{}: {source}", path.display())]
    IoAt {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ZestError>;

/// Attach the offending path to a raw I/O error.
pub trait IoContext<T> {
    fn at(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn at(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| ZestError::IoAt {
            path: path.into(),
            source,
        })
    }
}
