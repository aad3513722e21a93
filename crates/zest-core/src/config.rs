use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// DeployTarget
// ---------------------------------------------------------------------------

/// A third-party agent tool that receives the packaged commands and skills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployTarget {
    Cursor,
    Opencode,
}

impl DeployTarget {
    pub fn all() -> &'static [DeployTarget] {
        &[DeployTarget::Cursor, DeployTarget::Opencode]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeployTarget::Cursor => "cursor",
            DeployTarget::Opencode => "opencode",
        }
    }

    /// Project-relative directory the tool reads from.
    pub fn dir_name(self) -> &'static str {
        match self {
            DeployTarget::Cursor => ".cursor",
            DeployTarget::Opencode => ".opencode",
        }
    }

    pub fn commands_dir(self, root: &Path) -> PathBuf {
        root.join(self.dir_name()).join("commands")
    }

    pub fn skills_dir(self, root: &Path) -> PathBuf {
        root.join(self.dir_name()).join("skills")
    }
}

impl fmt::Display for DeployTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Optional project settings read from `.zest-spec/config.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Spec template path, relative to the project root. When unset the
    /// `.zest-spec/template/spec.md` override is used if present, else the
    /// packaged default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,

    #[serde(default = "default_targets")]
    pub targets: Vec<DeployTarget>,
}

fn default_targets() -> Vec<DeployTarget> {
    DeployTarget::all().to_vec()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template: None,
            targets: default_targets(),
        }
    }
}

impl Config {
    /// Load the project config. A missing file yields the defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        let Some(data) = crate::io::read_optional(&path)? else {
            return Ok(Self::default());
        };
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(&data)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Absolute path of the configured template, if any.
    pub fn template_path(&self, root: &Path) -> Option<PathBuf> {
        self.template.as_ref().map(|p| root.join(p))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
