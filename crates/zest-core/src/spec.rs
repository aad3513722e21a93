use crate::config::Config;
use crate::current;
use crate::error::{IoContext, Result, ZestError};
use crate::frontmatter;
use crate::paths;
use crate::template;
use crate::types::{SpecRef, Status};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Spec
// ---------------------------------------------------------------------------

/// A numbered spec directory and what its document says about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spec {
    pub id: String,
    pub name: String,
    /// Document path relative to the project root.
    pub path: PathBuf,
    /// Whether the current pointer referenced this spec when it was read.
    pub current: bool,
    /// Status as persisted. Defaults to `new` when the document or its
    /// frontmatter is missing; may be outside the lifecycle if hand-edited.
    pub status: String,
    #[serde(skip)]
    pub slug: String,
}

impl Spec {
    // ---------------------------------------------------------------------------
    // Discovery
    // ---------------------------------------------------------------------------

    /// Names of all spec directories under `specs/`, in id order.
    pub fn dir_names(root: &Path) -> Result<Vec<String>> {
        let specs_dir = paths::specs_dir(root);
        let entries = match std::fs::read_dir(&specs_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).at(&specs_dir),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.at(&specs_dir)?;
            if !entry.file_type().at(entry.path())?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if paths::is_spec_dir_name(&name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Directory name of the spec with `id`, if one is listed.
    pub fn find_dir(root: &Path, id: &str) -> Result<Option<String>> {
        Ok(Self::dir_names(root)?
            .into_iter()
            .find(|name| paths::parse_spec_id(name) == Some(id)))
    }

    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let current_id = current::current_id(root)?;
        Self::dir_names(root)?
            .iter()
            .map(|name| Self::from_dir(root, name, current_id.as_deref()))
            .collect()
    }

    // ---------------------------------------------------------------------------
    // Resolution
    // ---------------------------------------------------------------------------

    /// Fetch a spec by literal id.
    pub fn load(root: &Path, id: &str) -> Result<Self> {
        let id = paths::normalize_spec_id(id);
        let dir_name =
            Self::find_dir(root, &id)?.ok_or_else(|| ZestError::NotFound(id.clone()))?;
        let current_id = current::current_id(root)?;
        Self::from_dir(root, &dir_name, current_id.as_deref())
    }

    /// Fetch a spec by id or through the current pointer. A pointer to a
    /// spec that no longer exists is `NotFound`.
    pub fn resolve(root: &Path, spec_ref: &SpecRef) -> Result<Self> {
        match spec_ref {
            SpecRef::Id(id) => Self::load(root, id),
            SpecRef::Current => {
                let id = current::current_id(root)?.ok_or(ZestError::NoCurrentSpec)?;
                Self::load(root, &id)
            }
        }
    }

    fn from_dir(root: &Path, dir_name: &str, current_id: Option<&str>) -> Result<Self> {
        let id = paths::parse_spec_id(dir_name)
            .ok_or_else(|| ZestError::NotFound(dir_name.to_string()))?
            .to_string();
        let slug = paths::parse_spec_slug(dir_name).unwrap_or_default().to_string();

        let document = paths::spec_document(&paths::spec_dir(root, dir_name));
        let status = read_status(&document)?;
        let path = document
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or(document);

        Ok(Self {
            current: current_id == Some(id.as_str()),
            name: paths::display_name(&slug),
            id,
            path,
            status,
            slug,
        })
    }

    // ---------------------------------------------------------------------------
    // Creation
    // ---------------------------------------------------------------------------

    /// Next free id: one past the highest listed id.
    pub fn next_id(root: &Path) -> Result<String> {
        let highest = Self::dir_names(root)?
            .iter()
            .filter_map(|name| paths::parse_spec_id(name))
            .filter_map(|id| id.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        if highest >= paths::MAX_SPEC_ID {
            return Err(ZestError::IdExhausted);
        }
        Ok(paths::format_spec_id(highest + 1))
    }

    /// Create `specs/{id}-{slug}/spec.md` from the resolved template.
    pub fn create(root: &Path, slug: &str, config: &Config) -> Result<Self> {
        paths::validate_slug(slug)?;

        let id = Self::next_id(root)?;
        let dir_name = paths::spec_dir_name(&id, slug);
        let dir = paths::spec_dir(root, &dir_name);
        if dir.exists() {
            return Err(ZestError::AlreadyExists(dir_name));
        }

        let (template_text, source) = template::resolve(root, config)?;
        let name = paths::display_name(slug);
        let content = with_initial_status(template::render(
            &template_text,
            &id,
            &name,
            &template::today(),
        ));

        crate::io::ensure_dir(&dir)?;
        crate::io::atomic_write(&dir.join(paths::SPEC_FILE), content.as_bytes())?;
        tracing::info!(spec = %dir_name, template = ?source, "created spec");

        let current_id = current::current_id(root)?;
        Self::from_dir(root, &dir_name, current_id.as_deref())
    }

    // ---------------------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------------------

    pub fn dir_name(&self) -> String {
        paths::spec_dir_name(&self.id, &self.slug)
    }

    /// Absolute document path.
    pub fn document(&self, root: &Path) -> PathBuf {
        root.join(&self.path)
    }
}

/// New specs start at the initial stage whatever status a custom template
/// carries. Documents without a usable frontmatter block already read as
/// the initial stage and are left as rendered.
fn with_initial_status(content: String) -> String {
    let initial = Status::default().as_str();
    let needs_reset = frontmatter::split(&content).is_some()
        && frontmatter::decode(&content)
            .is_ok_and(|fm| frontmatter::get_str(&fm, "status").as_deref() != Some(initial));
    if !needs_reset {
        return content;
    }
    match frontmatter::set_field(&content, "status", initial) {
        Ok(Some(updated)) => updated,
        _ => content,
    }
}

/// Status recorded in a document's frontmatter. Missing documents and
/// missing or unreadable frontmatter fall back to the initial stage.
fn read_status(document: &Path) -> Result<String> {
    let Some(content) = crate::io::read_optional(document)? else {
        return Ok(Status::default().to_string());
    };
    let status = match frontmatter::decode(&content) {
        Ok(fm) => frontmatter::get_str(&fm, "status"),
        Err(e) => {
            tracing::debug!(path = %document.display(), error = %e, "unparsable frontmatter");
            None
        }
    };
    Ok(status.unwrap_or_else(|| Status::default().to_string()))
}

// ---------------------------------------------------------------------------
// Status query
// ---------------------------------------------------------------------------

/// Project overview: how many specs exist and which one is current.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub specs_count: usize,
    pub current: Option<CurrentSummary>,
}

/// The current spec as seen by the status query. When the pointer is
/// dangling only `id` is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentSummary {
    pub id: String,
    pub name: Option<String>,
    pub path: Option<PathBuf>,
    pub status: Option<String>,
}

impl From<Spec> for CurrentSummary {
    fn from(spec: Spec) -> Self {
        Self {
            id: spec.id,
            name: Some(spec.name),
            path: Some(spec.path),
            status: Some(spec.status),
        }
    }
}

pub fn status_report(root: &Path) -> Result<StatusReport> {
    let dir_names = Spec::dir_names(root)?;
    let current = match current::current_id(root)? {
        None => None,
        Some(id) => match Spec::load(root, &id) {
            Ok(spec) => Some(spec.into()),
            Err(ZestError::NotFound(_)) => {
                tracing::warn!(id = %id, "current pointer references a missing spec");
                Some(CurrentSummary {
                    id,
                    name: None,
                    path: None,
                    status: None,
                })
            }
            Err(e) => return Err(e),
        },
    };
    Ok(StatusReport {
        specs_count: dir_names.len(),
        current,
    })
}

// ---------------------------------------------------------------------------
// Current pointer
// ---------------------------------------------------------------------------

/// Make the spec with `id` current. Returns the spec now current.
pub fn set_current(root: &Path, id: &str) -> Result<Spec> {
    let spec = Spec::load(root, id)?;
    current::set(root, &spec.dir_name())?;
    Ok(Spec {
        current: true,
        ..spec
    })
}

/// Clear the current pointer. Never fails when no pointer is set.
pub fn unset_current(root: &Path) -> Result<()> {
    current::unset(root)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create(dir: &TempDir, slug: &str) -> Spec {
        Spec::create(dir.path(), slug, &Config::default()).unwrap()
    }

    #[test]
    fn list_without_specs_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(Spec::list(dir.path()).unwrap().is_empty());
        assert_eq!(status_report(dir.path()).unwrap().specs_count, 0);
    }

    #[test]
    fn ids_are_sequential_regardless_of_slug() {
        let dir = TempDir::new().unwrap();
        let slugs = ["zeta", "alpha", "m-3", "b", "zz-top", "a1"];
        for (i, slug) in slugs.iter().enumerate() {
            let spec = create(&dir, slug);
            assert_eq!(spec.id, format!("{:03}", i + 1));
        }
        let ids: Vec<_> = Spec::list(dir.path())
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, ["001", "002", "003", "004", "005", "006"]);
    }

    #[test]
    fn create_writes_rendered_document() {
        let dir = TempDir::new().unwrap();
        let spec = create(&dir, "first-spec");
        assert_eq!(spec.id, "001");
        assert_eq!(spec.name, "First Spec");
        assert_eq!(spec.status, "new");
        assert!(!spec.current);
        assert_eq!(spec.path, PathBuf::from("specs/001-first-spec/spec.md"));

        let content = std::fs::read_to_string(spec.document(dir.path())).unwrap();
        let fm = frontmatter::decode(&content).unwrap();
        assert_eq!(frontmatter::get_str(&fm, "id").as_deref(), Some("001"));
        assert_eq!(frontmatter::get_str(&fm, "name").as_deref(), Some("First Spec"));
        assert!(content.contains("# First Spec"));
    }

    #[test]
    fn create_uses_highest_id_not_count() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("specs/007-old")).unwrap();
        let spec = create(&dir, "next");
        assert_eq!(spec.id, "008");
    }

    #[test]
    fn create_rejects_bad_slug() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Spec::create(dir.path(), "Bad Slug", &Config::default()),
            Err(ZestError::InvalidSlug(_))
        ));
        assert!(!dir.path().join("specs").exists());
    }

    #[test]
    fn create_fails_when_ids_exhausted() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("specs/999-last")).unwrap();
        assert!(matches!(
            Spec::create(dir.path(), "overflow", &Config::default()),
            Err(ZestError::IdExhausted)
        ));
    }

    #[test]
    fn create_with_missing_configured_template_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let cfg = Config {
            template: Some("missing.md".into()),
            ..Config::default()
        };
        assert!(matches!(
            Spec::create(dir.path(), "x", &cfg),
            Err(ZestError::TemplateNotFound(_))
        ));
        assert!(Spec::dir_names(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn custom_template_status_is_reset_to_new() {
        let dir = TempDir::new().unwrap();
        let path = paths::template_override_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            "---\nid: \"{id}\"\nstatus: custom\n---\n\nToken: {id}|{name}|{date}\n",
        )
        .unwrap();

        let spec = create(&dir, "custom-template");
        assert_eq!(spec.status, "new");
        let content = std::fs::read_to_string(spec.document(dir.path())).unwrap();
        assert!(content.starts_with("---\nid: \"001\"\nstatus: new\n---\n"));
        assert!(content.contains("Token: 001|Custom Template|"));
        assert_eq!(Spec::load(dir.path(), "001").unwrap().status, "new");
    }

    #[test]
    fn template_without_status_gains_initial_status() {
        let dir = TempDir::new().unwrap();
        let path = paths::template_override_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "---\nid: \"{id}\"\n---\n# {name}\n").unwrap();

        let spec = create(&dir, "bare");
        let content = std::fs::read_to_string(spec.document(dir.path())).unwrap();
        assert_eq!(content, "---\nid: \"001\"\nstatus: new\n---\n# Bare\n");
    }

    #[test]
    fn template_without_frontmatter_is_kept_verbatim() {
        let dir = TempDir::new().unwrap();
        let path = paths::template_override_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "# {name} ({id})\n").unwrap();

        let spec = create(&dir, "plain");
        assert_eq!(spec.status, "new");
        let content = std::fs::read_to_string(spec.document(dir.path())).unwrap();
        assert_eq!(content, "# Plain (001)\n");
    }

    #[test]
    fn list_ignores_non_spec_entries() {
        let dir = TempDir::new().unwrap();
        create(&dir, "real");
        std::fs::create_dir_all(dir.path().join("specs/notes")).unwrap();
        std::fs::create_dir_all(dir.path().join("specs/12-short")).unwrap();
        std::fs::write(dir.path().join("specs/003-file"), "not a dir").unwrap();
        set_current(dir.path(), "001").unwrap();

        let specs = Spec::list(dir.path()).unwrap();
        assert_eq!(specs.len(), 1);
        assert!(specs[0].current);
    }

    #[test]
    fn legacy_readme_is_resolved() {
        let dir = TempDir::new().unwrap();
        let spec_dir = dir.path().join("specs/001-legacy");
        std::fs::create_dir_all(&spec_dir).unwrap();
        std::fs::write(spec_dir.join("README.md"), "---\nstatus: designed\n---\n").unwrap();

        let spec = Spec::load(dir.path(), "001").unwrap();
        assert_eq!(spec.path, PathBuf::from("specs/001-legacy/README.md"));
        assert_eq!(spec.status, "designed");
    }

    #[test]
    fn missing_document_or_frontmatter_defaults_to_new() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("specs/001-empty")).unwrap();
        let spec_dir = dir.path().join("specs/002-plain");
        std::fs::create_dir_all(&spec_dir).unwrap();
        std::fs::write(spec_dir.join("spec.md"), "# No frontmatter\n").unwrap();
        let broken = dir.path().join("specs/003-broken");
        std::fs::create_dir_all(&broken).unwrap();
        std::fs::write(broken.join("spec.md"), "---\nstatus: [oops\n---\n").unwrap();

        for spec in Spec::list(dir.path()).unwrap() {
            assert_eq!(spec.status, "new", "spec {}", spec.id);
        }
        assert_eq!(
            Spec::load(dir.path(), "001").unwrap().path,
            PathBuf::from("specs/001-empty/spec.md")
        );
    }

    #[test]
    fn load_unknown_id_is_not_found() {
        let dir = TempDir::new().unwrap();
        create(&dir, "only");
        assert!(matches!(
            Spec::load(dir.path(), "002"),
            Err(ZestError::NotFound(id)) if id == "002"
        ));
    }

    #[test]
    fn load_accepts_unpadded_id() {
        let dir = TempDir::new().unwrap();
        create(&dir, "only");
        assert_eq!(Spec::load(dir.path(), "1").unwrap().id, "001");
    }

    #[test]
    fn resolve_current_matches_resolve_id() {
        let dir = TempDir::new().unwrap();
        create(&dir, "first-spec");
        create(&dir, "second-spec");
        for id in ["001", "002"] {
            set_current(dir.path(), id).unwrap();
            let by_current = Spec::resolve(dir.path(), &SpecRef::Current).unwrap();
            let by_id = Spec::resolve(dir.path(), &SpecRef::Id(id.to_string())).unwrap();
            assert_eq!(by_current, by_id);
            assert!(by_current.current);
        }
    }

    #[test]
    fn resolve_current_without_pointer_fails() {
        let dir = TempDir::new().unwrap();
        create(&dir, "a");
        assert!(matches!(
            Spec::resolve(dir.path(), &SpecRef::Current),
            Err(ZestError::NoCurrentSpec)
        ));
    }

    #[test]
    fn unset_then_resolve_current_fails() {
        let dir = TempDir::new().unwrap();
        create(&dir, "a");
        set_current(dir.path(), "001").unwrap();
        unset_current(dir.path()).unwrap();
        unset_current(dir.path()).unwrap();
        assert!(matches!(
            Spec::resolve(dir.path(), &SpecRef::Current),
            Err(ZestError::NoCurrentSpec)
        ));
    }

    #[test]
    fn set_current_unknown_id_fails_and_keeps_pointer() {
        let dir = TempDir::new().unwrap();
        create(&dir, "a");
        set_current(dir.path(), "001").unwrap();
        assert!(matches!(
            set_current(dir.path(), "005"),
            Err(ZestError::NotFound(_))
        ));
        assert_eq!(current::current_id(dir.path()).unwrap().as_deref(), Some("001"));
    }

    #[test]
    fn status_report_scenario() {
        let dir = TempDir::new().unwrap();
        create(&dir, "first-spec");
        create(&dir, "second-spec");
        set_current(dir.path(), "002").unwrap();

        let report = status_report(dir.path()).unwrap();
        assert_eq!(report.specs_count, 2);
        let current = report.current.unwrap();
        assert_eq!(current.id, "002");
        assert_eq!(current.name.as_deref(), Some("Second Spec"));
        assert_eq!(current.status.as_deref(), Some("new"));
    }

    #[test]
    fn status_report_without_current() {
        let dir = TempDir::new().unwrap();
        create(&dir, "a");
        let report = status_report(dir.path()).unwrap();
        assert_eq!(report.specs_count, 1);
        assert!(report.current.is_none());
    }

    #[test]
    fn dangling_pointer_degrades_in_status_but_fails_in_resolve() {
        let dir = TempDir::new().unwrap();
        create(&dir, "first-spec");
        create(&dir, "second-spec");
        set_current(dir.path(), "002").unwrap();
        std::fs::remove_dir_all(dir.path().join("specs/002-second-spec")).unwrap();

        let report = status_report(dir.path()).unwrap();
        assert_eq!(report.specs_count, 1);
        assert_eq!(
            report.current,
            Some(CurrentSummary {
                id: "002".to_string(),
                name: None,
                path: None,
                status: None,
            })
        );

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["current"]["name"].is_null());
        assert!(json["current"]["status"].is_null());

        assert!(matches!(
            Spec::resolve(dir.path(), &SpecRef::Current),
            Err(ZestError::NotFound(id)) if id == "002"
        ));
    }
}
