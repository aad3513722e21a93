use crate::output::print;
use anyhow::Context;
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::path::Path;
use zest_core::{
    config::{Config, DeployTarget},
    frontmatter, io, paths,
};

/// Directory name of the packaged skill under each target's `skills/`.
const SKILL_NAME: &str = "zest-spec";

/// Prefix given to every deployed command file.
const COMMAND_PREFIX: &str = "zest-spec-";

/// Frontmatter fields the agent tools understand; the rest are dropped.
const KEPT_COMMAND_FIELDS: &[&str] = &["description"];

#[derive(Debug, Serialize)]
struct TargetReport {
    commands: Vec<String>,
    skills: Vec<String>,
}

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config_path = paths::config_path(root);
    let config = if config_path.exists() {
        Config::load(root).context("failed to load .zest-spec/config.yaml")?
    } else {
        let cfg = Config::default();
        cfg.save(root).context("failed to write .zest-spec/config.yaml")?;
        eprintln!("  created: {}", paths::CONFIG_FILE);
        cfg
    };

    let mut report = Mapping::new();
    report.insert("ok".into(), Value::Bool(true));

    let mut deployed: Vec<DeployTarget> = Vec::new();
    for &target in &config.targets {
        if deployed.contains(&target) {
            continue;
        }
        let target_report = deploy_target(root, target)
            .with_context(|| format!("failed to deploy to {}/", target.dir_name()))?;
        report.insert(
            target.as_str().into(),
            serde_yaml::to_value(&target_report)?,
        );
        deployed.push(target);
    }

    tracing::info!(targets = deployed.len(), "plugin deployed");
    print(&report, json)
}

fn deploy_target(root: &Path, target: DeployTarget) -> anyhow::Result<TargetReport> {
    let commands_dir = target.commands_dir(root);
    let skills_dir = target.skills_dir(root);
    io::ensure_dir(&commands_dir)?;
    io::ensure_dir(&skills_dir)?;

    let mut commands = Vec::new();
    for (name, source) in COMMANDS {
        let filename = format!("{COMMAND_PREFIX}{name}.md");
        let content = render_command(source)
            .with_context(|| format!("packaged command '{name}' has invalid frontmatter"))?;
        write_scaffold(root, &commands_dir.join(&filename), &content)?;
        commands.push(filename);
    }

    let skill_dir = skills_dir.join(SKILL_NAME);
    for (relative, content) in SKILL_FILES {
        write_scaffold(root, &skill_dir.join(relative), content)?;
    }

    Ok(TargetReport {
        commands,
        skills: vec![format!("{SKILL_NAME}/")],
    })
}

/// Reduce a packaged command's frontmatter to the fields the agent tools
/// accept, keeping the body.
fn render_command(source: &str) -> anyhow::Result<String> {
    let (fields, body) = match frontmatter::split(source) {
        Some(parts) => (frontmatter::parse_block(parts.yaml)?, parts.body),
        None => (Mapping::new(), source),
    };
    let kept = frontmatter::retain_keys(&fields, KEPT_COMMAND_FIELDS);
    Ok(frontmatter::encode(&kept, &format!("\n{}\n", body.trim()))?)
}

/// Upsert a scaffold file. Prints "created:" or "updated:" to stderr so
/// stdout stays machine-readable.
fn write_scaffold(root: &Path, path: &Path, content: &str) -> anyhow::Result<()> {
    let existed = path.exists();
    io::atomic_write(path, content.as_bytes())?;
    let display = path.strip_prefix(root).unwrap_or(path).display();
    if existed {
        eprintln!("  updated: {display}");
    } else {
        eprintln!("  created: {display}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Packaged commands
// ---------------------------------------------------------------------------

const COMMANDS: &[(&str, &str)] = &[
    ("new", ZEST_NEW_COMMAND),
    ("research", ZEST_RESEARCH_COMMAND),
    ("design", ZEST_DESIGN_COMMAND),
    ("implement", ZEST_IMPLEMENT_COMMAND),
    ("summarize", ZEST_SUMMARIZE_COMMAND),
];

const ZEST_NEW_COMMAND: &str = r#"---
description: Create a new spec and make it the current one
argument-hint: <spec-slug>
allowed-tools: Bash, Read, Write, Edit
---

# zest-spec-new

Start a new unit of work as a numbered spec under `specs/`.

**Step 1: Pick the slug**

Use the slug given in $ARGUMENTS. It must be lowercase letters, digits and
hyphens (for example `user-login`). If none was given, ask the user for one.

**Step 2: Create the spec**

```bash
zest-spec create <slug>
```

Note the `id` and `path` in the output.

**Step 3: Make it current**

```bash
zest-spec set-current <id>
```

**Step 4: Fill in the overview**

Open the spec document at `path` and write the `## Overview` section from
what the user described. Keep the frontmatter as it is.

**Step 5: Report**

Tell the user the spec id, its path, and that the next step is
`/zest-spec-research`.
"#;

const ZEST_RESEARCH_COMMAND: &str = r#"---
description: Research the current spec and record findings
argument-hint: "[spec-id]"
allowed-tools: Bash, Read, Write, Edit, Glob, Grep, WebFetch
---

# zest-spec-research

Investigate the problem space before any design work.

**Step 1: Resolve the spec**

Use the id from $ARGUMENTS, or `current` when none was given:

```bash
zest-spec show <id|current>
```

If no current spec is set, ask the user which spec to work on.

**Step 2: Read the overview**

Read the spec document at `path` and the code it touches.

**Step 3: Record findings**

Write the `## Research` section: constraints, existing code paths, prior
art, risks and open questions.

**Step 4: Advance the status**

```bash
zest-spec update-status <id> researched
```

**Step 5: Report**

Summarize the findings and suggest `/zest-spec-design` next.
"#;

const ZEST_DESIGN_COMMAND: &str = r#"---
description: Design the solution for the current spec
argument-hint: "[spec-id]"
allowed-tools: Bash, Read, Write, Edit, Glob, Grep
---

# zest-spec-design

Turn research into a concrete plan.

**Step 1: Resolve the spec**

Use the id from $ARGUMENTS, or `current` when none was given:

```bash
zest-spec show <id|current>
```

**Step 2: Review the research**

Read the `## Overview` and `## Research` sections. If research is missing,
suggest running `/zest-spec-research` first.

**Step 3: Write the design**

Fill in `## Design`: approach, interfaces, data model and trade-offs. Then
list the implementation tasks under `## Implementation` as a checklist.

**Step 4: Advance the status**

```bash
zest-spec update-status <id> designed
```

**Step 5: Report**

Present the design for review and suggest `/zest-spec-implement` next.
"#;

const ZEST_IMPLEMENT_COMMAND: &str = r#"---
description: Implement the current spec's design
argument-hint: "[spec-id]"
allowed-tools: Bash, Read, Write, Edit, Glob, Grep
---

# zest-spec-implement

Build what the design describes.

**Step 1: Resolve the spec**

Use the id from $ARGUMENTS, or `current` when none was given:

```bash
zest-spec show <id|current>
```

**Step 2: Load the plan**

Read `## Design` and the task checklist under `## Implementation`.

**Step 3: Work through the tasks**

Implement each task in order. Tick it off in the checklist and add short
progress notes as you go. Run the project's tests after each task.

**Step 4: Advance the status**

When every task is done and the tests pass:

```bash
zest-spec update-status <id> implemented
```

**Step 5: Report**

List what changed and suggest `/zest-spec-summarize` next.
"#;

const ZEST_SUMMARIZE_COMMAND: &str = r#"---
description: Summarize what shipped for the current spec
argument-hint: "[spec-id]"
allowed-tools: Bash, Read, Write, Edit
---

# zest-spec-summarize

Close out a spec with a record of what was delivered.

**Step 1: Resolve the spec**

Use the id from $ARGUMENTS, or `current` when none was given:

```bash
zest-spec show <id|current>
```

**Step 2: Compare plan and result**

Read the whole spec document and the changes made during implementation.

**Step 3: Write the summary**

Fill in `## Summary`: what shipped, where it deviated from the design, and
any follow-up work.

**Step 4: Clear the current spec**

```bash
zest-spec unset-current
```

**Step 5: Report**

Give the user the summary.
"#;

// ---------------------------------------------------------------------------
// Packaged skill
// ---------------------------------------------------------------------------

/// Files of the `zest-spec` skill, relative to its directory.
const SKILL_FILES: &[(&str, &str)] = &[
    ("SKILL.md", ZEST_SKILL),
    ("references/cli.md", ZEST_SKILL_CLI_REFERENCE),
];

const ZEST_SKILL: &str = r#"---
name: zest-spec
description: Drive a unit of work through the zest-spec lifecycle (new, researched, designed, implemented). Use when the user wants to plan, design or build a feature as a spec.
---

# zest-spec

Specs live in `specs/NNN-slug/spec.md`. Each has a `status` in its
frontmatter that only moves forward:

```
new → researched → designed → implemented
```

Skipping stages is allowed; moving backward is not.

## Workflow

1. Run `zest-spec status` to see how many specs exist and which is current.
2. Start new work with `/zest-spec-new <slug>`.
3. Continue with `/zest-spec-research`, `/zest-spec-design`,
   `/zest-spec-implement` and `/zest-spec-summarize`.
4. Change status only with `zest-spec update-status`; never edit the
   `status:` line by hand.

See `references/cli.md` for every command and its output.
"#;

const ZEST_SKILL_CLI_REFERENCE: &str = r#"# zest-spec CLI reference

All commands print YAML. Add `--json` for JSON.

| Command | Output |
|---|---|
| `zest-spec status` | `specs_count`, `current` |
| `zest-spec list` | every spec |
| `zest-spec show <id\|current>` | `id`, `name`, `path`, `current`, `status` |
| `zest-spec create <slug>` | `ok`, `spec` |
| `zest-spec set-current <id>` | `ok`, `current` |
| `zest-spec unset-current` | `ok`, `current: null` |
| `zest-spec update-status <id\|current> <status>` | `ok`, `id`, `from`, `to` |
| `zest-spec init` | deployed commands and skills per tool |

Errors go to stderr as `error: ...` and the exit code is 1.

## Templates

`zest-spec create` renders `.zest-spec/template/spec.md` when it exists,
otherwise the built-in template. The tokens `{id}`, `{name}` and `{date}`
are replaced everywhere in the template.
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packaged_commands_keep_only_description() {
        for (name, source) in COMMANDS {
            let rendered = render_command(source).unwrap();
            let fields = frontmatter::decode(&rendered).unwrap();
            assert_eq!(fields.len(), 1, "command {name}");
            assert!(frontmatter::get_str(&fields, "description").is_some());

            let body = frontmatter::split(&rendered).unwrap().body;
            assert!(body.starts_with('\n'), "command {name}");
            assert!(body.contains("$ARGUMENTS"), "command {name}");
            assert!(body.contains("**Step 1:"), "command {name}");
        }
    }

    #[test]
    fn command_without_frontmatter_passes_through() {
        let rendered = render_command("# Plain\n").unwrap();
        assert_eq!(rendered, "---\n---\n\n# Plain\n");
    }

    #[test]
    fn skill_front_matter_names_the_skill() {
        let fields = frontmatter::decode(ZEST_SKILL).unwrap();
        assert_eq!(frontmatter::get_str(&fields, "name").as_deref(), Some(SKILL_NAME));
    }
}
