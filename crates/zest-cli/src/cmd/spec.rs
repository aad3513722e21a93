use crate::output::{print, print_json, print_table};
use anyhow::Context;
use serde::Serialize;
use std::path::Path;
use zest_core::{
    config::Config,
    paths,
    spec::{self as registry, Spec},
    transition,
    types::{SpecRef, Status},
};

#[derive(Serialize)]
struct Created<'a> {
    ok: bool,
    spec: &'a Spec,
}

#[derive(Serialize)]
struct CurrentChanged<'a> {
    ok: bool,
    current: Option<&'a str>,
}

#[derive(Serialize)]
struct StatusUpdated<'a> {
    ok: bool,
    id: &'a str,
    from: Status,
    to: Status,
}

fn parse_ref(raw: &str) -> SpecRef {
    match raw.parse::<SpecRef>() {
        Ok(spec_ref) => spec_ref,
        Err(never) => match never {},
    }
}

pub fn list(root: &Path, table: bool, json: bool) -> anyhow::Result<()> {
    let specs = Spec::list(root).context("failed to list specs")?;

    if json {
        return print_json(&specs);
    }
    if !table {
        return print(&specs, false);
    }

    if specs.is_empty() {
        println!("No specs yet.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = specs
        .iter()
        .map(|s| {
            vec![
                s.id.clone(),
                s.status.clone(),
                if s.current { "*".to_string() } else { String::new() },
                s.name.clone(),
            ]
        })
        .collect();
    print_table(&["ID", "STATUS", "CURRENT", "NAME"], &rows);
    Ok(())
}

pub fn show(root: &Path, spec: &str, json: bool) -> anyhow::Result<()> {
    let spec = Spec::resolve(root, &parse_ref(spec))?;
    print(&spec, json)
}

pub fn create(root: &Path, slug: &str, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load .zest-spec/config.yaml")?;
    let spec = Spec::create(root, slug, &config)
        .with_context(|| format!("failed to create spec '{slug}'"))?;
    print(&Created { ok: true, spec: &spec }, json)
}

pub fn set_current(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let id = paths::normalize_spec_id(id);
    let spec = registry::set_current(root, &id)?;
    print(
        &CurrentChanged {
            ok: true,
            current: Some(&spec.id),
        },
        json,
    )
}

pub fn unset_current(root: &Path, json: bool) -> anyhow::Result<()> {
    registry::unset_current(root).context("failed to remove current pointer")?;
    print(
        &CurrentChanged {
            ok: true,
            current: None,
        },
        json,
    )
}

pub fn update_status(root: &Path, spec: &str, status: &str, json: bool) -> anyhow::Result<()> {
    let spec_ref = parse_ref(spec);
    let change = transition::update_status(root, &spec_ref, status)
        .with_context(|| format!("failed to update status of spec {spec_ref}"))?;
    print(
        &StatusUpdated {
            ok: true,
            id: &change.id,
            from: change.from,
            to: change.to,
        },
        json,
    )
}
