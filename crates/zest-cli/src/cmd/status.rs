use crate::output::print;
use anyhow::Context;
use std::path::Path;
use zest_core::spec::status_report;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let report = status_report(root).context("failed to read project status")?;
    print(&report, json)
}
