//! JSON files on disk: extracted tables and the running log of reports.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::model::RunReport;

const RESULTS_FILE: &str = "results.json";

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("mkdir {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    debug!("wrote {}", path.display());
    Ok(())
}

pub fn results_path(output_dir: &Path) -> PathBuf {
    output_dir.join(RESULTS_FILE)
}

/// Every report appended so far; a missing or empty log is an empty list.
pub fn load_results(output_dir: &Path) -> Result<Vec<RunReport>> {
    let path = results_path(output_dir);
    match fs::read_to_string(&path) {
        Ok(raw) if raw.trim().is_empty() => Ok(Vec::new()),
        Ok(raw) => serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
    }
}

/// Append one report to the log, returning how many it now holds.
pub fn append_result(output_dir: &Path, report: &RunReport) -> Result<usize> {
    let mut results = load_results(output_dir)?;
    results.push(report.clone());
    write_json(&results_path(output_dir), &results)?;
    Ok(results.len())
}

// ── Tests ──
