use anyhow::{Context, Result};
use chrono::DateTime;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{AssignmentFile, ASSIGNMENT_FILE_VERSION};

/// `<local data dir>/case-digest/assignments`, created if missing.
pub fn get_default_assignments_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .context("Could not determine local data directory")?
        .join("case-digest")
        .join("assignments");

    fs::create_dir_all(&data_dir).context("Could not create the saved assignments directory")?;

    Ok(data_dir)
}

/// Write a run under [`get_default_assignments_dir`]; returns the full path.
pub fn save_assignment(data: &AssignmentFile, filename: &str) -> Result<PathBuf> {
    let dir = get_default_assignments_dir()?;
    save_assignment_in(&dir, data, filename)
}

pub fn save_assignment_in(dir: &Path, data: &AssignmentFile, filename: &str) -> Result<PathBuf> {
    let filepath = dir.join(filename);

    let json =
        serde_json::to_string_pretty(data).context("Failed to serialize assignment data")?;

    fs::write(&filepath, json)
        .with_context(|| format!("Failed to write assignment file: {}", filepath.display()))?;

    Ok(filepath)
}

/// Read a saved run back.
///
/// Refuses files from another format version and files whose group totals
/// no longer match their cases.
pub fn load_assignment(filepath: &Path) -> Result<AssignmentFile> {
    if !filepath.exists() {
        anyhow::bail!("Assignment file not found: {}", filepath.display());
    }

    let content = fs::read_to_string(filepath)
        .with_context(|| format!("Failed to read assignment file: {}", filepath.display()))?;

    let data: AssignmentFile = serde_json::from_str(&content).with_context(|| {
        format!(
            "Failed to parse assignment JSON from {}. Is it a file written by assign-cases --save?",
            filepath.display()
        )
    })?;

    if data.version != ASSIGNMENT_FILE_VERSION {
        anyhow::bail!(
            "Unsupported assignment file version: {}. Expected {}. Please re-run assign-cases to regenerate it.",
            data.version,
            ASSIGNMENT_FILE_VERSION
        );
    }

    if !data.result.is_consistent() {
        anyhow::bail!(
            "Assignment file {} is inconsistent: group totals do not match their cases. Was it edited by hand?",
            filepath.display()
        );
    }

    Ok(data)
}

pub fn list_assignment_files() -> Result<Vec<(PathBuf, AssignmentFile)>> {
    let dir = get_default_assignments_dir()?;
    list_assignment_files_in(&dir)
}

/// Saved runs in `dir`, newest first. Files that fail [`load_assignment`]
/// are logged and left out.
pub fn list_assignment_files_in(dir: &Path) -> Result<Vec<(PathBuf, AssignmentFile)>> {
    let mut files = Vec::new();

    if dir.exists() {
        let entries =
            fs::read_dir(dir).with_context(|| format!("Could not list {}", dir.display()))?;
        for entry in entries {
            let entry = entry?;
            let path = entry.path();

            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                match load_assignment(&path) {
                    Ok(data) => files.push((path, data)),
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "skipping unreadable assignment file"
                        );
                    }
                }
            }
        }
    }

    files.sort_by(|a, b| {
        let time_a = DateTime::parse_from_rfc3339(&a.1.created_at).ok();
        let time_b = DateTime::parse_from_rfc3339(&b.1.created_at).ok();
        time_b.cmp(&time_a)
    });

    Ok(files)
}
