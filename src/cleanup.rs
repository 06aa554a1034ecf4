// ==============================================================================
// cleanup.rs - Session Artifact Removal
// ==============================================================================
// Description: Caller-invoked removal of interchange files and engine outputs
// Author: Matt Barham
// Created: 2026-10-18
// Modified: 2026-10-18
// Version: 0.1.0
// ==============================================================================
// Nothing in the library calls these; artifacts stay on disk until a caller
// asks for them to go.
// ==============================================================================

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Remove every file in `working_dir` named `<prefix_token>.<anything>`
pub fn remove_run_outputs(working_dir: &Path, prefix_token: &str) -> Result<Vec<PathBuf>> {
    let lead = format!("{}.", prefix_token);
    let mut removed = Vec::new();

    for entry in WalkDir::new(working_dir).min_depth(1).max_depth(1) {
        let entry = entry.context("Failed to list working directory")?;
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(&lead));

        if matches && entry.file_type().is_file() {
            debug!("Removing engine output {:?}", entry.path());
            std::fs::remove_file(entry.path())
                .with_context(|| format!("Failed to remove {:?}", entry.path()))?;
            removed.push(entry.into_path());
        }
    }

    info!("Removed {} engine output files for {}", removed.len(), prefix_token);
    Ok(removed)
}

/// Remove a session's interchange file
pub fn remove_interchange(path: &Path) -> Result<()> {
    std::fs::remove_file(path).with_context(|| format!("Failed to remove {:?}", path))?;
    info!("Removed interchange file {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_removes_only_matching_prefix() {
        let dir = tempdir().unwrap();
        for name in ["run.Purity.0.csv", "run.bestIG.csv", "run2.IG.0.csv", "input.csv"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }

        let mut removed = remove_run_outputs(dir.path(), "run").unwrap();
        removed.sort();

        assert_eq!(
            removed,
            vec![dir.path().join("run.Purity.0.csv"), dir.path().join("run.bestIG.csv")]
        );
        assert!(dir.path().join("run2.IG.0.csv").exists());
        assert!(dir.path().join("input.csv").exists());
    }

    #[test]
    fn test_remove_interchange() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("input.csv");
        std::fs::write(&path, ",1\n").unwrap();

        remove_interchange(&path).unwrap();
        assert!(!path.exists());
        assert!(remove_interchange(&path).is_err());
    }
}
