//! On-disk archiving of batch results. The only part of the workspace that writes files.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use batna_batch::{export, BatchError, BatchRun, BatchSummary, StrategyComparison};
use batna_models::SessionFiles;

pub const CSV_FILE_NAME: &str = "negotiations.csv";
pub const SUMMARY_FILE_NAME: &str = "summary.json";
pub const COMPARISON_FILE_NAME: &str = "comparison.json";

/// What an archive call wrote.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ArchiveReport {
    pub dir: PathBuf,
    pub csv_path: PathBuf,
    pub summary_path: PathBuf,
    pub bundles_written: usize,
}

pub struct Archiver {
    root: PathBuf,
    write_bundles: bool,
}

impl Archiver {
    pub fn new(root: impl Into<PathBuf>, write_bundles: bool) -> Self {
        Self {
            root: root.into(),
            write_bundles,
        }
    }

    /// Write one bundle's three documents under `dir`.
    pub fn write_bundle(dir: &Path, files: &SessionFiles) -> Result<(), BatchError> {
        for (relative, contents) in files.entries() {
            let path = dir.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, contents)?;
        }
        Ok(())
    }

    fn write_run_to(
        &self,
        dir: &Path,
        run: &BatchRun,
        summary: &BatchSummary,
    ) -> Result<ArchiveReport, BatchError> {
        fs::create_dir_all(dir)?;

        let csv_path = dir.join(CSV_FILE_NAME);
        fs::write(&csv_path, export::run_to_csv(run))?;

        let summary_path = dir.join(SUMMARY_FILE_NAME);
        fs::write(&summary_path, serde_json::to_string_pretty(summary)?)?;

        let mut bundles_written = 0;
        if self.write_bundles {
            for files in export::bundles(run)? {
                Self::write_bundle(dir, &files)?;
                bundles_written += 1;
            }
        }

        info!(
            dir = %dir.display(),
            strategy = %run.strategy,
            sessions = run.results.len(),
            bundles = bundles_written,
            "Archived batch"
        );

        Ok(ArchiveReport {
            dir: dir.to_path_buf(),
            csv_path,
            summary_path,
            bundles_written,
        })
    }

    /// CSV, summary and (optionally) bundles directly under the root.
    pub fn write_run(
        &self,
        run: &BatchRun,
        summary: &BatchSummary,
    ) -> Result<ArchiveReport, BatchError> {
        self.write_run_to(&self.root, run, summary)
    }

    /// One subdirectory per strategy plus `comparison.json` at the root.
    pub fn write_comparison(
        &self,
        comparison: &StrategyComparison,
        runs: &[BatchRun],
    ) -> Result<Vec<ArchiveReport>, BatchError> {
        fs::create_dir_all(&self.root)?;
        fs::write(
            self.root.join(COMPARISON_FILE_NAME),
            serde_json::to_string_pretty(comparison)?,
        )?;

        runs.iter()
            .zip(&comparison.summaries)
            .map(|(run, summary)| {
                let dir = self.root.join(strategy_dir_name(&run.strategy));
                self.write_run_to(&dir, run, summary)
            })
            .collect()
    }
}

/// Strategy names can come from the command line; keep them to one safe path segment.
fn strategy_dir_name(strategy: &str) -> String {
    let cleaned: String = strategy
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "strategy".to_string()
    } else {
        cleaned
    }
}
