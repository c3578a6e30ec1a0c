use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::stages::{BackfillOutcome, DedupOutcome, PruneOutcome, Stage, StandardizeOutcome};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: Stage,
    pub rows_in: usize,
    pub rows_out: usize,
    pub modified: usize,
}

/// Aggregate account of a cleaning run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanSummary {
    pub loaded: usize,
    pub emitted: usize,
    pub stages: Vec<StageReport>,
    pub deduplicate: DedupOutcome,
    pub standardize: StandardizeOutcome,
    pub backfill: BackfillOutcome,
    pub prune: PruneOutcome,
}

impl CleanSummary {
    pub fn record_stage(&mut self, stage: Stage, rows_in: usize, rows_out: usize, modified: usize) {
        self.stages.push(StageReport {
            stage,
            rows_in,
            rows_out,
            modified,
        });
    }

    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|report| report.stage == stage)
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Creating report file {path:?}"))?;
        serde_json::to_writer_pretty(file, self).context("Writing report JSON")
    }

    pub fn table_headers() -> Vec<String> {
        ["stage", "rows in", "rows out", "removed", "modified"]
            .map(String::from)
            .to_vec()
    }

    pub fn table_rows(&self) -> Vec<Vec<String>> {
        self.stages
            .iter()
            .map(|report| {
                vec![
                    report.stage.to_string(),
                    report.rows_in.to_string(),
                    report.rows_out.to_string(),
                    report.rows_in.saturating_sub(report.rows_out).to_string(),
                    report.modified.to_string(),
                ]
            })
            .collect()
    }

    pub fn log(&self) {
        for report in &self.stages {
            info!(
                "{:<12} {} -> {} row(s), {} modified",
                report.stage.name(),
                report.rows_in,
                report.rows_out,
                report.modified
            );
        }
        if self.standardize.invalid_dates > 0 {
            info!(
                "{} row(s) had dates matching no known format",
                self.standardize.invalid_dates
            );
        }
        if self.backfill.ambiguous > 0 {
            info!(
                "{} industry backfill(s) chose among conflicting candidates",
                self.backfill.ambiguous
            );
        }
        info!(
            "Cleaned {} loaded row(s) down to {} emitted row(s)",
            self.loaded, self.emitted
        );
    }
}
