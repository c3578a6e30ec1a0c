//! The batch cleaning driver.
//!
//! [`Pipeline::run`] executes load, deduplicate, standardize, backfill, prune
//! and emit exactly once, in that order. The working set moves from stage to
//! stage by value; the destination is only touched by the emit stage, so a
//! failure anywhere earlier leaves it as it was.

use anyhow::Context;
use log::info;

use crate::{
    error::PipelineError,
    record::LayoffRecord,
    rules::CleaningRules,
    stages::{self, Stage},
    store::RecordStore,
    summary::CleanSummary,
};

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    rules: CleaningRules,
}

impl Pipeline {
    pub fn new(rules: CleaningRules) -> Self {
        Self { rules }
    }

    pub fn run(
        &self,
        source: &mut dyn RecordStore,
        destination: &mut dyn RecordStore,
    ) -> Result<CleanSummary, PipelineError> {
        info!("Stage {}: reading source", Stage::Load);
        let records = source
            .load_all()
            .context("Loading source records")
            .map_err(|err| PipelineError::Stage {
                stage: Stage::Load,
                source: err,
            })?;

        let (cleaned, mut summary) = self.clean(records);

        info!("Stage {}: writing {} row(s)", Stage::Emit, cleaned.len());
        destination
            .persist_all(&cleaned)
            .context("Persisting cleaned records")
            .map_err(|err| PipelineError::Stage {
                stage: Stage::Emit,
                source: err,
            })?;
        summary.record_stage(Stage::Emit, cleaned.len(), cleaned.len(), 0);
        summary.emitted = cleaned.len();
        Ok(summary)
    }

    /// Runs the in-memory stages over an already loaded set.
    pub fn clean(&self, records: Vec<LayoffRecord>) -> (Vec<LayoffRecord>, CleanSummary) {
        let mut summary = CleanSummary {
            loaded: records.len(),
            ..CleanSummary::default()
        };
        summary.record_stage(Stage::Load, records.len(), records.len(), 0);

        let rows_in = records.len();
        let (records, dedup) = stages::deduplicate(records);
        summary.record_stage(Stage::Deduplicate, rows_in, records.len(), 0);
        summary.deduplicate = dedup;

        let rows_in = records.len();
        let (records, standardize) = stages::standardize(records, &self.rules);
        summary.record_stage(
            Stage::Standardize,
            rows_in,
            records.len(),
            standardize.records_modified,
        );
        summary.standardize = standardize;

        let rows_in = records.len();
        let (records, backfill) = stages::backfill_industry(records);
        summary.record_stage(Stage::Backfill, rows_in, records.len(), backfill.filled);
        summary.backfill = backfill;

        let rows_in = records.len();
        let (records, prune) = stages::prune_unmeasured(records);
        summary.record_stage(Stage::Prune, rows_in, records.len(), 0);
        summary.prune = prune;

        summary.emitted = records.len();
        (records, summary)
    }
}
