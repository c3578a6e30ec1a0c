//! Cleaning stages applied by the pipeline driver.
//!
//! Every in-memory stage takes the working set by value and hands back the
//! next working set together with an outcome describing what it changed.

pub mod backfill;
pub mod dedup;
pub mod prune;
pub mod standardize;
pub mod text;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use backfill::{AmbiguousBackfill, BackfillOutcome, backfill_industry};
pub use dedup::{DedupOutcome, deduplicate};
pub use prune::{PruneOutcome, prune_unmeasured};
pub use standardize::{InvalidDate, StandardizeOutcome, standardize, standardize_record};

/// Upper bound on diagnostic samples kept per condition.
pub const MAX_SAMPLES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Load,
    Deduplicate,
    Standardize,
    Backfill,
    Prune,
    Emit,
}

impl Stage {
    pub const ORDER: [Stage; 6] = [
        Stage::Load,
        Stage::Deduplicate,
        Stage::Standardize,
        Stage::Backfill,
        Stage::Prune,
        Stage::Emit,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Load => "load",
            Stage::Deduplicate => "deduplicate",
            Stage::Standardize => "standardize",
            Stage::Backfill => "backfill",
            Stage::Prune => "prune",
            Stage::Emit => "emit",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
