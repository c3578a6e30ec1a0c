//! Duplicate detection over the nine-field identity key.
//!
//! Records are grouped by [`LayoffRecord::identity_key`]. Within a group the
//! record with the lowest ordinal is the representative; input position breaks
//! ties between equal ordinals. Survivors keep their relative order.

use std::collections::HashMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::record::LayoffRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupOutcome {
    /// Groups with more than one member.
    pub duplicate_groups: usize,
    pub removed: usize,
}

pub fn deduplicate(records: Vec<LayoffRecord>) -> (Vec<LayoffRecord>, DedupOutcome) {
    let keep = representative_mask(&records);
    let mut outcome = DedupOutcome::default();
    let mut group_sizes: HashMap<_, usize> = HashMap::new();
    for record in &records {
        *group_sizes.entry(record.identity_key()).or_insert(0) += 1;
    }
    outcome.duplicate_groups = group_sizes.values().filter(|size| **size > 1).count();
    drop(group_sizes);

    let survivors: Vec<LayoffRecord> = records
        .into_iter()
        .zip(keep)
        .filter_map(|(record, keep)| {
            if keep {
                Some(record)
            } else {
                debug!("Dropping duplicate of row {}", record.ordinal + 1);
                outcome.removed += 1;
                None
            }
        })
        .collect();

    info!(
        "Deduplication collapsed {} group(s), removed {} row(s), {} remaining",
        outcome.duplicate_groups,
        outcome.removed,
        survivors.len()
    );
    (survivors, outcome)
}

fn representative_mask(records: &[LayoffRecord]) -> Vec<bool> {
    let mut representatives: HashMap<_, usize> = HashMap::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        representatives
            .entry(record.identity_key())
            .and_modify(|current: &mut usize| {
                if record.ordinal < records[*current].ordinal {
                    *current = idx;
                }
            })
            .or_insert(idx);
    }
    let mut keep = vec![false; records.len()];
    for idx in representatives.into_values() {
        keep[idx] = true;
    }
    keep
}
