use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::record::LayoffRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruneOutcome {
    pub removed: usize,
}

/// Drops records where neither `total_laid_off` nor `percentage_laid_off` is present.
pub fn prune_unmeasured(mut records: Vec<LayoffRecord>) -> (Vec<LayoffRecord>, PruneOutcome) {
    let before = records.len();
    records.retain(|record| {
        let keep = record.has_measurement();
        if !keep {
            debug!("Pruning row {} without measurements", record.ordinal + 1);
        }
        keep
    });
    let outcome = PruneOutcome {
        removed: before - records.len(),
    };
    info!(
        "Pruned {} row(s) without layoff measurements, {} remaining",
        outcome.removed,
        records.len()
    );
    (records, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordDate;

    fn record(ordinal: usize, total: Option<i64>, percentage: Option<&str>) -> LayoffRecord {
        LayoffRecord {
            ordinal,
            company: "Acme".to_string(),
            location: "Austin".to_string(),
            industry: None,
            total_laid_off: total,
            percentage_laid_off: percentage.map(str::to_string),
            date: RecordDate::Missing,
            stage: None,
            country: "United States".to_string(),
            funds_raised_millions: Some(40),
        }
    }

    #[test]
    fn removes_only_rows_missing_both_measurements() {
        let (records, outcome) = prune_unmeasured(vec![
            record(1, Some(10), None),
            record(2, None, Some("0.25")),
            record(3, None, None),
            record(4, Some(0), Some("0")),
        ]);
        let ordinals: Vec<usize> = records.iter().map(|r| r.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 4]);
        assert_eq!(outcome.removed, 1);
    }
}
