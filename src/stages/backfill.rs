//! Industry backfill from records sharing company and location.
//!
//! Candidates come from a snapshot taken before any record is filled, so a
//! value assigned during this stage never feeds another fill. When several
//! candidates exist the one with the lowest ordinal wins; disagreeing
//! candidates are reported as ambiguous.

use std::collections::HashMap;

use itertools::Itertools;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::MAX_SAMPLES;
use crate::record::LayoffRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbiguousBackfill {
    pub company: String,
    pub location: String,
    pub chosen: String,
    pub candidates: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillOutcome {
    pub filled: usize,
    /// Records still missing an industry after the stage.
    pub unfilled: usize,
    /// Filled records whose candidates disagreed.
    pub ambiguous: usize,
    pub ambiguous_samples: Vec<AmbiguousBackfill>,
}

struct Candidates {
    chosen: String,
    distinct: Vec<String>,
}

pub fn backfill_industry(mut records: Vec<LayoffRecord>) -> (Vec<LayoffRecord>, BackfillOutcome) {
    let candidates = collect_candidates(&records);
    let mut outcome = BackfillOutcome::default();

    for record in records.iter_mut().filter(|r| r.industry_missing()) {
        let key = (record.company.clone(), record.location.clone());
        let Some(found) = candidates.get(&key) else {
            outcome.unfilled += 1;
            continue;
        };
        debug!(
            "Row {} industry filled with '{}' from {} / {}",
            record.ordinal + 1,
            found.chosen,
            record.company,
            record.location
        );
        record.industry = Some(found.chosen.clone());
        outcome.filled += 1;
        if found.distinct.len() > 1 {
            outcome.ambiguous += 1;
            warn!(
                "Row {} backfill for {} / {} picked '{}' among {:?}",
                record.ordinal + 1,
                record.company,
                record.location,
                found.chosen,
                found.distinct
            );
            let seen = outcome
                .ambiguous_samples
                .iter()
                .any(|s| s.company == key.0 && s.location == key.1);
            if !seen && outcome.ambiguous_samples.len() < MAX_SAMPLES {
                outcome.ambiguous_samples.push(AmbiguousBackfill {
                    company: key.0,
                    location: key.1,
                    chosen: found.chosen.clone(),
                    candidates: found.distinct.clone(),
                });
            }
        }
    }

    info!(
        "Backfill filled {} industry value(s), {} ambiguous, {} left empty",
        outcome.filled, outcome.ambiguous, outcome.unfilled
    );
    (records, outcome)
}

fn collect_candidates(records: &[LayoffRecord]) -> HashMap<(String, String), Candidates> {
    records
        .iter()
        .filter(|record| !record.industry_missing())
        .sorted_by_key(|record| record.ordinal)
        .into_group_map_by(|record| (record.company.clone(), record.location.clone()))
        .into_iter()
        .filter_map(|(key, group)| {
            let distinct = group
                .iter()
                .filter_map(|record| record.industry.clone())
                .unique()
                .collect_vec();
            let chosen = distinct.first()?.clone();
            Some((key, Candidates { chosen, distinct }))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordDate;

    fn record(ordinal: usize, company: &str, location: &str, industry: Option<&str>) -> LayoffRecord {
        LayoffRecord {
            ordinal,
            company: company.to_string(),
            location: location.to_string(),
            industry: industry.map(str::to_string),
            total_laid_off: Some(1),
            percentage_laid_off: None,
            date: RecordDate::Missing,
            stage: None,
            country: "United States".to_string(),
            funds_raised_millions: None,
        }
    }

    #[test]
    fn fills_from_matching_company_and_location() {
        let (records, outcome) = backfill_industry(vec![
            record(1, "Airbnb", "SF Bay Area", None),
            record(2, "Airbnb", "SF Bay Area", Some("Travel")),
            record(3, "Airbnb", "Seattle", Some("")),
        ]);
        assert_eq!(records[0].industry.as_deref(), Some("Travel"));
        assert_eq!(records[2].industry.as_deref(), Some(""));
        assert_eq!(outcome.filled, 1);
        assert_eq!(outcome.unfilled, 1);
        assert_eq!(outcome.ambiguous, 0);
    }

    #[test]
    fn lowest_ordinal_wins_and_conflict_is_reported() {
        let (records, outcome) = backfill_industry(vec![
            record(5, "Juul", "SF Bay Area", Some("Consumer")),
            record(1, "Juul", "SF Bay Area", None),
            record(2, "Juul", "SF Bay Area", Some("Retail")),
        ]);
        assert_eq!(records[1].industry.as_deref(), Some("Retail"));
        assert_eq!(outcome.ambiguous, 1);
        assert_eq!(
            outcome.ambiguous_samples[0].candidates,
            vec!["Retail".to_string(), "Consumer".to_string()]
        );
    }

    #[test]
    fn filled_values_do_not_chain() {
        let (records, outcome) = backfill_industry(vec![
            record(1, "Carvana", "Phoenix", None),
            record(2, "Carvana", "Phoenix", None),
        ]);
        assert!(records.iter().all(|r| r.industry.is_none()));
        assert_eq!(outcome.unfilled, 2);
    }

    #[test]
    fn location_must_match() {
        let (records, _) = backfill_industry(vec![
            record(1, "Bally's", "Providence", Some("Consumer")),
            record(2, "Bally's", "Las Vegas", None),
        ]);
        assert_eq!(records[1].industry, None);
    }
}
