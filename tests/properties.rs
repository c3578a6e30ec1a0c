use std::collections::HashSet;

use layoffs_cleaner::{
    LayoffRecord, RecordDate,
    rules::CleaningRules,
    stages::{backfill_industry, deduplicate, prune_unmeasured, standardize},
};
use proptest::prelude::*;

fn arb_record() -> impl Strategy<Value = LayoffRecord> {
    (
        prop::sample::select(vec!["Acme", " Acme", "Globex ", "Initech"]),
        prop::sample::select(vec!["Austin", "Oslo"]),
        prop::option::of(prop::sample::select(vec![
            "", "Crypto", "Crypto Currency", "CryptoFinance", "Retail", "  ",
        ])),
        prop::option::of(0i64..3),
        prop::option::of(prop::sample::select(vec!["0.1", "0.5"])),
        prop::sample::select(vec!["3/6/2023", "1/1/2022", "13/40/2023", "1/1/23", "2023-03-06", ""]),
        prop::sample::select(vec!["United States", "United States.", "Canada."]),
        prop::option::of(0i64..2),
    )
        .prop_map(
            |(company, location, industry, total, percentage, date, country, funds)| {
                LayoffRecord {
                    ordinal: 0,
                    company: company.to_string(),
                    location: location.to_string(),
                    industry: industry.map(str::to_string),
                    total_laid_off: total,
                    percentage_laid_off: percentage.map(str::to_string),
                    date: if date.is_empty() {
                        RecordDate::Missing
                    } else {
                        RecordDate::Text(date.to_string())
                    },
                    stage: None,
                    country: country.to_string(),
                    funds_raised_millions: funds,
                }
            },
        )
}

fn arb_records() -> impl Strategy<Value = Vec<LayoffRecord>> {
    prop::collection::vec(arb_record(), 0..40).prop_map(|mut records| {
        for (idx, record) in records.iter_mut().enumerate() {
            record.ordinal = idx + 1;
        }
        records
    })
}

proptest! {
    #[test]
    fn standardize_is_idempotent(records in arb_records()) {
        let rules = CleaningRules::default();
        let (once, _) = standardize(records, &rules);
        let (twice, outcome) = standardize(once.clone(), &rules);
        prop_assert_eq!(outcome.records_modified, 0);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn survivors_have_distinct_identity_keys(records in arb_records()) {
        let input_keys = records
            .iter()
            .map(|r| format!("{:?}", r.identity_key()))
            .collect::<HashSet<_>>();
        let (survivors, outcome) = deduplicate(records.clone());
        let mut seen = HashSet::new();
        for record in &survivors {
            prop_assert!(seen.insert(record.identity_key()));
        }
        prop_assert_eq!(survivors.len(), input_keys.len());
        prop_assert_eq!(survivors.len() + outcome.removed, records.len());
    }

    #[test]
    fn pruning_leaves_only_measured_rows(records in arb_records()) {
        let (survivors, outcome) = prune_unmeasured(records.clone());
        prop_assert!(survivors.iter().all(|r| r.total_laid_off.is_some() || r.percentage_laid_off.is_some()));
        let unmeasured = records.iter().filter(|r| !r.has_measurement()).count();
        prop_assert_eq!(outcome.removed, unmeasured);
    }

    #[test]
    fn backfilled_values_come_from_related_rows(records in arb_records()) {
        let (after, _) = backfill_industry(records.clone());
        for (before, after) in records.iter().zip(&after) {
            if before.industry_missing() && !after.industry_missing() {
                let assigned = after.industry.as_deref();
                let found = records.iter().any(|other| {
                    other.ordinal != before.ordinal
                        && other.company == before.company
                        && other.location == before.location
                        && !other.industry_missing()
                        && other.industry.as_deref() == assigned
                });
                prop_assert!(found, "row {} filled from an unrelated row", before.ordinal);
            } else {
                prop_assert_eq!(&before.industry, &after.industry);
            }
        }
    }

    #[test]
    fn canonical_industries_never_keep_a_crypto_suffix(records in arb_records()) {
        let (cleaned, _) = standardize(records, &CleaningRules::default());
        for record in cleaned {
            if let Some(industry) = record.industry.as_deref() {
                prop_assert!(!industry.starts_with("Crypto") || industry == "Crypto");
                prop_assert!(!industry.trim().is_empty());
            }
            prop_assert!(!record.company.starts_with(' ') && !record.company.ends_with(' '));
            prop_assert!(!record.country.ends_with('.') || !record.country.starts_with("United States"));
            prop_assert!(!matches!(record.date, RecordDate::Text(_)));
        }
    }
}
