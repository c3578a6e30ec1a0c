//! Per-field normalization rules.
//!
//! Every rule is idempotent: a second pass over standardized records changes
//! nothing and reports all-zero counts. Dates that match none of the configured
//! formats become [`RecordDate::Missing`] and are reported, never fatal.

use chrono::{Datelike, NaiveDate};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::{MAX_SAMPLES, text};
use crate::{
    record::{LayoffRecord, RecordDate},
    rules::CleaningRules,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidDate {
    pub ordinal: usize,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardizeOutcome {
    pub records_modified: usize,
    pub company_trimmed: usize,
    pub industry_canonicalized: usize,
    pub industry_blank_cleared: usize,
    pub country_stripped: usize,
    pub dates_parsed: usize,
    pub invalid_dates: usize,
    pub invalid_date_samples: Vec<InvalidDate>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordChanges {
    pub company_trimmed: bool,
    pub industry_canonicalized: bool,
    pub industry_blank_cleared: bool,
    pub country_stripped: bool,
    pub date_parsed: bool,
    pub date_invalid: bool,
}

impl RecordChanges {
    pub fn any(&self) -> bool {
        self.company_trimmed
            || self.industry_canonicalized
            || self.industry_blank_cleared
            || self.country_stripped
            || self.date_parsed
            || self.date_invalid
    }
}

pub fn standardize(
    mut records: Vec<LayoffRecord>,
    rules: &CleaningRules,
) -> (Vec<LayoffRecord>, StandardizeOutcome) {
    let mut outcome = StandardizeOutcome::default();
    for record in &mut records {
        let raw_date = record.date.to_cell();
        let changes = standardize_record(record, rules);
        outcome.records_modified += usize::from(changes.any());
        outcome.company_trimmed += usize::from(changes.company_trimmed);
        outcome.industry_canonicalized += usize::from(changes.industry_canonicalized);
        outcome.industry_blank_cleared += usize::from(changes.industry_blank_cleared);
        outcome.country_stripped += usize::from(changes.country_stripped);
        outcome.dates_parsed += usize::from(changes.date_parsed);
        if changes.date_invalid {
            warn!(
                "Row {} has unparseable date '{}'; leaving it empty",
                record.ordinal + 1,
                raw_date
            );
            outcome.invalid_dates += 1;
            if outcome.invalid_date_samples.len() < MAX_SAMPLES {
                outcome.invalid_date_samples.push(InvalidDate {
                    ordinal: record.ordinal,
                    value: raw_date,
                });
            }
        }
    }
    info!(
        "Standardization trimmed {} company name(s), canonicalized {} industry value(s), stripped {} country value(s), parsed {} date(s), rejected {} date(s)",
        outcome.company_trimmed,
        outcome.industry_canonicalized,
        outcome.country_stripped,
        outcome.dates_parsed,
        outcome.invalid_dates
    );
    (records, outcome)
}

pub fn standardize_record(record: &mut LayoffRecord, rules: &CleaningRules) -> RecordChanges {
    let mut changes = RecordChanges::default();

    let company = text::trim(&record.company);
    if company != record.company {
        record.company = company.to_string();
        changes.company_trimmed = true;
    }

    if let Some(industry) = record.industry.as_deref() {
        if industry.trim().is_empty() {
            record.industry = None;
            changes.industry_blank_cleared = true;
        } else if let Some(label) = canonical_industry(industry, rules)
            && label != industry
        {
            record.industry = Some(label.to_string());
            changes.industry_canonicalized = true;
        }
    }

    for rule in &rules.country_suffixes {
        let stripped = text::strip_trailing_when(&record.country, &rule.prefix, rule.strip);
        if stripped != record.country {
            record.country = stripped.to_string();
            changes.country_stripped = true;
        }
    }

    if let RecordDate::Text(raw) = &record.date {
        match parse_date(raw, &rules.date_formats) {
            Some(date) => {
                record.date = RecordDate::Date(date);
                changes.date_parsed = true;
            }
            None => {
                record.date = RecordDate::Missing;
                changes.date_invalid = true;
            }
        }
    }

    changes
}

fn canonical_industry<'a>(industry: &'a str, rules: &'a CleaningRules) -> Option<&'a str> {
    rules
        .industry_families
        .iter()
        .find(|family| industry.starts_with(&family.prefix))
        .map(|family| text::fold_prefix(industry, &family.prefix, &family.label))
}

/// Parses `value` with the first matching format. The year must be written
/// with four digits; `1/1/23` is rejected rather than read as year 23.
pub fn parse_date(value: &str, formats: &[String]) -> Option<NaiveDate> {
    let trimmed = value.trim();
    formats.iter().find_map(|format| {
        NaiveDate::parse_from_str(trimmed, format)
            .ok()
            .filter(|date| spells_full_year(trimmed, *date))
    })
}

fn spells_full_year(value: &str, date: NaiveDate) -> bool {
    let year = format!("{:04}", date.year());
    value
        .split(|ch: char| !ch.is_ascii_digit())
        .any(|run| run == year)
}
