//! The layoff record model and its CSV cell conversions.
//!
//! A [`LayoffRecord`] holds the nine persisted columns of the dataset plus a
//! load ordinal. The ordinal is the 1-based position of the row in the source
//! and only ever serves as a tie-break or a row reference in diagnostics.

use std::fmt;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const OUTPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Persisted column names in canonical output order.
pub const COLUMNS: [&str; 9] = [
    "company",
    "location",
    "industry",
    "total_laid_off",
    "percentage_laid_off",
    "date",
    "stage",
    "country",
    "funds_raised_millions",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordDate {
    /// Raw text as loaded, before standardization.
    Text(String),
    Date(NaiveDate),
    Missing,
}

impl RecordDate {
    pub fn to_cell(&self) -> String {
        match self {
            RecordDate::Text(text) => text.clone(),
            RecordDate::Date(date) => date.format(OUTPUT_DATE_FORMAT).to_string(),
            RecordDate::Missing => String::new(),
        }
    }
}

impl fmt::Display for RecordDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_cell())
    }
}

/// Null tokens match case-insensitively after trimming.
pub fn is_null_token(value: &str, tokens: &[String]) -> bool {
    let trimmed = value.trim();
    tokens.iter().any(|token| token.eq_ignore_ascii_case(trimmed))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoffRecord {
    pub ordinal: usize,
    pub company: String,
    pub location: String,
    pub industry: Option<String>,
    pub total_laid_off: Option<i64>,
    pub percentage_laid_off: Option<String>,
    pub date: RecordDate,
    pub stage: Option<String>,
    pub country: String,
    pub funds_raised_millions: Option<i64>,
}

/// The nine identifying fields by reference. Two records are duplicates when
/// their keys compare equal; absent values compare equal to each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey<'a> {
    company: &'a str,
    location: &'a str,
    industry: Option<&'a str>,
    total_laid_off: Option<i64>,
    percentage_laid_off: Option<&'a str>,
    date: &'a RecordDate,
    stage: Option<&'a str>,
    country: &'a str,
    funds_raised_millions: Option<i64>,
}

impl LayoffRecord {
    pub fn identity_key(&self) -> IdentityKey<'_> {
        IdentityKey {
            company: &self.company,
            location: &self.location,
            industry: self.industry.as_deref(),
            total_laid_off: self.total_laid_off,
            percentage_laid_off: self.percentage_laid_off.as_deref(),
            date: &self.date,
            stage: self.stage.as_deref(),
            country: &self.country,
            funds_raised_millions: self.funds_raised_millions,
        }
    }

    /// Missing means absent or blank.
    pub fn industry_missing(&self) -> bool {
        self.industry
            .as_deref()
            .is_none_or(|value| value.trim().is_empty())
    }

    pub fn has_measurement(&self) -> bool {
        self.total_laid_off.is_some() || self.percentage_laid_off.is_some()
    }

    /// Builds a record from cells already arranged in [`COLUMNS`] order.
    pub fn from_cells(ordinal: usize, cells: &[&str], null_tokens: &[String]) -> Result<Self> {
        if cells.len() != COLUMNS.len() {
            return Err(anyhow!(
                "Expected {} cells but found {}",
                COLUMNS.len(),
                cells.len()
            ));
        }
        let is_null = |value: &str| is_null_token(value, null_tokens);
        let optional = |value: &str| {
            let trimmed = value.trim();
            if trimmed.is_empty() || is_null(trimmed) {
                None
            } else {
                Some(trimmed.to_string())
            }
        };
        let integer = |idx: usize| -> Result<Option<i64>> {
            let value = cells[idx];
            if value.trim().is_empty() || is_null(value) {
                return Ok(None);
            }
            let parsed = value
                .trim()
                .parse::<i64>()
                .with_context(|| format!("Failed to parse '{value}' as integer"))
                .with_context(|| format!("Row {} column '{}'", ordinal + 1, COLUMNS[idx]))?;
            Ok(Some(parsed))
        };
        // A blank industry stays blank so backfill can tell it apart from a null token.
        let industry = if is_null(cells[2]) {
            None
        } else {
            Some(cells[2].to_string())
        };
        let date = match optional(cells[5]) {
            Some(text) => RecordDate::Text(text),
            None => RecordDate::Missing,
        };

        Ok(Self {
            ordinal,
            company: cells[0].to_string(),
            location: cells[1].to_string(),
            industry,
            total_laid_off: integer(3)?,
            percentage_laid_off: optional(cells[4]),
            date,
            stage: optional(cells[6]),
            country: cells[7].to_string(),
            funds_raised_millions: integer(8)?,
        })
    }

    /// Cells in [`COLUMNS`] order, with absent values rendered empty.
    pub fn to_cells(&self) -> Vec<String> {
        vec![
            self.company.clone(),
            self.location.clone(),
            self.industry.clone().unwrap_or_default(),
            self.total_laid_off.map(|v| v.to_string()).unwrap_or_default(),
            self.percentage_laid_off.clone().unwrap_or_default(),
            self.date.to_cell(),
            self.stage.clone().unwrap_or_default(),
            self.country.clone(),
            self.funds_raised_millions
                .map(|v| v.to_string())
                .unwrap_or_default(),
        ]
    }
}
