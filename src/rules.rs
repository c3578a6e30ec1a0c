//! Cleaning rule set and its YAML persistence.
//!
//! [`CleaningRules::default()`] is the fixed rule set the cleaner ships with;
//! a YAML file may override any section. Missing sections fall back to the
//! defaults.

use std::{
    fmt::Write as _,
    fs::File,
    io::{Read, Write},
    path::Path,
};

use anyhow::{Context, Result, ensure};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndustryFamily {
    /// Case-sensitive prefix; any suffix is folded into the label.
    pub prefix: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountrySuffixRule {
    pub prefix: String,
    pub strip: char,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CleaningRules {
    pub null_tokens: Vec<String>,
    pub industry_families: Vec<IndustryFamily>,
    pub country_suffixes: Vec<CountrySuffixRule>,
    pub date_formats: Vec<String>,
}

impl Default for CleaningRules {
    fn default() -> Self {
        Self {
            null_tokens: vec!["NULL".to_string()],
            industry_families: vec![IndustryFamily {
                prefix: "Crypto".to_string(),
                label: "Crypto".to_string(),
            }],
            country_suffixes: vec![CountrySuffixRule {
                prefix: "United States".to_string(),
                strip: '.',
            }],
            date_formats: vec!["%m/%d/%Y".to_string(), "%Y-%m-%d".to_string()],
        }
    }
}

impl CleaningRules {
    pub fn load(path: &Path) -> Result<Self> {
        let mut file = File::open(path).with_context(|| format!("Opening rules file {path:?}"))?;
        let mut raw = String::new();
        file.read_to_string(&mut raw)
            .with_context(|| format!("Reading rules file {path:?}"))?;
        let rules = Self::from_yaml(&raw).with_context(|| format!("Parsing rules file {path:?}"))?;
        Ok(rules)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let rules: Self = if raw.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(raw).context("Parsing cleaning rules YAML")?
        };
        rules.validate()?;
        Ok(rules)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let serialized = self.to_yaml()?;
        let mut file =
            File::create(path).with_context(|| format!("Creating rules file {path:?}"))?;
        file.write_all(serialized.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for family in &self.industry_families {
            ensure!(
                !family.prefix.is_empty(),
                "Industry family prefix cannot be empty"
            );
            ensure!(
                !family.label.trim().is_empty(),
                "Industry family '{}' needs a non-empty label",
                family.prefix
            );
            // Canonicalization takes the first matching family, so the label must map to itself.
            let owner = self
                .industry_families
                .iter()
                .find(|other| family.label.starts_with(&other.prefix));
            ensure!(
                owner.is_none_or(|other| other.label == family.label),
                "Industry family label '{}' is captured by another family prefix",
                family.label
            );
        }
        for rule in &self.country_suffixes {
            ensure!(
                !rule.prefix.is_empty(),
                "Country suffix rule prefix cannot be empty"
            );
        }
        ensure!(
            !self.date_formats.is_empty(),
            "At least one date format is required"
        );
        let probe = NaiveDate::from_ymd_opt(2023, 3, 6).context("Building probe date")?;
        for format in &self.date_formats {
            let mut rendered = String::new();
            let formatted = write!(rendered, "{}", probe.format(format)).is_ok();
            ensure!(
                formatted && NaiveDate::parse_from_str(&rendered, format) == Ok(probe),
                "Date format '{format}' cannot represent a calendar date"
            );
        }
        Ok(())
    }
}
