#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use layoffs_cleaner::{LayoffRecord, RecordDate};
use tempfile::{TempDir, tempdir};

pub const HEADER: &str = "company,location,industry,total_laid_off,percentage_laid_off,date,stage,country,funds_raised_millions";

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Writes a layoffs CSV with the canonical header followed by `rows`.
    pub fn write_layoffs(&self, name: &str, rows: &[&str]) -> PathBuf {
        let mut contents = String::from(HEADER);
        contents.push('\n');
        for row in rows {
            contents.push_str(row);
            contents.push('\n');
        }
        self.write(name, &contents)
    }
}

/// Record builder with neutral defaults for fields a test does not care about.
pub fn record(ordinal: usize, company: &str, location: &str) -> LayoffRecord {
    LayoffRecord {
        ordinal,
        company: company.to_string(),
        location: location.to_string(),
        industry: None,
        total_laid_off: None,
        percentage_laid_off: None,
        date: RecordDate::Text("1/1/2023".to_string()),
        stage: None,
        country: "United States".to_string(),
        funds_raised_millions: None,
    }
}
