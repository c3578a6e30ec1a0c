//! Storage substrates the pipeline reads from and writes to.
//!
//! The pipeline only needs two operations, [`RecordStore::load_all`] and
//! [`RecordStore::persist_all`]. [`CsvStore`] backs them with a delimited file
//! (or stdin/stdout via `-`); [`MemoryStore`] keeps records in a `Vec`.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};
use log::{debug, info};
use tempfile::NamedTempFile;

use crate::{
    io_utils,
    record::{COLUMNS, LayoffRecord},
    rules::CleaningRules,
};

pub trait RecordStore {
    fn load_all(&mut self) -> Result<Vec<LayoffRecord>>;
    fn persist_all(&mut self, records: &[LayoffRecord]) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<LayoffRecord>,
}

impl MemoryStore {
    pub fn new(records: Vec<LayoffRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[LayoffRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<LayoffRecord> {
        self.records
    }
}

impl RecordStore for MemoryStore {
    fn load_all(&mut self) -> Result<Vec<LayoffRecord>> {
        Ok(self.records.clone())
    }

    fn persist_all(&mut self, records: &[LayoffRecord]) -> Result<()> {
        self.records = records.to_vec();
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
    delimiter: Option<u8>,
    output_delimiter: Option<u8>,
    encoding: &'static Encoding,
    null_tokens: Vec<String>,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: None,
            output_delimiter: None,
            encoding: UTF_8,
            null_tokens: CleaningRules::default().null_tokens,
        }
    }

    pub fn with_delimiter(mut self, delimiter: Option<u8>) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_output_delimiter(mut self, delimiter: Option<u8>) -> Self {
        self.output_delimiter = delimiter;
        self
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_null_tokens(mut self, tokens: &[String]) -> Self {
        self.null_tokens = tokens.to_vec();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_to<W: Write>(&self, inner: W, records: &[LayoffRecord]) -> Result<W> {
        let input_delimiter = io_utils::resolve_input_delimiter(&self.path, self.delimiter);
        let delimiter = io_utils::resolve_output_delimiter(
            Some(self.path.as_path()),
            self.output_delimiter,
            input_delimiter,
        );
        let mut writer = io_utils::csv_writer(inner, delimiter);
        writer
            .write_record(COLUMNS)
            .context("Writing output headers")?;
        for (idx, record) in records.iter().enumerate() {
            writer
                .write_record(record.to_cells())
                .with_context(|| format!("Writing output row {}", idx + 2))?;
        }
        writer.flush().context("Flushing output")?;
        writer
            .into_inner()
            .map_err(|err| anyhow!("Finishing output: {}", err.error()))
    }
}

impl RecordStore for CsvStore {
    fn load_all(&mut self) -> Result<Vec<LayoffRecord>> {
        let delimiter = io_utils::resolve_input_delimiter(&self.path, self.delimiter);
        info!(
            "Loading '{}' with delimiter '{}'",
            self.path.display(),
            io_utils::printable_delimiter(delimiter)
        );
        let mut reader = io_utils::open_csv_reader_from_path(&self.path, delimiter)?;
        let headers = io_utils::reader_headers(&mut reader, self.encoding)
            .with_context(|| format!("Reading headers from {:?}", self.path))?;
        let positions = locate_columns(&headers)?;
        debug!("Column positions: {:?}", positions);

        let mut records = Vec::new();
        for (idx, record) in reader.byte_records().enumerate() {
            let record = record.with_context(|| format!("Reading row {}", idx + 2))?;
            let decoded = io_utils::decode_record(&record, self.encoding)
                .with_context(|| format!("Decoding row {}", idx + 2))?;
            let cells = positions
                .iter()
                .map(|&pos| decoded.get(pos).map(String::as_str).unwrap_or(""))
                .collect::<Vec<_>>();
            records.push(LayoffRecord::from_cells(idx + 1, &cells, &self.null_tokens)?);
        }
        info!("Loaded {} row(s) from {:?}", records.len(), self.path);
        Ok(records)
    }

    fn persist_all(&mut self, records: &[LayoffRecord]) -> Result<()> {
        if io_utils::is_dash(&self.path) {
            let stdout = self.write_to(std::io::stdout().lock(), records)?;
            drop(stdout);
            return Ok(());
        }
        let directory = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let staging = NamedTempFile::new_in(&directory)
            .with_context(|| format!("Creating staging file in {directory:?}"))?;
        let staging = self.write_to(staging, records)?;
        staging
            .persist(&self.path)
            .map_err(|err| err.error)
            .with_context(|| format!("Replacing output file {:?}", self.path))?;
        info!("Wrote {} row(s) to {:?}", records.len(), self.path);
        Ok(())
    }
}

/// Maps each canonical column to its position in the header row.
fn locate_columns(headers: &[String]) -> Result<Vec<usize>> {
    let normalized = headers
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_ascii_lowercase())
        .collect::<Vec<_>>();
    let mut missing = Vec::new();
    let mut positions = Vec::with_capacity(COLUMNS.len());
    for column in COLUMNS {
        match normalized.iter().position(|h| h == column) {
            Some(pos) => positions.push(pos),
            None => missing.push(column),
        }
    }
    if !missing.is_empty() {
        return Err(anyhow!(
            "Missing required column(s): {}",
            missing.join(", ")
        ));
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use tempfile::tempdir;

    use crate::record::RecordDate;

    const HEADER: &str = "company,location,industry,total_laid_off,percentage_laid_off,date,stage,country,funds_raised_millions";

    #[test]
    fn locate_columns_tolerates_order_case_and_bom() {
        let headers = [
            "\u{feff}Country", "company", "LOCATION", "industry", "date", "stage",
            "total_laid_off", "percentage_laid_off", "funds_raised_millions", "extra",
        ]
        .map(String::from);
        let positions = locate_columns(&headers).unwrap();
        assert_eq!(positions, vec![1, 2, 3, 6, 7, 4, 5, 0, 8]);
    }

    #[test]
    fn locate_columns_lists_every_missing_column() {
        let headers = ["company", "location"].map(String::from);
        let err = locate_columns(&headers).unwrap_err().to_string();
        assert!(err.contains("industry"));
        assert!(err.contains("funds_raised_millions"));
    }

    #[test]
    fn csv_store_loads_and_persists() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("layoffs.csv");
        fs::write(
            &input,
            format!("{HEADER}\nAcme,SF,Retail,10,NULL,3/6/2023,Seed,United States,NULL\n"),
        )
        .unwrap();
        let tokens = vec!["NULL".to_string()];
        let mut source = CsvStore::new(&input).with_null_tokens(&tokens);
        let mut records = source.load_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ordinal, 1);
        assert_eq!(records[0].percentage_laid_off, None);

        records[0].date = RecordDate::Missing;
        let output = dir.path().join("clean.csv");
        CsvStore::new(&output).persist_all(&records).unwrap();
        let written = fs::read_to_string(&output).unwrap();
        assert_eq!(
            written,
            format!("{HEADER}\nAcme,SF,Retail,10,,,Seed,United States,\n")
        );
    }

    #[test]
    fn csv_store_maps_default_null_tokens() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("layoffs.csv");
        fs::write(
            &input,
            format!("{HEADER}\nAcme,SF,NULL,NULL,0.5,NULL,NULL,Norway,NULL\n"),
        )
        .unwrap();
        let records = CsvStore::new(&input).load_all().unwrap();
        assert_eq!(records[0].total_laid_off, None);
        assert_eq!(records[0].industry, None);
        assert_eq!(records[0].funds_raised_millions, None);
        assert_eq!(records[0].date, RecordDate::Missing);

        let custom = vec!["N/A".to_string()];
        let err = CsvStore::new(&input)
            .with_null_tokens(&custom)
            .load_all()
            .unwrap_err();
        assert!(format!("{err:#}").contains("total_laid_off"), "{err:#}");
    }

    #[test]
    fn memory_store_replaces_contents() {
        let mut store = MemoryStore::default();
        assert!(store.load_all().unwrap().is_empty());
        let dir = tempdir().unwrap();
        let input = dir.path().join("one.csv");
        fs::write(&input, format!("{HEADER}\nA,B,,1,,,,C,\n")).unwrap();
        let records = CsvStore::new(&input).load_all().unwrap();
        store.persist_all(&records).unwrap();
        assert_eq!(store.records(), records.as_slice());
    }
}
