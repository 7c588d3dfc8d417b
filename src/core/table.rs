use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::types::{BucketField, ScenarioRecord};
use crate::error::CompassError;

#[derive(Debug, Clone, Default)]
pub struct ScenarioTable {
    records: Vec<ScenarioRecord>,
    columns: BTreeSet<BucketField>,
}

impl ScenarioTable {
    pub fn new(records: Vec<ScenarioRecord>) -> Self {
        let columns = BucketField::ALL
            .iter()
            .copied()
            .filter(|field| records.iter().any(|r| r.bucket(*field).is_some()))
            .collect();
        Self { records, columns }
    }

    pub fn records(&self) -> &[ScenarioRecord] {
        &self.records
    }

    pub fn get(&self, position: usize) -> Option<&ScenarioRecord> {
        self.records.get(position)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, field: BucketField) -> bool {
        self.columns.contains(&field)
    }

    pub fn columns(&self) -> &BTreeSet<BucketField> {
        &self.columns
    }
}

pub trait TableSource: Send + Sync {
    fn describe(&self) -> String;
    fn load(&self) -> Result<Vec<ScenarioRecord>, CompassError>;
}

#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableSource for JsonFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Vec<ScenarioRecord>, CompassError> {
        let raw = fs::read_to_string(&self.path).map_err(|e| {
            CompassError::data_unavailable(format!("failed to read {}: {e}", self.path.display()))
        })?;
        let line_delimited = matches!(
            self.path.extension().and_then(|ext| ext.to_str()),
            Some("jsonl") | Some("ndjson")
        );
        parse_records(&raw, line_delimited)
            .map_err(|e| CompassError::data_unavailable(format!("{}: {e}", self.path.display())))
    }
}

/// Input starting with `[` is one JSON array unless `line_delimited` is set.
pub fn parse_records(raw: &str, line_delimited: bool) -> Result<Vec<ScenarioRecord>, String> {
    let trimmed = raw.trim_start();
    if !line_delimited && trimmed.starts_with('[') {
        return serde_json::from_str::<Vec<ScenarioRecord>>(trimmed)
            .map_err(|e| format!("invalid scenario array: {e}"));
    }

    let mut records = Vec::new();
    for (line_no, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record = serde_json::from_str::<ScenarioRecord>(line)
            .map_err(|e| format!("invalid scenario on line {}: {e}", line_no + 1))?;
        records.push(record);
    }
    Ok(records)
}
