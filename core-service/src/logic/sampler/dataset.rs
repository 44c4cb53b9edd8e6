//! Historical Flow Dataset
//!
//! Loaded once at startup; read-only afterwards.
//! Formats: CSV (header row, unquoted cells) or JSONL (one object per line).

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::constants::LABEL_COLUMN;
use crate::logic::error::SamplingError;
use crate::logic::features::{FieldValue, FlowRecord};

// ============================================================================
// DATASET
// ============================================================================

pub struct FlowDataset {
    records: Vec<FlowRecord>,
    /// label → record indices
    by_label: HashMap<String, Vec<usize>>,
}

impl FlowDataset {
    /// Build from in-memory records (label column required on every record)
    pub fn from_records(records: Vec<FlowRecord>) -> Result<Self, SamplingError> {
        if records.is_empty() {
            return Err(SamplingError::EmptyDataset);
        }

        let mut by_label: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, record) in records.iter().enumerate() {
            let label = record
                .text(LABEL_COLUMN)
                .ok_or_else(|| SamplingError::MissingLabelColumn(LABEL_COLUMN.to_string()))?;
            by_label.entry(label).or_default().push(i);
        }

        Ok(Self { records, by_label })
    }

    /// Load from disk; format picked by extension (`.jsonl`/`.json` or CSV)
    pub fn load(path: &Path) -> Result<Self, SamplingError> {
        log::info!("Loading flow dataset from: {:?}", path);

        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let is_jsonl = path
            .extension()
            .map_or(false, |e| e == "jsonl" || e == "json");

        let records = if is_jsonl {
            read_jsonl(reader)?
        } else {
            read_csv(reader)?
        };

        let dataset = Self::from_records(records)?;

        let mut counts: Vec<(&str, usize)> = dataset.label_counts();
        counts.sort();
        log::info!("Loaded {} flow records: {:?}", dataset.len(), counts);

        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FlowRecord> {
        self.records.get(index)
    }

    /// Record indices carrying `label` (empty slice if none)
    pub fn indices(&self, label: &str) -> &[usize] {
        self.by_label.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn label_counts(&self) -> Vec<(&str, usize)> {
        self.by_label
            .iter()
            .map(|(label, idx)| (label.as_str(), idx.len()))
            .collect()
    }
}

// ============================================================================
// READERS
// ============================================================================

fn read_jsonl<R: BufRead>(reader: R) -> Result<Vec<FlowRecord>, SamplingError> {
    let mut records = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: FlowRecord = serde_json::from_str(&line).map_err(|e| {
            SamplingError::DatasetParse { line: i + 1, reason: e.to_string() }
        })?;
        records.push(record);
    }

    Ok(records)
}

fn read_csv<R: BufRead>(reader: R) -> Result<Vec<FlowRecord>, SamplingError> {
    let mut lines = reader.lines();

    let header = match lines.next() {
        Some(line) => line?,
        None => return Err(SamplingError::EmptyDataset),
    };
    // Column names are whitespace-trimmed (" Flow Duration" → "Flow Duration")
    let columns: Vec<String> = header
        .trim_start_matches('\u{feff}')
        .split(',')
        .map(|c| c.trim().to_string())
        .collect();

    if !columns.iter().any(|c| c == LABEL_COLUMN) {
        return Err(SamplingError::MissingLabelColumn(LABEL_COLUMN.to_string()));
    }

    let mut records = Vec::new();
    for (i, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let cells: Vec<&str> = line.split(',').collect();
        if cells.len() != columns.len() {
            return Err(SamplingError::DatasetParse {
                line: i + 2,
                reason: format!("expected {} cells, found {}", columns.len(), cells.len()),
            });
        }
        let record: FlowRecord = columns
            .iter()
            .zip(cells)
            .map(|(col, cell)| (col.clone(), FieldValue::parse(cell)))
            .collect();
        records.push(record);
    }

    Ok(records)
}

// ============================================================================
// TESTS
// ============================================================================
