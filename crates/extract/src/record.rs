// ABOUTME: Record and Extraction structs holding the rows extracted from one page.
// ABOUTME: Skipped containers are listed separately and never appear among the records.

use serde::{Deserialize, Serialize};

/// Sentinel used when a field selector matches nothing inside a container.
pub const MISSING_FIELD: &str = "N/A";

/// Outcome marker carried by each exported row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    #[default]
    Success,
    Skipped,
}

impl RecordStatus {
    /// Human-readable note written into the export's status column.
    pub fn note(&self) -> &'static str {
        match self {
            RecordStatus::Success => "Extracted",
            RecordStatus::Skipped => "Skipped",
        }
    }
}

/// One extracted `{name, item, status}` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub company_name: String,
    pub item_text: String,
    pub status: RecordStatus,
}

impl Record {
    pub fn new(company_name: impl Into<String>, item_text: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            item_text: item_text.into(),
            status: RecordStatus::Success,
        }
    }
}

/// A container whose field extraction failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// Zero-based position among the matched containers.
    pub index: usize,
    pub reason: String,
}

impl SkippedRow {
    /// Placeholder row for exports that list skipped containers too.
    pub fn to_record(&self) -> Record {
        Record {
            company_name: MISSING_FIELD.to_string(),
            item_text: self.reason.clone(),
            status: RecordStatus::Skipped,
        }
    }
}

/// The result of one extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Extraction {
    pub url: String,
    pub final_url: String,
    /// Number of elements matched by the container selector.
    pub containers: usize,
    pub records: Vec<Record>,
    pub skipped: Vec<SkippedRow>,
}

impl Extraction {
    /// True when no records were produced. Callers should warn rather than
    /// report success: the selectors may simply not match the page.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Records and skipped placeholders merged back into container order.
    pub fn rows_with_skipped(&self) -> Vec<Record> {
        let mut rows = Vec::with_capacity(self.containers);
        let mut records = self.records.iter();
        let mut skipped = self.skipped.iter().peekable();
        for index in 0..self.containers {
            match skipped.peek() {
                Some(s) if s.index == index => {
                    rows.push(s.to_record());
                    skipped.next();
                }
                _ => {
                    if let Some(record) = records.next() {
                        rows.push(record.clone());
                    }
                }
            }
        }
        rows
    }
}
