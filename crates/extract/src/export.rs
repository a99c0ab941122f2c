// ABOUTME: Output formats for extracted records: CSV export (UTF-8 with BOM), text table, and JSON.
// ABOUTME: Also builds the success/warning summary shown after an extraction.

use std::fs;
use std::path::Path;

use crate::error::ExtractError;
use crate::record::{Extraction, Record};

/// File name used when the caller does not choose one.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "exhibition_data.csv";

/// Header row of the export, in column order.
pub const CSV_HEADERS: [&str; 3] = ["Company Name", "Exhibit Items / Description", "Note"];

/// Byte order mark so spreadsheet tools detect UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

fn csv_error(err: csv::Error) -> ExtractError {
    ExtractError::export("WriteCsv", Some(anyhow::Error::new(err)))
}

/// Serialize records as CSV, prefixed with a UTF-8 BOM.
pub fn to_csv(records: &[Record]) -> Result<Vec<u8>, ExtractError> {
    let mut buf = UTF8_BOM.to_vec();
    {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(&mut buf);
        writer.write_record(CSV_HEADERS).map_err(csv_error)?;
        for record in records {
            writer
                .write_record([
                    record.company_name.as_str(),
                    record.item_text.as_str(),
                    record.status.note(),
                ])
                .map_err(csv_error)?;
        }
        writer
            .flush()
            .map_err(|e| ExtractError::export("WriteCsv", Some(anyhow::Error::new(e))))?;
    }
    Ok(buf)
}

/// Write the CSV export to `path`.
pub fn write_csv(path: impl AsRef<Path>, records: &[Record]) -> Result<(), ExtractError> {
    let path = path.as_ref();
    let bytes = to_csv(records)?;
    fs::write(path, bytes).map_err(|e| {
        ExtractError::export(
            "WriteCsv",
            Some(anyhow::anyhow!("writing {}: {}", path.display(), e)),
        )
    })
}

/// Render records as an aligned plain-text table.
pub fn render_table(records: &[Record]) -> String {
    let rows: Vec<[&str; 3]> = records
        .iter()
        .map(|r| [r.company_name.as_str(), r.item_text.as_str(), r.status.note()])
        .collect();

    let mut widths = CSV_HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &CSV_HEADERS, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(
        &mut out,
        &[rule[0].as_str(), rule[1].as_str(), rule[2].as_str()],
        &widths,
    );
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[&str; 3], widths: &[usize; 3]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join(" | ");
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Render the whole extraction as pretty JSON.
pub fn render_json(extraction: &Extraction) -> Result<String, ExtractError> {
    serde_json::to_string_pretty(extraction)
        .map_err(|e| ExtractError::export("RenderJson", Some(anyhow::Error::new(e))))
}

/// Message shown to the user after an extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Summary {
    Success(String),
    Warning(String),
}

impl Summary {
    pub fn message(&self) -> &str {
        match self {
            Summary::Success(m) | Summary::Warning(m) => m,
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Summary::Warning(_))
    }
}

/// An empty result is a warning: the selectors may not match the page.
pub fn summarize(extraction: &Extraction) -> Summary {
    if extraction.is_empty() {
        let mut msg = "no data found; check that the selectors match the page".to_string();
        if extraction.containers > 0 {
            msg.push_str(&format!(
                " ({} rows matched, all skipped)",
                extraction.containers
            ));
        }
        return Summary::Warning(msg);
    }

    let mut msg = format!("collected {} records", extraction.len());
    if !extraction.skipped.is_empty() {
        msg.push_str(&format!(" ({} rows skipped)", extraction.skipped.len()));
    }
    Summary::Success(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SkippedRow;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<Record> {
        vec![
            Record::new("Acme Corp", "- makes widgets"),
            Record::new("한국전력", "변압기, \"스마트\" 계량기"),
        ]
    }

    #[test]
    fn test_csv_starts_with_bom_and_header() {
        let bytes = to_csv(&sample()).unwrap();
        assert_eq!(&bytes[..3], UTF8_BOM);

        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Company Name,Exhibit Items / Description,Note")
        );
        assert_eq!(lines.next(), Some("Acme Corp,- makes widgets,Extracted"));
        assert_eq!(
            lines.next(),
            Some("한국전력,\"변압기, \"\"스마트\"\" 계량기\",Extracted")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_csv_with_no_records_has_header_only() {
        let bytes = to_csv(&[]).unwrap();
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert_eq!(text, "Company Name,Exhibit Items / Description,Note\n");
    }

    #[test]
    fn test_write_csv_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_FILE_NAME);
        write_csv(&path, &sample()).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes, to_csv(&sample()).unwrap());
    }

    #[test]
    fn test_write_csv_to_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let err = write_csv(&path, &sample()).unwrap_err();
        assert!(err.is_export());
    }

    #[test]
    fn test_render_table_aligns_columns() {
        let table = render_table(&[
            Record::new("Acme Corp", "widgets"),
            Record::new("Globex", "turbines and pumps"),
        ]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "Company Name | Exhibit Items / Description | Note"
        );
        assert_eq!(
            lines[2],
            "Acme Corp    | widgets                     | Extracted"
        );
        assert!(lines[1].starts_with("------------ | ---"));
    }

    #[test]
    fn test_render_json_contains_records() {
        let extraction = Extraction {
            url: "https://example.com".to_string(),
            final_url: "https://example.com".to_string(),
            containers: 1,
            records: vec![Record::new("Acme", "anvils")],
            skipped: vec![],
        };
        let json = render_json(&extraction).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["records"][0]["company_name"], "Acme");
        assert_eq!(value["records"][0]["status"], "success");
    }

    #[test]
    fn test_summary_success_and_skips() {
        let extraction = Extraction {
            containers: 3,
            records: vec![Record::new("A", "a"), Record::new("B", "b")],
            skipped: vec![SkippedRow {
                index: 2,
                reason: "item field: malformed element: x".to_string(),
            }],
            ..Default::default()
        };
        assert_eq!(
            summarize(&extraction),
            Summary::Success("collected 2 records (1 rows skipped)".to_string())
        );
    }

    #[test]
    fn test_summary_warns_when_empty() {
        let summary = summarize(&Extraction::default());
        assert!(summary.is_warning());
        assert_eq!(
            summary.message(),
            "no data found; check that the selectors match the page"
        );
    }
}
