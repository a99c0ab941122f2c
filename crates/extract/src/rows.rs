// ABOUTME: Per-container field extraction: name/item lookup, trimming, and the name-removal heuristic.
// ABOUTME: Each container yields an explicit RowOutcome so a failing row is skipped, never fatal.

//! Row extraction.
//!
//! Every element matched by the container selector is one candidate record.
//! For each container the name and item selectors are applied to the
//! container's subtree only; a selector that matches nothing yields the
//! `"N/A"` sentinel. Failures while extracting one container are captured
//! as [`RowOutcome::Skipped`] and extraction continues with the next.

use tracing::{debug, warn};

use crate::error::{QueryError, RowError};
use crate::progress::{Progress, ProgressSink};
use crate::query::{DocumentNode, ElementNode};
use crate::record::{Record, SkippedRow, MISSING_FIELD};
use crate::request::ExtractionRequest;

/// Result of extracting one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Extracted(Record),
    Skipped(SkippedRow),
}

/// Extracts every container of `doc` in document order.
///
/// Only an invalid container selector fails the whole call. A progress event
/// is reported after each container, skipped or not.
pub fn extract_rows<D, P>(
    doc: &D,
    request: &ExtractionRequest,
    progress: &mut P,
) -> Result<Vec<RowOutcome>, QueryError>
where
    D: DocumentNode,
    P: ProgressSink + ?Sized,
{
    let containers = doc.select_all(&request.container_selector)?;
    let total = containers.len();
    debug!(
        selector = %request.container_selector,
        containers = total,
        "matched containers"
    );

    let mut outcomes = Vec::with_capacity(total);
    for (index, container) in containers.iter().enumerate() {
        let outcome = match extract_row(container, &request.name_selector, &request.item_selector)
        {
            Ok(record) => RowOutcome::Extracted(record),
            Err(err) => {
                warn!(index, error = %err, "skipping row");
                RowOutcome::Skipped(SkippedRow {
                    index,
                    reason: err.to_string(),
                })
            }
        };
        outcomes.push(outcome);
        progress.report(Progress {
            completed: index + 1,
            total,
        });
    }
    Ok(outcomes)
}

/// Extracts the name and item fields from one container.
pub fn extract_row<E: ElementNode>(
    container: &E,
    name_selector: &str,
    item_selector: &str,
) -> Result<Record, RowError> {
    let name = first_text(container, name_selector).map_err(RowError::Name)?;
    let item = first_text(container, item_selector).map_err(RowError::Item)?;
    let item = strip_name(&name, &item);
    Ok(Record::new(name, item))
}

/// Trimmed text of the first descendant matching `selector`, or the sentinel.
fn first_text<E: ElementNode>(container: &E, selector: &str) -> Result<String, QueryError> {
    Ok(match container.select_first(selector)? {
        Some(el) => el.text_content().trim().to_string(),
        None => MISSING_FIELD.to_string(),
    })
}

/// Removes the first occurrence of `name` from `item` and re-trims.
///
/// The item selector often matches the cell that also holds the name link,
/// so the item text repeats the name. This is a plain substring removal: a
/// short name found inside an unrelated word is removed from that word too
/// (`"A"` turns `"Appliances"` into `"ppliances"`).
pub fn strip_name(name: &str, item: &str) -> String {
    if item.contains(name) {
        item.replacen(name, "", 1).trim().to_string()
    } else {
        item.to_string()
    }
}

/// Splits outcomes into records and skipped rows, keeping order.
pub fn partition(outcomes: Vec<RowOutcome>) -> (Vec<Record>, Vec<SkippedRow>) {
    let mut records = Vec::new();
    let mut skipped = Vec::new();
    for outcome in outcomes {
        match outcome {
            RowOutcome::Extracted(record) => records.push(record),
            RowOutcome::Skipped(row) => skipped.push(row),
        }
    }
    (records, skipped)
}
