// ABOUTME: Main library entry point for the exhibitor list extractor.
// ABOUTME: Re-exports the public API: Extractor, ExtractorBuilder, ExtractionRequest, Extraction, Record, errors.

//! Exhibitors - selector-driven record extraction from a single HTML page.
//!
//! A page is fetched once, every element matching the container selector
//! becomes one candidate record, and the name and item selectors are applied
//! inside each container. The result can be exported as CSV.
//!
//! # Example
//!
//! ```no_run
//! use exhibitors_extract::{export, ExtractError, ExtractionRequest, Extractor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ExtractError> {
//!     let extractor = Extractor::builder().build()?;
//!     let request = ExtractionRequest::new(
//!         "https://example.com/company_list",
//!         "table.tbl_list tbody tr",
//!         "td.al_left a",
//!         "td.al_left",
//!     );
//!     let extraction = extractor.extract(&request).await?;
//!     export::write_csv(export::DEFAULT_EXPORT_FILE_NAME, &extraction.records)?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod export;
pub mod options;
pub mod progress;
pub mod query;
pub mod record;
pub mod request;
pub mod resource;
pub mod rows;

pub use crate::client::Extractor;
pub use crate::error::{ErrorCode, ExtractError, QueryError, RowError};
pub use crate::export::{Summary, DEFAULT_EXPORT_FILE_NAME};
pub use crate::options::{ExtractorBuilder, Options, DEFAULT_USER_AGENT};
pub use crate::progress::{NoProgress, Progress, ProgressSink};
pub use crate::query::{DocumentNode, ElementNode};
pub use crate::record::{Extraction, Record, RecordStatus, SkippedRow, MISSING_FIELD};
pub use crate::request::ExtractionRequest;
pub use crate::rows::RowOutcome;
