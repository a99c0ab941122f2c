// ABOUTME: The Extractor struct that fetches a page and turns its repeated containers into records.
// ABOUTME: Provides async extract() for URLs and extract_html() for already-fetched documents.

use scraper::Html;
use tracing::info;

use crate::error::ExtractError;
use crate::options::{ExtractorBuilder, Options};
use crate::progress::{NoProgress, ProgressSink};
use crate::record::Extraction;
use crate::request::ExtractionRequest;
use crate::resource::{fetch, FetchOptions};
use crate::rows::{extract_rows, partition};

/// Fetches one page and extracts records from it with the request's selectors.
#[derive(Debug, Clone)]
pub struct Extractor {
    opts: Options,
    http_client: reqwest::Client,
}

impl Extractor {
    /// Create a new ExtractorBuilder for configuring the extractor.
    pub fn builder() -> ExtractorBuilder {
        ExtractorBuilder::new()
    }

    /// Create a new Extractor with the given options.
    pub fn new(opts: Options) -> Result<Self, ExtractError> {
        let http_client = match opts.http_client.clone() {
            Some(client) => client,
            None => reqwest::Client::builder()
                .user_agent(&opts.user_agent)
                .timeout(opts.timeout)
                .gzip(true)
                .brotli(true)
                .deflate(true)
                .build()
                .map_err(|e| {
                    ExtractError::fetch(
                        "",
                        "BuildClient",
                        Some(anyhow::anyhow!("failed to build HTTP client: {}", e)),
                    )
                })?,
        };

        Ok(Self { opts, http_client })
    }

    /// The options this extractor was built with.
    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Fetch `request.url` and extract its records.
    pub async fn extract(&self, request: &ExtractionRequest) -> Result<Extraction, ExtractError> {
        self.extract_with_progress(request, &mut NoProgress).await
    }

    /// Like [`Extractor::extract`], reporting `(completed, total)` after each container.
    pub async fn extract_with_progress<P>(
        &self,
        request: &ExtractionRequest,
        progress: &mut P,
    ) -> Result<Extraction, ExtractError>
    where
        P: ProgressSink + ?Sized,
    {
        request.validate_for_fetch()?;
        let url = request.url.trim();

        let fetch_opts = FetchOptions {
            max_content_length: self.opts.max_content_length,
        };
        let fetched = fetch(&self.http_client, url, &fetch_opts).await?;
        fetched.ensure_markup()?;
        let html = fetched.text_utf8();

        let mut extraction = extract_document(&html, request, progress)?;
        extraction.final_url = fetched.final_url;
        Ok(extraction)
    }

    /// Extract records from an already-fetched HTML document.
    ///
    /// `request.url` is only used to label the result and errors.
    pub fn extract_html(
        &self,
        html: &str,
        request: &ExtractionRequest,
    ) -> Result<Extraction, ExtractError> {
        self.extract_html_with_progress(html, request, &mut NoProgress)
    }

    /// Like [`Extractor::extract_html`] with a progress listener.
    pub fn extract_html_with_progress<P>(
        &self,
        html: &str,
        request: &ExtractionRequest,
        progress: &mut P,
    ) -> Result<Extraction, ExtractError>
    where
        P: ProgressSink + ?Sized,
    {
        request.validate()?;
        extract_document(html, request, progress)
    }
}

/// Parse and extract synchronously so the parsed tree never lives across an await.
fn extract_document<P>(
    html: &str,
    request: &ExtractionRequest,
    progress: &mut P,
) -> Result<Extraction, ExtractError>
where
    P: ProgressSink + ?Sized,
{
    let url = request.url.trim();
    let doc = Html::parse_document(html);
    let outcomes = extract_rows(&doc, request, progress)
        .map_err(|e| ExtractError::selector(url, "Select", Some(anyhow::Error::new(e))))?;

    let containers = outcomes.len();
    let (records, skipped) = partition(outcomes);
    info!(
        url,
        containers,
        records = records.len(),
        skipped = skipped.len(),
        "extraction finished"
    );

    Ok(Extraction {
        url: url.to_string(),
        final_url: url.to_string(),
        containers,
        records,
        skipped,
    })
}
