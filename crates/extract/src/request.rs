// ABOUTME: ExtractionRequest holding the target URL and the three user-supplied selectors.
// ABOUTME: Validates required inputs before any network call is made.

use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

/// Default container selector (rows of the exhibitor list table).
pub const DEFAULT_CONTAINER_SELECTOR: &str = "table.tbl_list tbody tr";
/// Default name selector, relative to a container.
pub const DEFAULT_NAME_SELECTOR: &str = "td.al_left a";
/// Default item selector, relative to a container.
pub const DEFAULT_ITEM_SELECTOR: &str = "td.al_left";

/// Input to a single extraction call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRequest {
    pub url: String,
    pub container_selector: String,
    pub name_selector: String,
    pub item_selector: String,
}

impl ExtractionRequest {
    pub fn new(
        url: impl Into<String>,
        container_selector: impl Into<String>,
        name_selector: impl Into<String>,
        item_selector: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            container_selector: container_selector.into(),
            name_selector: name_selector.into(),
            item_selector: item_selector.into(),
        }
    }

    /// A request for `url` using the default exhibitor-table selectors.
    pub fn with_defaults(url: impl Into<String>) -> Self {
        Self::new(
            url,
            DEFAULT_CONTAINER_SELECTOR,
            DEFAULT_NAME_SELECTOR,
            DEFAULT_ITEM_SELECTOR,
        )
    }

    /// Rejects a blank URL or container selector.
    ///
    /// The name and item selectors may be blank: a blank field selector fails
    /// per row and only skips rows.
    pub fn validate(&self) -> Result<(), ExtractError> {
        if self.url.trim().is_empty() {
            return Err(ExtractError::empty_selector(
                "",
                "Validate",
                Some(anyhow::anyhow!("URL is required")),
            ));
        }
        if self.container_selector.trim().is_empty() {
            return Err(ExtractError::empty_selector(
                self.url.as_str(),
                "Validate",
                Some(anyhow::anyhow!("container selector is required")),
            ));
        }
        Ok(())
    }

    /// Validates and additionally requires an absolute http(s) URL.
    pub fn validate_for_fetch(&self) -> Result<url::Url, ExtractError> {
        self.validate()?;
        let url = self.url.trim();
        let parsed = url::Url::parse(url).map_err(|e| {
            ExtractError::invalid_url(url, "Validate", Some(anyhow::anyhow!("invalid URL: {}", e)))
        })?;
        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            _ => Err(ExtractError::invalid_url(
                url,
                "Validate",
                Some(anyhow::anyhow!("scheme must be http or https")),
            )),
        }
    }
}
