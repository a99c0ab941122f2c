// ABOUTME: Configuration options for the extractor and the ExtractorBuilder fluent API.
// ABOUTME: Defaults to a desktop-browser user agent and a bounded request timeout.

use std::time::Duration;

use crate::client::Extractor;
use crate::resource::MAX_CONTENT_LENGTH;

/// Desktop Chrome user agent; some directories reject empty or library agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration options for the extractor.
#[derive(Debug, Clone)]
pub struct Options {
    pub timeout: Duration,
    pub user_agent: String,
    pub max_content_length: usize,
    pub http_client: Option<reqwest::Client>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_content_length: MAX_CONTENT_LENGTH,
            http_client: None,
        }
    }
}

/// Builder for constructing Extractor instances with custom configuration.
#[derive(Debug, Clone)]
pub struct ExtractorBuilder {
    opts: Options,
}

impl ExtractorBuilder {
    /// Create a new ExtractorBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
        }
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Cap the accepted response body size in bytes.
    pub fn max_content_length(mut self, limit: usize) -> Self {
        self.opts.max_content_length = limit;
        self
    }

    /// Use a custom HTTP client. Its own user agent and timeout take precedence.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Build the Extractor with the configured options.
    pub fn build(self) -> Result<Extractor, crate::ExtractError> {
        Extractor::new(self.opts)
    }
}

impl Default for ExtractorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
