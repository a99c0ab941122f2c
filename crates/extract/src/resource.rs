// ABOUTME: Fetches the target page: one GET, status and size checks, charset-aware decoding.
// ABOUTME: Non-2xx responses, transport failures, and timeouts abort the extraction.

use bytes::Bytes;
use tracing::debug;

use crate::error::ExtractError;

/// Maximum allowed content length (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

/// Options for fetching a resource.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub max_content_length: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_content_length: MAX_CONTENT_LENGTH,
        }
    }
}

/// Result of a successful fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status: u16,
    pub url: String,
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchResult {
    /// Decode the body as UTF-8 text, using the charset from the response's content type.
    pub fn text_utf8(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }

    /// Rejects responses whose content type cannot be read as markup.
    ///
    /// A missing content type is accepted.
    pub fn ensure_markup(&self) -> Result<(), ExtractError> {
        match self.content_type.as_deref() {
            Some(ct) if !is_markup_content_type(ct) => Err(ExtractError::parse(
                self.url.as_str(),
                "Parse",
                Some(anyhow::anyhow!("response is not HTML (content-type {})", ct)),
            )),
            _ => Ok(()),
        }
    }
}

/// True for `text/*` and any html/xml media type.
fn is_markup_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    mime.is_empty() || mime.starts_with("text/") || mime.contains("html") || mime.contains("xml")
}

/// Decode body bytes to a String using charset from content-type header or detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    for part in lower.split(';') {
        let trimmed = part.trim();
        if let Some(charset) = trimmed.strip_prefix("charset=") {
            let charset = charset.trim_matches('"').trim_matches('\'');
            return Some(charset.to_string());
        }
    }
    None
}

fn request_error(url: &str, err: reqwest::Error) -> ExtractError {
    if err.is_timeout() {
        ExtractError::timeout(url, "Fetch", Some(anyhow::anyhow!("request timed out: {}", err)))
    } else {
        ExtractError::fetch(url, "Fetch", Some(anyhow::anyhow!("request failed: {}", err)))
    }
}

/// Fetch a resource from the given URL.
///
/// The client carries the user agent and timeout; no other headers are sent.
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    opts: &FetchOptions,
) -> Result<FetchResult, ExtractError> {
    debug!(url, "fetching page");
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| request_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ExtractError::fetch(
            url,
            "Fetch",
            Some(anyhow::anyhow!("HTTP status {}", status.as_u16())),
        ));
    }

    if let Some(len) = response.content_length() {
        if len as usize > opts.max_content_length {
            return Err(ExtractError::fetch(
                url,
                "Fetch",
                Some(anyhow::anyhow!("content too large")),
            ));
        }
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_lowercase());

    let body = response.bytes().await.map_err(|e| request_error(url, e))?;

    if body.len() > opts.max_content_length {
        return Err(ExtractError::fetch(
            url,
            "Fetch",
            Some(anyhow::anyhow!("content too large")),
        ));
    }

    debug!(
        url,
        status = status.as_u16(),
        bytes = body.len(),
        content_type = content_type.as_deref().unwrap_or(""),
        "fetched page"
    );

    Ok(FetchResult {
        status: status.as_u16(),
        url: url.to_string(),
        final_url,
        content_type,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::time::Duration;

    fn create_test_client() -> reqwest::Client {
        reqwest::Client::builder()
            .user_agent("test-agent")
            .timeout(Duration::from_millis(500))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_ok_utf8() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/list");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body("<p>hello</p>");
        });

        let client = create_test_client();
        let result = fetch(&client, &server.url("/list"), &FetchOptions::default()).await;
        mock.assert();

        let result = result.expect("fetch should succeed");
        assert_eq!(result.status, 200);
        assert_eq!(result.text_utf8(), "<p>hello</p>");
        assert!(result.ensure_markup().is_ok());
    }

    #[tokio::test]
    async fn test_fetch_sends_user_agent() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/ua")
                .header("user-agent", "test-agent");
            then.status(200).body("ok");
        });

        let client = create_test_client();
        let result = fetch(&client, &server.url("/ua"), &FetchOptions::default()).await;
        mock.assert();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_non_2xx_rejected() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/notfound");
            then.status(404).body("not found");
        });

        let client = create_test_client();
        let result = fetch(&client, &server.url("/notfound"), &FetchOptions::default()).await;
        mock.assert();

        let err = result.expect_err("should fail on 404");
        assert!(err.is_fetch());
        assert!(err.to_string().contains("HTTP status 404"));
    }

    #[tokio::test]
    async fn test_fetch_accepts_other_2xx() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/partial");
            then.status(203).body("<p>cached</p>");
        });

        let client = create_test_client();
        let result = fetch(&client, &server.url("/partial"), &FetchOptions::default())
            .await
            .expect("203 is a success status");
        assert_eq!(result.status, 203);
    }

    #[tokio::test]
    async fn test_fetch_content_length_limit() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/big");
            then.status(200).body("x".repeat(64));
        });

        let client = create_test_client();
        let opts = FetchOptions {
            max_content_length: 16,
        };
        let err = fetch(&client, &server.url("/big"), &opts)
            .await
            .expect_err("body over the limit");
        assert!(err.is_fetch());
        assert!(err.to_string().contains("content too large"));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/slow");
            then.status(200)
                .delay(Duration::from_secs(3))
                .body("late");
        });

        let client = create_test_client();
        let err = fetch(&client, &server.url("/slow"), &FetchOptions::default())
            .await
            .expect_err("should time out");
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let client = create_test_client();
        let err = fetch(&client, "http://127.0.0.1:1/", &FetchOptions::default())
            .await
            .expect_err("nothing listens on port 1");
        assert!(err.is_fetch());
    }

    #[test]
    fn test_markup_content_types() {
        assert!(is_markup_content_type("text/html; charset=euc-kr"));
        assert!(is_markup_content_type("application/xhtml+xml"));
        assert!(is_markup_content_type("text/plain"));
        assert!(!is_markup_content_type("image/png"));
        assert!(!is_markup_content_type("application/pdf"));
    }

    #[test]
    fn test_ensure_markup_rejects_binary() {
        let result = FetchResult {
            status: 200,
            url: "https://example.com/logo.png".to_string(),
            final_url: "https://example.com/logo.png".to_string(),
            content_type: Some("image/png".to_string()),
            body: Bytes::from_static(b"\x89PNG"),
        };
        let err = result.ensure_markup().unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_text_utf8_uses_response_charset() {
        let result = FetchResult {
            status: 200,
            url: "https://example.com/list".to_string(),
            final_url: "https://example.com/list".to_string(),
            content_type: Some("text/html; charset=euc-kr".to_string()),
            body: Bytes::from_static(&[0xC0, 0xFC, 0xBD, 0xC3]),
        };
        assert_eq!(result.text_utf8(), "전시");
    }

    #[test]
    fn test_decode_euc_kr_from_header() {
        // "전시" in EUC-KR
        let body: &[u8] = &[0xC0, 0xFC, 0xBD, 0xC3];
        let decoded = decode_body(body, Some("text/html; charset=euc-kr"));
        assert_eq!(decoded, "전시");
    }

    #[test]
    fn test_decode_plain_ascii_without_header() {
        let decoded = decode_body(b"<td>Acme</td>", None);
        assert_eq!(decoded, "<td>Acme</td>");
    }

    #[test]
    fn test_extract_charset() {
        assert_eq!(
            extract_charset("text/html; charset=utf-8"),
            Some("utf-8".to_string())
        );
        assert_eq!(
            extract_charset("text/html; charset=\"EUC-KR\""),
            Some("euc-kr".to_string())
        );
        assert_eq!(extract_charset("text/html"), None);
    }
}
