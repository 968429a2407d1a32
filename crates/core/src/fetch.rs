//! Content fetching from URLs, files, and stdin.
//!
//! The fetch collaborator supplies raw HTML to the pipeline; the pipeline
//! itself performs no I/O. Retries, if any, belong here and not inside the
//! conversion stages.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::{PagemarkError, Result};

/// HTTP client configuration for fetching web pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            // A desktop browser UA; many sites serve stripped or blocked
            // pages to unknown agents.
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

/// Fetches HTML content from a URL.
///
/// Performs an HTTP GET, follows redirects, and returns the response body as
/// text. Only http and https URLs are accepted.
pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<String> {
    let parsed_url = Url::parse(url).map_err(|e| PagemarkError::InvalidUrl(e.to_string()))?;

    if !matches!(parsed_url.scheme(), "http" | "https") {
        return Err(PagemarkError::InvalidUrl(
            "URL must start with http:// or https://".to_string(),
        ));
    }

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .build()
        .map_err(PagemarkError::HttpError)?;

    let response = client
        .get(parsed_url)
        .header("User-Agent", &config.user_agent)
        .header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .header("Accept-Language", "en-US,en;q=0.9")
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                PagemarkError::Timeout { timeout: config.timeout }
            } else {
                PagemarkError::HttpError(e)
            }
        })?;

    let content = response.text().await?;

    Ok(content)
}

/// Reads HTML content from a local file.
///
/// Callers should validate and sanitize the path when accepting user input.
pub fn fetch_file(path: &str) -> Result<String> {
    let path_buf = PathBuf::from(path);

    if !path_buf.exists() {
        Err(PagemarkError::FileNotFound(path_buf))
    } else {
        fs::read_to_string(&path_buf).map_err(PagemarkError::from)
    }
}

/// Reads HTML content from standard input until EOF.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(PagemarkError::from)?;

    Ok(buffer)
}
