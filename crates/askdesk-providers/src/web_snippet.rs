//! Website snippet source.
//!
//! Fetches a page, flattens it to plain text, and cuts a bounded
//! window around the first query keyword found in it.

use askdesk_core::config::SnippetConfig;
use askdesk_core::error::{AskDeskError, Result};
use askdesk_core::traits::SnippetSource;
use async_trait::async_trait;
use std::time::Duration;

/// Fetches the business website as plain text.
pub struct WebPageSource {
    client: reqwest::Client,
    provenance: String,
    timeout: Duration,
}

impl WebPageSource {
    pub fn new(config: &SnippetConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(timeout)
            .build()
            .map_err(|e| AskDeskError::Http(format!("failed to build HTTP client: {e}")))?;

        let provenance = if config.label.is_empty() {
            provenance_from_url(&config.url)
        } else {
            config.label.clone()
        };

        Ok(Self {
            client,
            provenance,
            timeout,
        })
    }

    async fn fetch_html(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AskDeskError::ExternalFetch(format!("{url}: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AskDeskError::ExternalFetch(format!("{url} returned {status}")));
        }
        resp.text()
            .await
            .map_err(|e| AskDeskError::ExternalFetch(format!("{url}: {e}")))
    }
}

#[async_trait]
impl SnippetSource for WebPageSource {
    fn provenance(&self) -> &str {
        &self.provenance
    }

    async fn fetch(&self, identifier: &str) -> Result<String> {
        let html = tokio::time::timeout(self.timeout, self.fetch_html(identifier))
            .await
            .map_err(|_| {
                AskDeskError::ExternalFetch(format!(
                    "{identifier} timed out after {}s",
                    self.timeout.as_secs()
                ))
            })??;
        Ok(html_to_text(&html))
    }
}

/// "https://www.hirebie.com/" → "hirebie.com"
pub fn provenance_from_url(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .unwrap_or_else(|| url.to_string())
}

/// All document text, `<title>` included, with whitespace collapsed.
pub fn html_to_text(html: &str) -> String {
    let doc = scraper::Html::parse_document(html);
    let text = doc.root_element().text().collect::<Vec<_>>().join(" ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Window sizes and keyword filter for snippet extraction.
#[derive(Debug, Clone, Copy)]
pub struct SnippetWindow {
    pub before: usize,
    pub after: usize,
    /// Keywords shorter than this are ignored.
    pub min_word_len: usize,
}

impl From<&SnippetConfig> for SnippetWindow {
    fn from(c: &SnippetConfig) -> Self {
        Self {
            before: c.before_chars,
            after: c.after_chars,
            min_word_len: c.min_word_len,
        }
    }
}

impl Default for SnippetWindow {
    fn default() -> Self {
        Self {
            before: 100,
            after: 300,
            min_word_len: 4,
        }
    }
}

/// Find the first query keyword present in `page` and return the trimmed
/// window around its first occurrence.
///
/// Keywords are checked in query order; matching is case-insensitive.
/// Offsets are in characters, not bytes.
pub fn extract_snippet(query: &str, page: &str, window: SnippetWindow) -> Option<String> {
    let page_chars: Vec<char> = page.chars().collect();
    // One folded char per source char keeps offsets aligned.
    let folded: Vec<char> = page_chars
        .iter()
        .map(|c| c.to_lowercase().next().unwrap_or(*c))
        .collect();

    let lowered = query.to_lowercase();
    let start = lowered
        .split_whitespace()
        .filter(|w| w.chars().count() >= window.min_word_len)
        .find_map(|word| {
            let needle: Vec<char> = word.chars().collect();
            folded.windows(needle.len()).position(|w| w == needle.as_slice())
        })?;

    let from = start.saturating_sub(window.before);
    let to = start.saturating_add(window.after).min(page_chars.len());
    let snippet: String = page_chars[from..to].iter().collect();
    Some(snippet.trim().to_string())
}

/// `(From hirebie.com): ...snippet...`
pub fn format_snippet(provenance: &str, snippet: &str) -> String {
    format!("(From {provenance}): ...{snippet}...")
}
