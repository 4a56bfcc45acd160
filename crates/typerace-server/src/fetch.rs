//! HTTP paragraph fetching with a local fallback.

use std::time::Duration;

use typerace_engine::{ParagraphSource, lorem_paragraph};

/// Default remote paragraph endpoint: one paragraph of ten sentences.
const DEFAULT_URL: &str = "http://metaphorpsum.com/paragraphs/1/10";

/// How long a fetch may take before the fallback kicks in.
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// A [`ParagraphSource`] that fetches prose over HTTP and degrades to
/// [`lorem_paragraph`] on any failure — bad status, timeout, unreachable
/// host, empty body. `fetch` itself never fails.
#[derive(Debug, Clone)]
pub struct HttpParagraphs {
    client: reqwest::Client,
    url: String,
}

impl HttpParagraphs {
    /// Creates a source fetching from `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    async fn try_fetch(&self) -> Option<String> {
        let response = self
            .client
            .get(&self.url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            return None;
        }
        let body = response.text().await.ok()?;
        // The endpoint returns paragraph breaks; the game wants one line.
        let paragraph = body.replace('\n', " ").trim().to_string();
        if paragraph.is_empty() { None } else { Some(paragraph) }
    }
}

impl Default for HttpParagraphs {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}

impl ParagraphSource for HttpParagraphs {
    async fn fetch(&self) -> String {
        match self.try_fetch().await {
            Some(paragraph) => paragraph,
            None => {
                tracing::debug!(url = %self.url, "paragraph fetch failed, using local generator");
                lorem_paragraph()
            }
        }
    }
}
