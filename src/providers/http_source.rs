use super::util::with_retry;
use crate::core::config::RemoteConfig;
use crate::core::quote::QuoteRecord;
use crate::core::remote::{REMOTE_BATCH_LIMIT, RemoteQuoteSource};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error};

/// Number of characters of a post body that become the quote category.
const CATEGORY_PREFIX_LEN: usize = 20;
const FALLBACK_CATEGORY: &str = "General";

/// Remote item as served by the posts endpoint. Only these two fields are
/// read; everything else is ignored.
#[derive(Debug, Deserialize)]
struct RemotePost {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    body: Option<String>,
}

impl From<RemotePost> for QuoteRecord {
    fn from(post: RemotePost) -> Self {
        let prefix: String = post
            .body
            .unwrap_or_default()
            .chars()
            .take(CATEGORY_PREFIX_LEN)
            .collect();
        let category = if prefix.trim().is_empty() {
            FALLBACK_CATEGORY.to_string()
        } else {
            prefix
        };
        QuoteRecord::new(post.title.unwrap_or_default(), category)
    }
}

/// Talks to a JSONPlaceholder style `/posts` collection.
pub struct HttpQuoteSource {
    base_url: String,
    client: reqwest::Client,
    retries: usize,
    retry_delay_ms: u64,
}

impl HttpQuoteSource {
    pub fn new(base_url: &str, retries: usize, retry_delay_ms: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("quotefeed/1.0")
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            retries,
            retry_delay_ms,
        })
    }

    pub fn from_config(config: &RemoteConfig) -> Result<Self> {
        Self::new(&config.base_url, config.retries, config.retry_delay_ms)
    }

    fn posts_url(&self) -> String {
        format!("{}/posts", self.base_url)
    }
}

#[async_trait]
impl RemoteQuoteSource for HttpQuoteSource {
    async fn fetch_remote(&self) -> Result<Vec<QuoteRecord>> {
        let url = self.posts_url();
        debug!("Requesting remote quotes from {}", url);

        let response = with_retry(
            "Remote quote fetch",
            || async { self.client.get(&url).send().await?.error_for_status() },
            self.retries,
            self.retry_delay_ms,
        )
        .await
        .with_context(|| format!("Failed to fetch remote quotes from {url}"))?;

        let response_text = response
            .text()
            .await
            .context("Failed to get response text")?;

        let posts: Vec<RemotePost> = match serde_json::from_str(&response_text) {
            Ok(data) => data,
            Err(e) => {
                error!(
                    error = ?e,
                    response = %response_text,
                    "Failed to parse remote quotes"
                );
                return Err(e).context("Failed to parse remote quotes");
            }
        };

        let quotes: Vec<QuoteRecord> = posts
            .into_iter()
            .take(REMOTE_BATCH_LIMIT)
            .map(QuoteRecord::from)
            .collect();
        debug!("Fetched {} remote quotes", quotes.len());
        Ok(quotes)
    }

    async fn push_local(&self, record: &QuoteRecord) -> Result<()> {
        let url = self.posts_url();
        self.client
            .post(&url)
            .json(record)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("Failed to push quote to {url}"))?;
        debug!("Pushed quote to {}", url);
        Ok(())
    }
}
