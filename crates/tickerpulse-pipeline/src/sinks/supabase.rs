//! Supabase (PostgREST) storage for forwarded posts and per-ticker totals.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tickerpulse_core::{Security, SupabaseCredentials};

use super::{error_body, MessageSink};
use crate::error::SinkError;
use crate::message::OutboundMessage;

const POSTS_TABLE: &str = "wallstreetbets_data";
const TICKERS_TABLE: &str = "wallstreetbets_ticker";
/// Stored titles are the first words of the combined text.
const TITLE_WORDS: usize = 10;

/// Row in the posts table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostRow {
    pub post_id: String,
    pub title: String,
    pub author: String,
    pub body: String,
    pub url: String,
    pub created_utc: i64,
    pub created: String,
}

impl PostRow {
    #[must_use]
    pub fn from_message(message: &OutboundMessage) -> Self {
        Self {
            post_id: message.id.clone(),
            title: message
                .content
                .split_whitespace()
                .take(TITLE_WORDS)
                .collect::<Vec<_>>()
                .join(" "),
            author: message.author.clone(),
            body: message.content.clone(),
            url: message.url.clone(),
            created_utc: message.created_utc,
            created: message.created.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct TickerSeedRow<'a> {
    company: &'a str,
    ticker: String,
    total_mentions: i64,
    last_update: &'a str,
}

#[derive(Debug, Deserialize)]
struct TotalMentions {
    total_mentions: i64,
}

#[derive(Debug, Serialize)]
struct TotalMentionsUpdate<'a> {
    total_mentions: i64,
    last_update: &'a str,
}

/// PostgREST client authenticated with the project's API key.
#[derive(Clone)]
pub struct SupabaseClient {
    client: reqwest::Client,
    rest_url: String,
    key: String,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("rest_url", &self.rest_url)
            .field("key", &"[redacted]")
            .finish_non_exhaustive()
    }
}

impl SupabaseClient {
    /// # Errors
    ///
    /// Returns [`SinkError::Http`] if the HTTP client cannot be built.
    pub fn new(credentials: &SupabaseCredentials, timeout: Duration) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            rest_url: format!("{}/rest/v1", credentials.url.trim_end_matches('/')),
            key: credentials.key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{table}", self.rest_url)
    }

    fn request(&self, method: reqwest::Method, table: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, SinkError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let url = response.url().to_string();
        Err(SinkError::UnexpectedStatus {
            status: status.as_u16(),
            url,
            body: error_body(response).await,
        })
    }

    /// Whether a row for `post_id` is already stored.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] on network failure or a non-2xx response.
    pub async fn post_exists(&self, post_id: &str) -> Result<bool, SinkError> {
        let response = self
            .request(reqwest::Method::GET, POSTS_TABLE)
            .query(&[("select", "post_id".to_string()), ("post_id", format!("eq.{post_id}"))])
            .send()
            .await?;
        let text = Self::check(response).await?.text().await?;
        let rows: Vec<serde_json::Value> = serde_json::from_str(&text)?;
        Ok(!rows.is_empty())
    }

    /// # Errors
    ///
    /// Returns [`SinkError`] on network failure or a non-2xx response.
    pub async fn insert_post(&self, row: &PostRow) -> Result<(), SinkError> {
        let response = self
            .request(reqwest::Method::POST, POSTS_TABLE)
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;
        Self::check(response).await?;
        tracing::info!(post_id = %row.post_id, "inserted post");
        Ok(())
    }

    /// Add `by` to the stored total for `ticker`. Returns `false` when the
    /// ticker has no row, in which case nothing is written.
    ///
    /// Read-then-write: concurrent writers for one ticker can lose updates.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] on network failure or a non-2xx response.
    pub async fn increment_ticker_mentions(
        &self,
        ticker: &str,
        by: u32,
    ) -> Result<bool, SinkError> {
        let filter = format!("eq.{ticker}");
        let response = self
            .request(reqwest::Method::GET, TICKERS_TABLE)
            .query(&[("select", "total_mentions"), ("ticker", filter.as_str())])
            .send()
            .await?;
        let text = Self::check(response).await?.text().await?;
        let rows: Vec<TotalMentions> = serde_json::from_str(&text)?;
        let Some(current) = rows.first() else {
            tracing::debug!(ticker, "ticker not seeded; skipping mention update");
            return Ok(false);
        };

        let now = Utc::now().to_rfc3339();
        let update = TotalMentionsUpdate {
            total_mentions: current.total_mentions + i64::from(by),
            last_update: &now,
        };
        let response = self
            .request(reqwest::Method::PATCH, TICKERS_TABLE)
            .query(&[("ticker", filter.as_str())])
            .header("Prefer", "return=minimal")
            .json(&update)
            .send()
            .await?;
        Self::check(response).await?;
        tracing::debug!(ticker, by, total = update.total_mentions, "updated ticker mentions");
        Ok(true)
    }

    /// Insert a zeroed row per seedable symbol. Returns the number of rows sent.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] on network failure or a non-2xx response.
    pub async fn seed_tickers(&self, securities: &[Security]) -> Result<usize, SinkError> {
        let now = Utc::now().to_rfc3339();
        let rows: Vec<TickerSeedRow<'_>> = securities
            .iter()
            .filter_map(|s| {
                let ticker = s.symbol.trim().to_uppercase();
                is_seedable_symbol(&ticker).then(|| TickerSeedRow {
                    company: s.name.trim(),
                    ticker,
                    total_mentions: 0,
                    last_update: &now,
                })
            })
            .collect();

        if rows.is_empty() {
            tracing::info!("no seedable tickers");
            return Ok(0);
        }

        let response = self
            .request(reqwest::Method::POST, TICKERS_TABLE)
            .header("Prefer", "return=minimal")
            .json(&rows)
            .send()
            .await?;
        Self::check(response).await?;
        tracing::info!(rows = rows.len(), table = TICKERS_TABLE, "seeded tickers");
        Ok(rows.len())
    }
}

/// 1 to 5 ASCII letters. Symbols with punctuation (`BRK.B`) are skipped.
fn is_seedable_symbol(symbol: &str) -> bool {
    (1..=5).contains(&symbol.len()) && symbol.chars().all(|c| c.is_ascii_alphabetic())
}

/// Sink storing each post once and adding its mentions to the ticker totals.
#[derive(Debug, Clone)]
pub struct SupabaseSink {
    client: SupabaseClient,
}

impl SupabaseSink {
    #[must_use]
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MessageSink for SupabaseSink {
    async fn publish(&self, message: &OutboundMessage) -> Result<(), SinkError> {
        if self.client.post_exists(&message.id).await? {
            tracing::info!(post_id = %message.id, "post already stored; skipping");
            return Ok(());
        }

        self.client
            .insert_post(&PostRow::from_message(message))
            .await?;

        let mut failed = Vec::new();
        for (ticker, count) in message.ticker_mentions.iter() {
            if let Err(e) = self.client.increment_ticker_mentions(ticker, count).await {
                tracing::warn!(post_id = %message.id, ticker, error = %e, "ticker update failed");
                failed.push(ticker.to_string());
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(SinkError::Rejected(format!(
                "ticker updates failed for {}",
                failed.join(", ")
            )))
        }
    }
}
