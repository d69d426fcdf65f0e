//! Outbound message built from a post and its ticker mentions.

use chrono::{DateTime, SecondsFormat};
use serde::Serialize;

use crate::mentions::MentionCount;
use crate::types::Post;

/// Record handed to a sink for one post with at least one ticker mention.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundMessage {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// First ticker mentioned in the text.
    pub primary_ticker: String,
    /// Title and body joined by a space.
    pub content: String,
    pub author: String,
    pub score: i64,
    pub num_comments: u64,
    pub url: String,
    pub created_utc: i64,
    /// `created_utc` as RFC 3339 UTC (`2023-11-14T22:13:20Z`).
    pub created: String,
    pub ticker_mentions: MentionCount,
}

impl OutboundMessage {
    /// Build the message for `post`. Returns `None` when `mentions` is empty.
    #[must_use]
    pub fn from_post(post: &Post, mentions: MentionCount) -> Option<Self> {
        let primary_ticker = mentions.primary()?.to_string();

        Some(Self {
            id: post.id.clone(),
            kind: "post".to_string(),
            primary_ticker,
            content: post.combined_text(),
            author: post.author.clone(),
            score: post.score,
            num_comments: post.num_comments,
            url: post.permalink.clone(),
            created_utc: post.created_utc,
            created: format_created(post.created_utc),
            ticker_mentions: mentions,
        })
    }

    /// Partition key for keyed sinks.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.id
    }
}

/// Out-of-range timestamps fall back to the epoch.
fn format_created(created_utc: i64) -> String {
    DateTime::from_timestamp(created_utc, 0)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}
