//! Reddit search client (client-credentials OAuth).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tickerpulse_core::RedditCredentials;

use super::reddit_helpers::{listing_to_posts, Listing};
use super::PostSource;
use crate::error::SourceError;
use crate::types::Post;

const AUTH_BASE_URL: &str = "https://www.reddit.com";
const API_BASE_URL: &str = "https://oauth.reddit.com";
/// Reddit caps listing pages at 100 items.
const MAX_PAGE_SIZE: u32 = 100;

/// Search parameters applied to every query.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub subreddit: String,
    /// Maximum posts returned per query, across pages.
    pub limit: u32,
    pub sort: String,
    pub time_filter: String,
    pub request_timeout_secs: u64,
}

impl SearchOptions {
    /// Top posts of the past month, 100 per query.
    #[must_use]
    pub fn new(subreddit: impl Into<String>) -> Self {
        Self {
            subreddit: subreddit.into(),
            limit: 100,
            sort: "top".to_string(),
            time_filter: "month".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Reddit API client holding an application-only access token.
pub struct RedditClient {
    client: reqwest::Client,
    token: String,
    user_agent: String,
    api_base: String,
    options: SearchOptions,
}

impl std::fmt::Debug for RedditClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedditClient")
            .field("token", &"[redacted]")
            .field("user_agent", &self.user_agent)
            .field("api_base", &self.api_base)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl RedditClient {
    /// Exchange client credentials for a token against production Reddit.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Auth`] if the token exchange is rejected and
    /// [`SourceError::Http`] on network failure.
    pub async fn connect(
        credentials: &RedditCredentials,
        options: SearchOptions,
    ) -> Result<Self, SourceError> {
        Self::connect_with_base_urls(credentials, options, AUTH_BASE_URL, API_BASE_URL).await
    }

    /// Same as [`RedditClient::connect`] with custom endpoints (for wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Auth`] if the token exchange is rejected and
    /// [`SourceError::Http`] on network failure.
    pub async fn connect_with_base_urls(
        credentials: &RedditCredentials,
        options: SearchOptions,
        auth_base: &str,
        api_base: &str,
    ) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&credentials.user_agent)
            .build()?;

        let token = Self::fetch_token(&client, credentials, auth_base).await?;
        tracing::info!(subreddit = %options.subreddit, "authenticated with Reddit");

        Ok(Self {
            client,
            token,
            user_agent: credentials.user_agent.clone(),
            api_base: api_base.trim_end_matches('/').to_string(),
            options,
        })
    }

    async fn fetch_token(
        client: &reqwest::Client,
        credentials: &RedditCredentials,
        auth_base: &str,
    ) -> Result<String, SourceError> {
        let url = format!("{}/api/v1/access_token", auth_base.trim_end_matches('/'));
        let response = client
            .post(&url)
            .header("User-Agent", &credentials.user_agent)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Auth(format!(
                "token exchange failed with status {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| SourceError::Deserialize {
                context: "access_token".to_string(),
                source: e,
            })?;

        Ok(token.access_token)
    }

    async fn search_page(
        &self,
        query: &str,
        page_size: u32,
        after: Option<&str>,
    ) -> Result<Listing, SourceError> {
        let url = format!("{}/r/{}/search", self.api_base, self.options.subreddit);
        let mut params: Vec<(&str, String)> = vec![
            ("q", query.to_string()),
            ("sort", self.options.sort.clone()),
            ("t", self.options.time_filter.clone()),
            ("limit", page_size.to_string()),
            ("restrict_sr", "on".to_string()),
            ("raw_json", "1".to_string()),
        ];
        if let Some(cursor) = after {
            params.push(("after", cursor.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header("User-Agent", &self.user_agent)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            return Err(SourceError::RateLimited { retry_after_secs });
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(SourceError::Auth("access token rejected".to_string()));
        }
        if !status.is_success() {
            return Err(SourceError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| SourceError::Deserialize {
            context: format!("search listing for r/{}", self.options.subreddit),
            source: e,
        })
    }
}

#[async_trait]
impl PostSource for RedditClient {
    async fn search(&self, query: &str) -> Result<Vec<Post>, SourceError> {
        let mut posts = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let remaining = self
                .options
                .limit
                .saturating_sub(u32::try_from(posts.len()).unwrap_or(u32::MAX));
            if remaining == 0 {
                break;
            }
            let page_size = remaining.min(MAX_PAGE_SIZE);

            let listing = self.search_page(query, page_size, after.as_deref()).await?;
            after = listing.data.after.clone();
            let page = listing_to_posts(listing);
            let page_len = page.len();
            posts.extend(page);

            if after.is_none() || page_len == 0 {
                break;
            }
        }

        posts.truncate(usize::try_from(self.options.limit).unwrap_or(usize::MAX));

        tracing::debug!(
            subreddit = %self.options.subreddit,
            posts = posts.len(),
            "search returned posts"
        );
        Ok(posts)
    }
}
