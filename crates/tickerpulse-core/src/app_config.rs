use std::path::PathBuf;

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Where outbound post messages are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    /// Kafka topic through the Confluent REST proxy.
    Kafka,
    /// Supabase tables via PostgREST.
    Supabase,
    /// JSON lines on stdout.
    Stdout,
}

impl std::fmt::Display for SinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkKind::Kafka => write!(f, "kafka"),
            SinkKind::Supabase => write!(f, "supabase"),
            SinkKind::Stdout => write!(f, "stdout"),
        }
    }
}

/// Reddit script-app credentials for the client-credentials grant.
#[derive(Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl std::fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[derive(Clone)]
pub struct SupabaseCredentials {
    pub url: String,
    pub key: String,
}

impl std::fmt::Debug for SupabaseCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseCredentials")
            .field("url", &self.url)
            .field("key", &"[redacted]")
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub reddit_client_id: Option<String>,
    pub reddit_client_secret: Option<String>,
    pub reddit_user_agent: String,
    pub subreddit: String,
    pub constituents_path: PathBuf,
    pub request_timeout_secs: u64,
    pub search_batch_size: usize,
    pub search_limit: u32,
    pub batch_pause_ms: u64,
    pub rate_limit_pause_secs: u64,
    pub redis_url: Option<String>,
    pub redis_connect_timeout_secs: u64,
    pub seen_ttl_secs: u64,
    pub sink: SinkKind,
    pub kafka_rest_url: String,
    pub topic: String,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
}

impl AppConfig {
    /// Reddit credentials, required by any command that talks to Reddit.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] naming the first absent variable.
    pub fn reddit_credentials(&self) -> Result<RedditCredentials, ConfigError> {
        let client_id = self
            .reddit_client_id
            .clone()
            .ok_or_else(|| ConfigError::MissingEnvVar("REDDIT_CLIENT_ID".to_string()))?;
        let client_secret = self
            .reddit_client_secret
            .clone()
            .ok_or_else(|| ConfigError::MissingEnvVar("REDDIT_CLIENT_SECRET".to_string()))?;

        Ok(RedditCredentials {
            client_id,
            client_secret,
            user_agent: self.reddit_user_agent.clone(),
        })
    }

    /// Supabase project URL and service key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] naming the first absent variable.
    pub fn supabase_credentials(&self) -> Result<SupabaseCredentials, ConfigError> {
        let url = self
            .supabase_url
            .clone()
            .ok_or_else(|| ConfigError::MissingEnvVar("SUPABASE_URL".to_string()))?;
        let key = self
            .supabase_key
            .clone()
            .ok_or_else(|| ConfigError::MissingEnvVar("SUPABASE_KEY".to_string()))?;

        Ok(SupabaseCredentials { url, key })
    }

    /// Redis key holding the shared seen-set for the configured subreddit.
    #[must_use]
    pub fn seen_set_key(&self) -> String {
        format!("reddit:seen_posts:{}", self.subreddit)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("reddit_client_id", &self.reddit_client_id)
            .field(
                "reddit_client_secret",
                &self.reddit_client_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("reddit_user_agent", &self.reddit_user_agent)
            .field("subreddit", &self.subreddit)
            .field("constituents_path", &self.constituents_path)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("search_batch_size", &self.search_batch_size)
            .field("search_limit", &self.search_limit)
            .field("batch_pause_ms", &self.batch_pause_ms)
            .field("rate_limit_pause_secs", &self.rate_limit_pause_secs)
            .field("redis_url", &self.redis_url.as_ref().map(|_| "[redacted]"))
            .field(
                "redis_connect_timeout_secs",
                &self.redis_connect_timeout_secs,
            )
            .field("seen_ttl_secs", &self.seen_ttl_secs)
            .field("sink", &self.sink)
            .field("kafka_rest_url", &self.kafka_rest_url)
            .field("topic", &self.topic)
            .field("supabase_url", &self.supabase_url)
            .field(
                "supabase_key",
                &self.supabase_key.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}
