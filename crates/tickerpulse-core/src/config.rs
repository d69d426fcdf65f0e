use crate::app_config::{AppConfig, Environment, SinkKind};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Blank values count as unset so `.env` templates can leave them empty.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("TICKERPULSE_ENV", "development"))?;
    let log_level = or_default("TICKERPULSE_LOG_LEVEL", "info");

    let reddit_client_id = optional("REDDIT_CLIENT_ID");
    let reddit_client_secret = optional("REDDIT_CLIENT_SECRET");
    let reddit_user_agent = or_default("REDDIT_USER_AGENT", "tickerpulse/0.1 (ticker-mentions)");

    let subreddit = or_default("TICKERPULSE_SUBREDDIT", "wallstreetbets");
    if subreddit.trim().is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "TICKERPULSE_SUBREDDIT".to_string(),
            reason: "must be non-empty".to_string(),
        });
    }
    let constituents_path = PathBuf::from(or_default(
        "TICKERPULSE_CONSTITUENTS_PATH",
        "./constituents.csv",
    ));

    let request_timeout_secs = parse_u64("TICKERPULSE_REQUEST_TIMEOUT_SECS", "30")?;
    let search_batch_size = parse_usize("TICKERPULSE_SEARCH_BATCH_SIZE", "20")?;
    if search_batch_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "TICKERPULSE_SEARCH_BATCH_SIZE".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let search_limit = parse_u32("TICKERPULSE_SEARCH_LIMIT", "100")?;
    let batch_pause_ms = parse_u64("TICKERPULSE_BATCH_PAUSE_MS", "1000")?;
    let rate_limit_pause_secs = parse_u64("TICKERPULSE_RATE_LIMIT_PAUSE_SECS", "60")?;

    let redis_url = optional("TICKERPULSE_REDIS_URL");
    let redis_connect_timeout_secs = parse_u64("TICKERPULSE_REDIS_CONNECT_TIMEOUT_SECS", "5")?;
    let seen_ttl_secs = parse_u64("TICKERPULSE_SEEN_TTL_SECS", "604800")?;

    let sink = parse_sink_kind(&or_default("TICKERPULSE_SINK", "kafka"))?;
    let kafka_rest_url = or_default("KAFKA_REST_URL", "http://localhost:8082");
    let topic = or_default("TICKERPULSE_TOPIC", "reddit-wsb-posts-kafka");
    let supabase_url = optional("SUPABASE_URL");
    let supabase_key = optional("SUPABASE_KEY");

    Ok(AppConfig {
        env,
        log_level,
        reddit_client_id,
        reddit_client_secret,
        reddit_user_agent,
        subreddit,
        constituents_path,
        request_timeout_secs,
        search_batch_size,
        search_limit,
        batch_pause_ms,
        rate_limit_pause_secs,
        redis_url,
        redis_connect_timeout_secs,
        seen_ttl_secs,
        sink,
        kafka_rest_url,
        topic,
        supabase_url,
        supabase_key,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TICKERPULSE_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_sink_kind(s: &str) -> Result<SinkKind, ConfigError> {
    match s.to_ascii_lowercase().as_str() {
        "kafka" => Ok(SinkKind::Kafka),
        "supabase" => Ok(SinkKind::Supabase),
        "stdout" => Ok(SinkKind::Stdout),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TICKERPULSE_SINK".to_string(),
            reason: format!("unknown sink '{other}'; expected kafka, supabase or stdout"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
