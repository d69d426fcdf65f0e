use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("REDDIT_CLIENT_ID", "client-id");
    m.insert("REDDIT_CLIENT_SECRET", "client-secret");
    m
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "TICKERPULSE_ENV"));
}

#[test]
fn parse_sink_kind_is_case_insensitive() {
    assert_eq!(parse_sink_kind("Kafka").unwrap(), SinkKind::Kafka);
    assert_eq!(parse_sink_kind("SUPABASE").unwrap(), SinkKind::Supabase);
    assert_eq!(parse_sink_kind("stdout").unwrap(), SinkKind::Stdout);
}

#[test]
fn parse_sink_kind_unknown_fails() {
    let err = parse_sink_kind("rabbitmq").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "TICKERPULSE_SINK"));
}

#[test]
fn build_app_config_defaults() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.reddit_user_agent, "tickerpulse/0.1 (ticker-mentions)");
    assert_eq!(cfg.subreddit, "wallstreetbets");
    assert_eq!(
        cfg.constituents_path,
        std::path::PathBuf::from("./constituents.csv")
    );
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.search_batch_size, 20);
    assert_eq!(cfg.search_limit, 100);
    assert_eq!(cfg.batch_pause_ms, 1000);
    assert_eq!(cfg.rate_limit_pause_secs, 60);
    assert!(cfg.redis_url.is_none());
    assert_eq!(cfg.redis_connect_timeout_secs, 5);
    assert_eq!(cfg.seen_ttl_secs, 7 * 24 * 3600);
    assert_eq!(cfg.sink, SinkKind::Kafka);
    assert_eq!(cfg.kafka_rest_url, "http://localhost:8082");
    assert_eq!(cfg.topic, "reddit-wsb-posts-kafka");
    assert!(cfg.supabase_url.is_none());
    assert!(cfg.supabase_key.is_none());
}

#[test]
fn build_app_config_without_reddit_credentials_still_loads() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let err = cfg.reddit_credentials().unwrap_err();
    assert!(
        matches!(err, ConfigError::MissingEnvVar(ref v) if v == "REDDIT_CLIENT_ID"),
        "expected MissingEnvVar(REDDIT_CLIENT_ID), got: {err:?}"
    );
}

#[test]
fn reddit_credentials_require_secret() {
    let mut map: HashMap<&str, &str> = HashMap::new();
    map.insert("REDDIT_CLIENT_ID", "client-id");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let err = cfg.reddit_credentials().unwrap_err();
    assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "REDDIT_CLIENT_SECRET"));
}

#[test]
fn reddit_credentials_carry_user_agent() {
    let mut map = full_env();
    map.insert("REDDIT_USER_AGENT", "custom-agent/2.0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let creds = cfg.reddit_credentials().unwrap();
    assert_eq!(creds.client_id, "client-id");
    assert_eq!(creds.client_secret, "client-secret");
    assert_eq!(creds.user_agent, "custom-agent/2.0");
}

#[test]
fn blank_redis_url_means_local_only() {
    let mut map = full_env();
    map.insert("TICKERPULSE_REDIS_URL", "  ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.redis_url.is_none());
}

#[test]
fn redis_url_override() {
    let mut map = full_env();
    map.insert("TICKERPULSE_REDIS_URL", "redis://cache:6379/0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.redis_url.as_deref(), Some("redis://cache:6379/0"));
}

#[test]
fn seen_ttl_secs_invalid() {
    let mut map = full_env();
    map.insert("TICKERPULSE_SEEN_TTL_SECS", "a week");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(
            result,
            Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TICKERPULSE_SEEN_TTL_SECS"
        ),
        "expected InvalidEnvVar(TICKERPULSE_SEEN_TTL_SECS), got: {result:?}"
    );
}

#[test]
fn search_batch_size_override() {
    let mut map = full_env();
    map.insert("TICKERPULSE_SEARCH_BATCH_SIZE", "5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.search_batch_size, 5);
}

#[test]
fn search_batch_size_zero_rejected() {
    let mut map = full_env();
    map.insert("TICKERPULSE_SEARCH_BATCH_SIZE", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(
            result,
            Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TICKERPULSE_SEARCH_BATCH_SIZE"
        ),
        "expected InvalidEnvVar(TICKERPULSE_SEARCH_BATCH_SIZE), got: {result:?}"
    );
}

#[test]
fn empty_subreddit_rejected() {
    let mut map = full_env();
    map.insert("TICKERPULSE_SUBREDDIT", "");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(
        result,
        Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TICKERPULSE_SUBREDDIT"
    ));
}

#[test]
fn rate_limit_pause_secs_invalid() {
    let mut map = full_env();
    map.insert("TICKERPULSE_RATE_LIMIT_PAUSE_SECS", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(
        result,
        Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TICKERPULSE_RATE_LIMIT_PAUSE_SECS"
    ));
}

#[test]
fn supabase_credentials_require_both_values() {
    let mut map = full_env();
    map.insert("SUPABASE_URL", "https://project.supabase.co");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let err = cfg.supabase_credentials().unwrap_err();
    assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "SUPABASE_KEY"));

    map.insert("SUPABASE_KEY", "service-key");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let creds = cfg.supabase_credentials().unwrap();
    assert_eq!(creds.url, "https://project.supabase.co");
    assert_eq!(creds.key, "service-key");
}

#[test]
fn seen_set_key_is_scoped_by_subreddit() {
    let mut map = full_env();
    map.insert("TICKERPULSE_SUBREDDIT", "stocks");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.seen_set_key(), "reddit:seen_posts:stocks");
}

#[test]
fn debug_output_redacts_secrets() {
    let mut map = full_env();
    map.insert("SUPABASE_KEY", "service-key");
    map.insert("TICKERPULSE_REDIS_URL", "redis://:hunter2@cache:6379/0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("client-secret"));
    assert!(!rendered.contains("service-key"));
    assert!(!rendered.contains("hunter2"));
    assert!(rendered.contains("[redacted]"));
}
