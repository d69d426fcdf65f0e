//! `produce`: one full search pass over the constituent terms.
//!
//! Collaborators are built here from config and injected into the pipeline.
//! Search, store, and sink failures are handled inside the run; only startup
//! errors (config, term loading, Reddit authentication) abort the command.

use std::time::Duration;

use tickerpulse_core::{AppConfig, SinkKind};
use tickerpulse_pipeline::{
    connect_shared_tier, DuplicateSuppressor, JsonLinesSink, KafkaRestSink, MessageSink,
    Pipeline, PipelineOptions, RedditClient, SearchOptions, SupabaseClient, SupabaseSink,
};
use tokio::sync::watch;

use crate::terms::load_search_terms;

fn build_sink(config: &AppConfig, dry_run: bool) -> anyhow::Result<Box<dyn MessageSink>> {
    let timeout = Duration::from_secs(config.request_timeout_secs);
    if dry_run {
        tracing::info!("dry run: writing messages to stdout");
        return Ok(Box::new(JsonLinesSink::stdout()));
    }

    let sink: Box<dyn MessageSink> = match config.sink {
        SinkKind::Kafka => {
            tracing::info!(
                url = %config.kafka_rest_url,
                topic = %config.topic,
                "publishing to Kafka REST proxy"
            );
            Box::new(KafkaRestSink::new(&config.kafka_rest_url, &config.topic, timeout)?)
        }
        SinkKind::Supabase => {
            let client = SupabaseClient::new(&config.supabase_credentials()?, timeout)?;
            tracing::info!("publishing to Supabase");
            Box::new(SupabaseSink::new(client))
        }
        SinkKind::Stdout => Box::new(JsonLinesSink::stdout()),
    };
    Ok(sink)
}

fn pipeline_options(config: &AppConfig) -> PipelineOptions {
    PipelineOptions {
        batch_pause: Duration::from_millis(config.batch_pause_ms),
        rate_limit_pause: Duration::from_secs(config.rate_limit_pause_secs),
    }
}

pub(crate) async fn run_produce(config: &AppConfig, dry_run: bool) -> anyhow::Result<()> {
    let terms = load_search_terms(config)?;
    let queries = terms.query_batches(config.search_batch_size);
    let sink = build_sink(config, dry_run)?;

    let credentials = config.reddit_credentials()?;
    let options = SearchOptions {
        limit: config.search_limit,
        request_timeout_secs: config.request_timeout_secs,
        ..SearchOptions::new(config.subreddit.clone())
    };
    let source = RedditClient::connect(&credentials, options).await?;

    let shared = connect_shared_tier(
        config.redis_url.as_deref(),
        Duration::from_secs(config.redis_connect_timeout_secs),
    )
    .await;
    let suppressor = DuplicateSuppressor::new(
        config.seen_set_key(),
        Duration::from_secs(config.seen_ttl_secs),
        shared,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        // Receiver gone means the run already finished.
        let _ = shutdown_tx.send(true);
    });

    tracing::info!(
        subreddit = %config.subreddit,
        batches = queries.len(),
        shared_dedup = suppressor.is_shared(),
        "starting run"
    );

    let mut pipeline = Pipeline::new(
        suppressor,
        &terms,
        &source,
        sink.as_ref(),
        pipeline_options(config),
    );
    let summary = pipeline.run(&queries, shutdown_rx).await;

    eprintln!(
        "batches: {} ({} failed), fetched: {}, duplicates: {}, without mentions: {}, \
         published: {}, publish failures: {}{}",
        summary.batches,
        summary.batches_failed,
        summary.fetched,
        summary.duplicates,
        summary.without_mentions,
        summary.published,
        summary.publish_failed,
        if summary.interrupted { " (interrupted)" } else { "" },
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, stopping at the next post boundary");
}

