//! Sequential search → dedup → count → publish loop.

use std::time::Duration;

use tickerpulse_core::SearchTerms;
use tokio::sync::watch;

use crate::dedup::{DuplicateSuppressor, SeenStore};
use crate::error::SourceError;
use crate::mentions::count_mentions;
use crate::message::OutboundMessage;
use crate::sinks::MessageSink;
use crate::sources::PostSource;
use crate::types::Post;

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Pause after every batch except the last.
    pub batch_pause: Duration,
    /// Pause after a batch that was rate limited, instead of `batch_pause`.
    pub rate_limit_pause: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            batch_pause: Duration::from_secs(1),
            rate_limit_pause: Duration::from_secs(60),
        }
    }
}

/// What happened to a single post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOutcome {
    Duplicate,
    NoMentions,
    Published,
    PublishFailed,
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub batches: usize,
    pub batches_failed: usize,
    pub fetched: usize,
    pub duplicates: usize,
    pub without_mentions: usize,
    pub published: usize,
    pub publish_failed: usize,
    /// Stopped early by a shutdown signal.
    pub interrupted: bool,
}

impl RunSummary {
    fn record(&mut self, outcome: PostOutcome) {
        match outcome {
            PostOutcome::Duplicate => self.duplicates += 1,
            PostOutcome::NoMentions => self.without_mentions += 1,
            PostOutcome::Published => self.published += 1,
            PostOutcome::PublishFailed => self.publish_failed += 1,
        }
    }
}

/// Owns the duplicate suppressor and borrows the injected collaborators.
pub struct Pipeline<'a, S> {
    suppressor: DuplicateSuppressor<S>,
    terms: &'a SearchTerms,
    source: &'a dyn PostSource,
    sink: &'a dyn MessageSink,
    options: PipelineOptions,
}

impl<'a, S: SeenStore> Pipeline<'a, S> {
    pub fn new(
        suppressor: DuplicateSuppressor<S>,
        terms: &'a SearchTerms,
        source: &'a dyn PostSource,
        sink: &'a dyn MessageSink,
        options: PipelineOptions,
    ) -> Self {
        Self {
            suppressor,
            terms,
            source,
            sink,
            options,
        }
    }

    #[must_use]
    pub fn suppressor(&self) -> &DuplicateSuppressor<S> {
        &self.suppressor
    }

    /// Dedup, count, and publish one post. Sink failures are logged, never raised.
    pub async fn process_post(&mut self, post: &Post) -> PostOutcome {
        if !self.suppressor.is_new(&post.id).await {
            return PostOutcome::Duplicate;
        }

        let mentions = count_mentions(&post.combined_text(), self.terms);
        let Some(message) = OutboundMessage::from_post(post, mentions) else {
            tracing::debug!(post_id = %post.id, "no ticker mentions");
            return PostOutcome::NoMentions;
        };

        match self.sink.publish(&message).await {
            Ok(()) => {
                tracing::info!(
                    post_id = %message.id,
                    primary_ticker = %message.primary_ticker,
                    mentions = message.ticker_mentions.total(),
                    "published post"
                );
                PostOutcome::Published
            }
            Err(e) => {
                tracing::error!(post_id = %message.id, error = %e, "publish failed");
                PostOutcome::PublishFailed
            }
        }
    }

    /// Run every query in order until done or `shutdown` turns `true`.
    ///
    /// Shutdown is observed between posts, between batches, and during
    /// pauses. A failed search skips its batch; the run continues.
    pub async fn run(
        &mut self,
        queries: &[String],
        mut shutdown: watch::Receiver<bool>,
    ) -> RunSummary {
        let mut summary = RunSummary::default();

        'batches: for (index, query) in queries.iter().enumerate() {
            if *shutdown.borrow() {
                summary.interrupted = true;
                break;
            }

            summary.batches += 1;
            let batch = index + 1;
            tracing::info!(batch, total = queries.len(), "searching batch");

            let pause = match self.source.search(query).await {
                Ok(posts) => {
                    summary.fetched += posts.len();
                    for post in &posts {
                        if *shutdown.borrow() {
                            summary.interrupted = true;
                            break 'batches;
                        }
                        let outcome = self.process_post(post).await;
                        summary.record(outcome);
                    }
                    self.options.batch_pause
                }
                Err(SourceError::RateLimited { retry_after_secs }) => {
                    summary.batches_failed += 1;
                    tracing::warn!(
                        batch,
                        retry_after_secs = ?retry_after_secs,
                        pause_secs = self.options.rate_limit_pause.as_secs(),
                        "rate limited; backing off"
                    );
                    self.options.rate_limit_pause
                }
                Err(e) => {
                    summary.batches_failed += 1;
                    tracing::error!(batch, error = %e, "search failed; skipping batch");
                    self.options.batch_pause
                }
            };

            if batch < queries.len() && !pause_unless_shutdown(pause, &mut shutdown).await {
                summary.interrupted = true;
                break;
            }
        }

        if let Err(e) = self.sink.flush().await {
            tracing::warn!(error = %e, "sink flush failed");
        }

        tracing::info!(
            batches = summary.batches,
            batches_failed = summary.batches_failed,
            fetched = summary.fetched,
            duplicates = summary.duplicates,
            without_mentions = summary.without_mentions,
            published = summary.published,
            publish_failed = summary.publish_failed,
            interrupted = summary.interrupted,
            "run finished"
        );
        summary
    }
}

/// Sleep for `duration`. Returns `false` if shutdown was requested first.
async fn pause_unless_shutdown(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
        return false;
    }
    if duration.is_zero() {
        return true;
    }
    tokio::select! {
        () = tokio::time::sleep(duration) => true,
        () = wait_for_shutdown(shutdown) => false,
    }
}

async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            // Sender gone: shutdown can no longer be requested.
            std::future::pending::<()>().await;
        }
    }
}
