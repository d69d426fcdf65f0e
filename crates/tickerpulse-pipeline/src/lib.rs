//! Ticker-mention pipeline for tickerpulse.
//!
//! Searches a subreddit for posts mentioning index constituents, suppresses
//! posts already forwarded (in-process set backed by an optional shared Redis
//! set), counts ticker mentions per post, and hands qualifying posts to a
//! message sink (Kafka REST proxy, Supabase, or JSON lines).

pub mod dedup;
pub mod driver;
pub mod error;
pub mod mentions;
pub mod message;
pub mod sinks;
pub mod sources;
pub mod types;

pub use dedup::{
    connect_shared_tier, DuplicateSuppressor, MemorySeenStore, RedisSeenStore, SeenStore,
    SharedTier,
};
pub use driver::{Pipeline, PipelineOptions, PostOutcome, RunSummary};
pub use error::{SinkError, SourceError, StoreError};
pub use mentions::{count_mentions, MentionCount};
pub use message::OutboundMessage;
pub use sinks::{JsonLinesSink, KafkaRestSink, MessageSink, SupabaseClient, SupabaseSink};
pub use sources::{PostSource, RedditClient, SearchOptions};
pub use types::Post;
