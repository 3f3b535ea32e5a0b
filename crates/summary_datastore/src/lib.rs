//! # DataStore Module
//!
//! Persistence for computed video summaries. Every computed summary is written
//! as one immutable row in `video_summaries`; rows are never updated and a
//! lookup by video id always resolves to the most recently created row.
//!
//! The module uses sqlx for database operations and exposes the domain types
//! shared by the summarization pipeline.

mod datastore;
mod domain;

pub use datastore::postgres::PgDataStore;
pub use datastore::DataStore;
pub use domain::{CacheRecord, KeyPoint, StructuredSummary, VideoMetadata};
