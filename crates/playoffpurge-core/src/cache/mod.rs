//! In-memory caching of the league sheet.
//!
//! `LeagueCache` holds one `LeagueSnapshot` for a fixed TTL (five minutes by
//! default) and re-reads the sheet on the first access after it expires, or
//! when an admin forces a refresh. If the sheet cannot be read, the previous
//! snapshot keeps being served until a fetch succeeds.

pub mod manager;

pub use manager::{CacheStatus, CachedData, LeagueCache, SnapshotSource};
