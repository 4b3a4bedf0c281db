//! Core library for the PlayoffPurge dashboard.
//!
//! Reads a guillotine playoff league out of a Google Sheet and keeps it in an
//! in-memory TTL cache:
//!
//! - `sheets`: Sheets API client and row-to-record parsing
//! - `auth`: service-account token exchange
//! - `cache`: the read-through `LeagueCache`
//! - `models`: teams, rosters and league metadata
//! - `config`: environment-driven settings

pub mod auth;
pub mod cache;
pub mod config;
pub mod models;
pub mod sheets;
pub mod utils;

pub use cache::{CacheStatus, LeagueCache, SnapshotSource};
pub use config::{Config, ConfigError, Credentials};
pub use models::{
    LeagueMeta, LeagueSnapshot, RosterEntry, RosterRequirement, Team, TeamDetail, TeamStatus,
};
pub use sheets::{SheetsClient, SheetsError};
