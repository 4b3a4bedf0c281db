//! PlayoffPurge web dashboard.
//!
//! Serves the league standings as server-rendered HTML plus a small JSON
//! API, all read through the core `LeagueCache`.

pub mod auth;
pub mod error;
pub mod routes;
pub mod state;
pub mod templates;

pub use routes::build_router;
pub use state::{AppState, SiteSettings};
