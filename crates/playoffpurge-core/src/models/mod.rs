//! Data models for the league sheet.
//!
//! - `Team`, `TeamStatus`, `TeamDetail`: standings rows and a team with its roster
//! - `RosterEntry`: one rostered player for one week
//! - `LeagueMeta`, `RosterRequirement`: league key/values and weekly slot rules
//! - `LeagueSnapshot`: everything read from the sheet in one fetch

pub mod league;
pub mod roster;
pub mod team;

pub use league::{LeagueMeta, LeagueSnapshot, RosterRequirement};
pub use roster::{position_rank, RosterEntry};
pub use team::{Team, TeamDetail, TeamStatus};
