use serde::{Deserialize, Serialize};

use super::{RosterEntry, Team, TeamDetail};
use crate::utils::{eq_ignore_case, normalize_key};

const DEFAULT_LEAGUE_NAME: &str = "PlayoffPurge";
const DEFAULT_CURRENT_WEEK: &str = "Week 18";
const DEFAULT_LAST_UPDATED: &str = "Unknown";

/// Key/value settings from the `League_Meta` tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct LeagueMeta {
    pub league_name: String,
    pub current_week: String,
    pub last_updated: String,
}

impl Default for LeagueMeta {
    fn default() -> Self {
        Self {
            league_name: DEFAULT_LEAGUE_NAME.to_string(),
            current_week: DEFAULT_CURRENT_WEEK.to_string(),
            last_updated: DEFAULT_LAST_UPDATED.to_string(),
        }
    }
}

impl LeagueMeta {
    /// Build from raw key/value cells. Keys like `Current Week` normalize to
    /// `current_week`; unknown keys are ignored and blank values keep the
    /// default. A repeated key takes its last value.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut meta = Self::default();
        for (key, value) in pairs {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match normalize_key(key).as_str() {
                "league_name" => meta.league_name = value.to_string(),
                "current_week" => meta.current_week = value.to_string(),
                "last_updated" => meta.last_updated = value.to_string(),
                _ => {}
            }
        }
        meta
    }
}

/// One row of the `Roster_Requirements` tab. Reference only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct RosterRequirement {
    pub week: String,
    pub teams_left: u32,
    /// Comma separated slot list, e.g. `QB, RB, WR, FLEX`.
    pub positions_required: String,
    pub payout: String,
}

impl RosterRequirement {
    pub fn positions(&self) -> Vec<String> {
        self.positions_required
            .split(',')
            .map(|p| p.trim().to_uppercase())
            .filter(|p| !p.is_empty())
            .collect()
    }

    pub fn matches_week(&self, week: &str) -> bool {
        eq_ignore_case(&self.week, week)
    }
}

/// Everything read from the sheet in a single fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeagueSnapshot {
    pub meta: LeagueMeta,
    /// Sorted by seed.
    pub teams: Vec<Team>,
    /// Sheet order, all weeks.
    pub rosters: Vec<RosterEntry>,
    pub requirements: Vec<RosterRequirement>,
}

impl LeagueSnapshot {
    pub fn team(&self, team_id: u32) -> Option<&Team> {
        self.teams.iter().find(|t| t.team_id == team_id)
    }

    /// Roster rows for one team, or all of them when `team_id` is `None`.
    pub fn rosters_for(&self, team_id: Option<u32>) -> Vec<RosterEntry> {
        self.rosters
            .iter()
            .filter(|e| team_id.map_or(true, |id| e.team_id == id))
            .cloned()
            .collect()
    }

    fn roster_in_week(&self, team_id: u32, week: &str) -> Vec<RosterEntry> {
        self.rosters
            .iter()
            .filter(|e| e.team_id == team_id && e.in_week(week))
            .cloned()
            .collect()
    }

    /// The team plus its roster for the league's current week.
    pub fn team_detail(&self, team_id: u32) -> Option<TeamDetail> {
        let team = self.team(team_id)?.clone();
        let week = self.meta.current_week.clone();
        let roster = self.roster_in_week(team_id, &week);
        Some(TeamDetail::new(team, week, roster))
    }

    /// Every team with its current-week roster, in seed order.
    pub fn teams_with_rosters(&self) -> Vec<TeamDetail> {
        let week = &self.meta.current_week;
        self.teams
            .iter()
            .map(|team| {
                let roster = self.roster_in_week(team.team_id, week);
                TeamDetail::new(team.clone(), week.clone(), roster)
            })
            .collect()
    }

    pub fn requirement_for_week(&self, week: &str) -> Option<&RosterRequirement> {
        self.requirements.iter().find(|r| r.matches_week(week))
    }
}
