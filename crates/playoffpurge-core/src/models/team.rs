use std::fmt;

use serde::{Deserialize, Serialize};

use super::RosterEntry;

/// Where a team stands in the guillotine bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum TeamStatus {
    Active,
    Eliminated,
    Champion,
}

impl TeamStatus {
    /// Parse a status cell. Case and surrounding whitespace are ignored;
    /// anything outside the three known values is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(TeamStatus::Active),
            "eliminated" => Some(TeamStatus::Eliminated),
            "champion" => Some(TeamStatus::Champion),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TeamStatus::Active => "active",
            TeamStatus::Eliminated => "eliminated",
            TeamStatus::Champion => "champion",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            TeamStatus::Active => "✅",
            TeamStatus::Eliminated => "❌",
            TeamStatus::Champion => "🏆",
        }
    }
}

impl fmt::Display for TeamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the `Teams` tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Team {
    pub team_id: u32,
    pub owner_name: String,
    pub team_name: String,
    pub seed: u32,
    pub status: TeamStatus,
    /// Computed by a formula in the sheet, never summed here.
    pub total_points: f64,
    pub current_week: String,
}

impl Team {
    pub fn is_active(&self) -> bool {
        self.status == TeamStatus::Active
    }

    pub fn is_eliminated(&self) -> bool {
        self.status == TeamStatus::Eliminated
    }

    pub fn is_champion(&self) -> bool {
        self.status == TeamStatus::Champion
    }

    /// Team name, falling back to the owner when the sheet leaves it blank.
    pub fn display_name(&self) -> &str {
        if self.team_name.trim().is_empty() {
            &self.owner_name
        } else {
            &self.team_name
        }
    }
}

/// A team together with its roster for the league's current week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct TeamDetail {
    #[serde(flatten)]
    #[cfg_attr(feature = "ts", ts(flatten))]
    pub team: Team,
    pub week: String,
    pub roster: Vec<RosterEntry>,
    pub roster_points: f64,
    pub projected_points: f64,
}

impl TeamDetail {
    /// Build a detail view; `roster` is expected to already be filtered to
    /// this team and week. Entries are put in lineup order.
    pub fn new(team: Team, week: impl Into<String>, mut roster: Vec<RosterEntry>) -> Self {
        roster.sort_by_key(|entry| entry.position_rank());
        let roster_points = roster.iter().map(|e| e.points).sum();
        let projected_points = roster.iter().map(|e| e.projected_points).sum();
        Self {
            team,
            week: week.into(),
            roster,
            roster_points,
            projected_points,
        }
    }
}
