use serde::{Deserialize, Serialize};

use crate::utils::eq_ignore_case;

/// Lineup order used when listing a roster. Unknown positions sort last.
pub fn position_rank(position: &str) -> u8 {
    match position.trim().to_uppercase().as_str() {
        "QB" => 0,
        "SUPERFLEX" => 1,
        "RB" => 2,
        "WR" => 3,
        "TE" => 4,
        "FLEX" => 5,
        "K" => 6,
        "DST" | "DEF" => 7,
        _ => 99,
    }
}

/// One row of the `Rosters` tab: a player on a fantasy team for one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct RosterEntry {
    pub team_id: u32,
    pub week: String,
    pub position: String,
    pub player_name: String,
    /// NFL team abbreviation.
    pub team: String,
    pub points: f64,
    pub projected_points: f64,
    pub status: String,
    /// Slots the player may fill, e.g. `WR/FLEX`.
    pub roster_eligibility: String,
}

impl RosterEntry {
    pub fn new(
        team_id: u32,
        week: impl Into<String>,
        position: impl Into<String>,
        player_name: impl Into<String>,
        team: impl Into<String>,
        points: f64,
    ) -> Self {
        let position = position.into();
        let roster_eligibility = Self::default_eligibility(&position);
        Self {
            team_id,
            week: week.into(),
            position,
            player_name: player_name.into(),
            team: team.into(),
            points,
            projected_points: 0.0,
            status: "active".to_string(),
            roster_eligibility,
        }
    }

    /// RB, WR and TE are FLEX-eligible by default; everything else only
    /// fills its own position.
    pub fn default_eligibility(position: &str) -> String {
        let pos = position.trim().to_uppercase();
        match pos.as_str() {
            "RB" | "WR" | "TE" => format!("{}/FLEX", pos),
            _ => pos,
        }
    }

    pub fn eligible_positions(&self) -> Vec<&str> {
        self.roster_eligibility
            .split('/')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect()
    }

    /// Whether this player may occupy a lineup slot such as `FLEX` or `QB`.
    pub fn can_fill(&self, slot: &str) -> bool {
        let slot = slot.trim().to_uppercase();
        let pos = self.position.trim().to_uppercase();
        match slot.as_str() {
            "SUPERFLEX" => matches!(pos.as_str(), "QB" | "RB" | "WR" | "TE"),
            "FLEX" => matches!(pos.as_str(), "RB" | "WR" | "TE"),
            _ => self
                .eligible_positions()
                .iter()
                .any(|p| p.eq_ignore_ascii_case(&slot)),
        }
    }

    pub fn position_rank(&self) -> u8 {
        position_rank(&self.position)
    }

    pub fn in_week(&self, week: &str) -> bool {
        eq_ignore_case(&self.week, week)
    }

    pub fn is_active(&self) -> bool {
        eq_ignore_case(&self.status, "active")
    }
}
