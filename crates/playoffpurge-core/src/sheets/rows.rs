//! Row-to-record mapping for the league tabs.
//!
//! Cells arrive as JSON values (`UNFORMATTED_VALUE` render mode), so a
//! number column may hold a JSON number or a string typed by hand. Rows the
//! mapping cannot make sense of are skipped with a warning rather than
//! failing the whole fetch.

use std::collections::HashMap;

use serde_json::Value;
use tracing::warn;

use super::SheetsError;
use crate::models::{LeagueMeta, LeagueSnapshot, RosterEntry, RosterRequirement, Team, TeamStatus};

/// One sheet row as returned by the API.
pub type Row = Vec<Value>;

/// A tab and the A1 cell block read from it. Row 1 is the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabRange {
    pub tab: &'static str,
    pub cells: &'static str,
}

impl TabRange {
    pub fn a1(&self) -> String {
        format!("{}!{}", self.tab, self.cells)
    }
}

pub const LEAGUE_META: TabRange = TabRange { tab: "League_Meta", cells: "A2:B50" };
pub const TEAMS: TabRange = TabRange { tab: "Teams", cells: "A2:G100" };
pub const ROSTERS: TabRange = TabRange { tab: "Rosters", cells: "A2:I500" };
pub const ROSTER_REQUIREMENTS: TabRange = TabRange { tab: "Roster_Requirements", cells: "A2:D50" };

/// Every range that makes up a `LeagueSnapshot`, in fetch order.
pub const SNAPSHOT_RANGES: [TabRange; 4] = [LEAGUE_META, TEAMS, ROSTERS, ROSTER_REQUIREMENTS];

const TEAM_COLUMNS: usize = 7;
const ROSTER_MIN_COLUMNS: usize = 6;
const REQUIREMENT_COLUMNS: usize = 4;

// ===== Cell helpers =====

fn cell(row: &[Value], idx: usize) -> String {
    match row.get(idx) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn parse_float(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Integers may come back as `3`, `"3"` or `3.0`.
fn parse_int(raw: &str) -> Option<u32> {
    let value = parse_float(raw)?;
    if value.fract() == 0.0 && value >= 0.0 && value <= u32::MAX as f64 {
        Some(value as u32)
    } else {
        None
    }
}

fn float_cell(row: &[Value], idx: usize) -> f64 {
    parse_float(&cell(row, idx)).unwrap_or(0.0)
}

fn is_blank(row: &[Value]) -> bool {
    (0..row.len()).all(|idx| cell(row, idx).is_empty())
}

// ===== Tabs =====

pub fn parse_league_meta(rows: &[Row]) -> LeagueMeta {
    let pairs: Vec<(String, String)> = rows
        .iter()
        .filter(|row| row.len() >= 2)
        .map(|row| (cell(row, 0), cell(row, 1)))
        .collect();
    LeagueMeta::from_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
}

/// Parse the `Teams` tab, sorted by seed (then team id).
pub fn parse_teams(rows: &[Row]) -> Vec<Team> {
    let mut teams = Vec::with_capacity(rows.len());

    for (idx, row) in rows.iter().enumerate() {
        if is_blank(row) {
            continue;
        }
        if row.len() < TEAM_COLUMNS {
            warn!(tab = TEAMS.tab, row = idx + 2, cells = row.len(), "Skipping incomplete team row");
            continue;
        }

        let (Some(team_id), Some(seed)) = (parse_int(&cell(row, 0)), parse_int(&cell(row, 3)))
        else {
            warn!(tab = TEAMS.tab, row = idx + 2, "Skipping team row with non-numeric id or seed");
            continue;
        };

        let raw_status = cell(row, 4);
        let Some(status) = TeamStatus::parse(&raw_status) else {
            warn!(tab = TEAMS.tab, row = idx + 2, status = %raw_status, "Skipping team row with unknown status");
            continue;
        };

        teams.push(Team {
            team_id,
            owner_name: cell(row, 1),
            team_name: cell(row, 2),
            seed,
            status,
            total_points: float_cell(row, 5),
            current_week: cell(row, 6),
        });
    }

    teams.sort_by_key(|t| (t.seed, t.team_id));
    teams
}

/// Parse the `Rosters` tab, keeping sheet order.
pub fn parse_rosters(rows: &[Row]) -> Vec<RosterEntry> {
    let mut entries = Vec::with_capacity(rows.len());

    for (idx, row) in rows.iter().enumerate() {
        if is_blank(row) {
            continue;
        }
        if row.len() < ROSTER_MIN_COLUMNS {
            warn!(tab = ROSTERS.tab, row = idx + 2, cells = row.len(), "Skipping incomplete roster row");
            continue;
        }
        let Some(team_id) = parse_int(&cell(row, 0)) else {
            warn!(tab = ROSTERS.tab, row = idx + 2, "Skipping roster row with non-numeric team id");
            continue;
        };

        let mut entry = RosterEntry::new(
            team_id,
            cell(row, 1),
            cell(row, 2),
            cell(row, 3),
            cell(row, 4),
            float_cell(row, 5),
        );
        entry.projected_points = float_cell(row, 6);

        let status = cell(row, 7);
        if !status.is_empty() {
            entry.status = status;
        }
        let eligibility = cell(row, 8);
        if !eligibility.is_empty() {
            entry.roster_eligibility = eligibility;
        }

        entries.push(entry);
    }

    entries
}

pub fn parse_requirements(rows: &[Row]) -> Vec<RosterRequirement> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| !is_blank(row))
        .filter_map(|(idx, row)| {
            if row.len() < REQUIREMENT_COLUMNS {
                warn!(tab = ROSTER_REQUIREMENTS.tab, row = idx + 2, "Skipping incomplete requirement row");
                return None;
            }
            Some(RosterRequirement {
                week: cell(row, 0),
                teams_left: parse_int(&cell(row, 1)).unwrap_or(0),
                positions_required: cell(row, 2),
                payout: cell(row, 3),
            })
        })
        .collect()
}

/// Assemble a snapshot from fetched tabs keyed by tab name. A tab missing
/// from the map means the sheet does not have the expected layout.
pub fn build_snapshot(tabs: &HashMap<String, Vec<Row>>) -> Result<LeagueSnapshot, SheetsError> {
    let tab = |range: TabRange| {
        tabs.get(range.tab)
            .ok_or_else(|| SheetsError::SchemaMismatch(format!("missing tab '{}'", range.tab)))
    };

    Ok(LeagueSnapshot {
        meta: parse_league_meta(tab(LEAGUE_META)?),
        teams: parse_teams(tab(TEAMS)?),
        rosters: parse_rosters(tab(ROSTERS)?),
        requirements: parse_requirements(tab(ROSTER_REQUIREMENTS)?),
    })
}
