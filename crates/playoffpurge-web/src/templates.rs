//! HTML templates for the dashboard
//!
//! Each function returns a String that handlers wrap in `Html`. Every value
//! that came from the sheet goes through `escape` first.
use playoffpurge_core::utils::format_points;
use playoffpurge_core::{LeagueMeta, RosterEntry, RosterRequirement, TeamDetail, TeamStatus};

/// Escape text for use in HTML bodies and attribute values
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Base HTML template with header and common styles
pub fn base_template(title: &str, app_title: &str, content: &str, footer_note: Option<&str>) -> String {
    let footer_note = footer_note
        .map(|note| format!(" | {}", escape(note)))
        .unwrap_or_default();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - {app_title}</title>
    <style>
        {common_styles}
    </style>
</head>
<body>
    <div class="header">
        <h1><a href="/">🏈 {app_title}</a></h1>
    </div>

    <main class="content">
        {content}
    </main>

    <footer class="footer">
        <p>{app_title}{footer_note}</p>
    </footer>
</body>
</html>"#,
        title = escape(title),
        app_title = escape(app_title),
        common_styles = common_styles(),
        content = content,
        footer_note = footer_note,
    )
}

/// Common CSS styles
fn common_styles() -> &'static str {
    r#"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: #f5f7fa;
            color: #2d3748;
            line-height: 1.6;
        }
        .header {
            background: linear-gradient(135deg, #1a365d 0%, #9b2c2c 100%);
            color: white;
            padding: 20px 30px;
        }
        .header a { color: white; text-decoration: none; }
        .content { max-width: 1100px; margin: 0 auto; padding: 24px; }
        .league { margin-bottom: 24px; }
        .league .meta { color: #4a5568; }
        .requirement {
            background: #fffaf0;
            border-left: 4px solid #dd6b20;
            padding: 10px 14px;
            margin: 12px 0;
        }
        h2 { margin: 24px 0 12px; }
        .teams { display: grid; grid-template-columns: repeat(auto-fill, minmax(320px, 1fr)); gap: 16px; }
        .team {
            background: white;
            border-radius: 8px;
            padding: 16px;
            box-shadow: 0 1px 4px rgba(0,0,0,0.08);
        }
        .team.eliminated { opacity: 0.6; }
        .team.champion { border: 2px solid #d69e2e; }
        .team h3 a { color: inherit; }
        .team .owner { color: #718096; font-size: 0.9em; }
        .totals { margin: 8px 0; font-weight: 600; }
        table { width: 100%; border-collapse: collapse; font-size: 0.9em; }
        th, td { text-align: left; padding: 4px 6px; border-bottom: 1px solid #edf2f7; }
        td.num, th.num { text-align: right; }
        .empty { color: #a0aec0; font-style: italic; }
        .error {
            background: #fff5f5;
            border-left: 4px solid #c53030;
            padding: 16px;
        }
        .footer { text-align: center; color: #a0aec0; padding: 24px; font-size: 0.85em; }
    "#
}

fn league_header(meta: &LeagueMeta, requirement: Option<&RosterRequirement>) -> String {
    let requirement = requirement
        .map(|req| {
            format!(
                r#"<div class="requirement"><strong>{week}:</strong> {teams_left} teams left &middot; lineup {positions} &middot; payout {payout}</div>"#,
                week = escape(&req.week),
                teams_left = req.teams_left,
                positions = escape(&req.positions().join(", ")),
                payout = escape(&req.payout),
            )
        })
        .unwrap_or_default();

    format!(
        r#"<section class="league">
        <h2>{league_name}</h2>
        <p class="meta">{current_week} &middot; sheet updated {last_updated}</p>
        {requirement}
    </section>"#,
        league_name = escape(&meta.league_name),
        current_week = escape(&meta.current_week),
        last_updated = escape(&meta.last_updated),
        requirement = requirement,
    )
}

/// Roster table. `show_week` adds a week column for multi-week listings.
pub fn roster_table(entries: &[RosterEntry], show_week: bool) -> String {
    if entries.is_empty() {
        return r#"<p class="empty">No roster submitted</p>"#.to_string();
    }

    let week_header = if show_week { "<th>Week</th>" } else { "" };
    let rows: String = entries
        .iter()
        .map(|e| {
            let week_cell = if show_week {
                format!("<td>{}</td>", escape(&e.week))
            } else {
                String::new()
            };
            let status = if e.is_active() {
                String::new()
            } else {
                format!(" ({})", escape(&e.status))
            };
            format!(
                r#"<tr>{week_cell}<td>{position}</td><td>{player}{status}</td><td>{nfl_team}</td><td class="num">{points}</td><td class="num">{projected}</td></tr>"#,
                week_cell = week_cell,
                position = escape(&e.position),
                player = escape(&e.player_name),
                status = status,
                nfl_team = escape(&e.team),
                points = format_points(e.points),
                projected = format_points(e.projected_points),
            )
        })
        .collect();

    format!(
        r#"<table>
            <thead><tr>{week_header}<th>Pos</th><th>Player</th><th>NFL</th><th class="num">Pts</th><th class="num">Proj</th></tr></thead>
            <tbody>{rows}</tbody>
        </table>"#,
        week_header = week_header,
        rows = rows,
    )
}

fn team_card(detail: &TeamDetail) -> String {
    let team = &detail.team;
    format!(
        r#"<div class="team {status}">
            <h3>{emoji} #{seed} <a href="/team/{team_id}">{team_name}</a></h3>
            <div class="owner">{owner}</div>
            <div class="totals">Total {total} &middot; this week {week_points} (proj {projected})</div>
            {roster}
        </div>"#,
        status = team.status.as_str(),
        emoji = team.status.emoji(),
        seed = team.seed,
        team_id = team.team_id,
        team_name = escape(team.display_name()),
        owner = escape(&team.owner_name),
        total = format_points(team.total_points),
        week_points = format_points(detail.roster_points),
        projected = format_points(detail.projected_points),
        roster = roster_table(&detail.roster, false),
    )
}

fn team_section(heading: &str, teams: &[&TeamDetail]) -> String {
    if teams.is_empty() {
        return String::new();
    }
    let cards: String = teams.iter().map(|d| team_card(d)).collect();
    format!(
        r#"<h2>{heading} ({count})</h2>
    <div class="teams">{cards}</div>"#,
        heading = escape(heading),
        count = teams.len(),
        cards = cards,
    )
}

/// Dashboard page content: league header then teams grouped by status.
/// Within a group the highest projected lineup comes first, ties by seed.
pub fn dashboard_content(
    meta: &LeagueMeta,
    requirement: Option<&RosterRequirement>,
    teams: &[TeamDetail],
) -> String {
    let by_status = |status: TeamStatus| -> Vec<&TeamDetail> {
        let mut group: Vec<&TeamDetail> =
            teams.iter().filter(|d| d.team.status == status).collect();
        group.sort_by(|a, b| {
            b.projected_points
                .total_cmp(&a.projected_points)
                .then(a.team.seed.cmp(&b.team.seed))
        });
        group
    };

    let sections = [
        team_section("Champion", &by_status(TeamStatus::Champion)),
        team_section("Still alive", &by_status(TeamStatus::Active)),
        team_section("Guillotined", &by_status(TeamStatus::Eliminated)),
    ]
    .concat();

    let sections = if teams.is_empty() {
        r#"<p class="empty">No teams in the sheet yet</p>"#.to_string()
    } else {
        sections
    };

    format!("{}\n{}", league_header(meta, requirement), sections)
}

/// Team page content: current week lineup plus every roster row on record.
pub fn team_content(detail: &TeamDetail, history: &[RosterEntry]) -> String {
    let team = &detail.team;
    format!(
        r#"<section class="team {status}">
        <h2>{emoji} {team_name}</h2>
        <div class="owner">Owner: {owner} &middot; seed #{seed} &middot; {status}</div>
        <div class="totals">Season total {total}</div>
        <h3>{week}</h3>
        <div class="totals">{week_points} pts (proj {projected})</div>
        {roster}
        <h3>All weeks</h3>
        {history}
    </section>"#,
        status = team.status.as_str(),
        emoji = team.status.emoji(),
        team_name = escape(team.display_name()),
        owner = escape(&team.owner_name),
        seed = team.seed,
        total = format_points(team.total_points),
        week = escape(&detail.week),
        week_points = format_points(detail.roster_points),
        projected = format_points(detail.projected_points),
        roster = roster_table(&detail.roster, false),
        history = roster_table(history, true),
    )
}

pub fn error_content(heading: &str, message: &str) -> String {
    format!(
        r#"<div class="error">
        <h2>{heading}</h2>
        <p>{message}</p>
        <p><a href="/">Back to standings</a></p>
    </div>"#,
        heading = escape(heading),
        message = escape(message),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use playoffpurge_core::Team;

    fn detail(team_id: u32, status: TeamStatus, name: &str) -> TeamDetail {
        let team = Team {
            team_id,
            owner_name: format!("Owner {}", team_id),
            team_name: name.to_string(),
            seed: team_id,
            status,
            total_points: 10.0,
            current_week: "Week 18".to_string(),
        };
        let roster = vec![RosterEntry::new(team_id, "Week 18", "QB", "Big Arm", "BUF", 22.0)];
        TeamDetail::new(team, "Week 18", roster)
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_dashboard_groups_by_status() {
        let teams = vec![
            detail(1, TeamStatus::Active, "Alive Team"),
            detail(2, TeamStatus::Eliminated, "Gone Team"),
            detail(3, TeamStatus::Champion, "Best Team"),
        ];
        let html = dashboard_content(&LeagueMeta::default(), None, &teams);

        let champion = html.find("Best Team").unwrap();
        let alive = html.find("Alive Team").unwrap();
        let gone = html.find("Gone Team").unwrap();
        assert!(champion < alive && alive < gone);
        assert!(html.contains("Still alive (1)"));
        assert!(html.contains(r#"href="/team/2""#));
    }

    #[test]
    fn test_dashboard_orders_group_by_projection() {
        let mut low_seed = detail(4, TeamStatus::Active, "Hot Streak");
        low_seed.projected_points = 140.0;
        let mut top_seed = detail(1, TeamStatus::Active, "Top Seed");
        top_seed.projected_points = 95.5;
        let tied_a = detail(2, TeamStatus::Active, "Even Two");
        let tied_b = detail(3, TeamStatus::Active, "Even Three");

        let teams = vec![top_seed, tied_b, low_seed, tied_a];
        let html = dashboard_content(&LeagueMeta::default(), None, &teams);

        let pos = |name: &str| html.find(name).unwrap();
        assert!(pos("Hot Streak") < pos("Top Seed"));
        assert!(pos("Top Seed") < pos("Even Two"));
        assert!(pos("Even Two") < pos("Even Three"));
        // Seed label stays on the card
        assert!(html.contains("#4 <a href=\"/team/4\">Hot Streak</a>"));
    }

    #[test]
    fn test_dashboard_escapes_sheet_values() {
        let teams = vec![detail(1, TeamStatus::Active, "<script>alert(1)</script>")];
        let html = dashboard_content(&LeagueMeta::default(), None, &teams);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_dashboard_shows_requirement() {
        let req = RosterRequirement {
            week: "Week 18".to_string(),
            teams_left: 12,
            positions_required: "qb, rb,flex".to_string(),
            payout: "$0".to_string(),
        };
        let html = dashboard_content(&LeagueMeta::default(), Some(&req), &[]);
        assert!(html.contains("12 teams left"));
        assert!(html.contains("QB, RB, FLEX"));
        assert!(html.contains("No teams in the sheet yet"));
    }

    #[test]
    fn test_roster_table_empty() {
        assert!(roster_table(&[], false).contains("No roster submitted"));
    }

    #[test]
    fn test_roster_table_marks_inactive_players() {
        let mut entry = RosterEntry::new(1, "Week 18", "RB", "Hurt Guy", "NYJ", 0.0);
        entry.status = "injured".to_string();
        let html = roster_table(&[entry], true);
        assert!(html.contains("Hurt Guy (injured)"));
        assert!(html.contains("<th>Week</th>"));
    }
}
