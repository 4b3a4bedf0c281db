//! Router tests against an in-memory snapshot source.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use playoffpurge_core::{
    LeagueCache, LeagueMeta, LeagueSnapshot, RosterEntry, RosterRequirement, SheetsError,
    SnapshotSource, Team, TeamStatus,
};
use playoffpurge_web::{build_router, AppState, SiteSettings};
use serde_json::Value;
use tower::ServiceExt;

// "admin:secret" and "admin:wrong"
const GOOD_AUTH: &str = "Basic YWRtaW46c2VjcmV0";
const BAD_AUTH: &str = "Basic YWRtaW46d3Jvbmc=";

struct FakeSource {
    fetches: AtomicUsize,
    failing: AtomicBool,
}

impl FakeSource {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            fetches: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        })
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

fn team(team_id: u32, seed: u32, status: TeamStatus, name: &str) -> Team {
    Team {
        team_id,
        owner_name: format!("Owner {}", team_id),
        team_name: name.to_string(),
        seed,
        status,
        total_points: 100.0 + team_id as f64,
        current_week: "Wildcard".to_string(),
    }
}

fn snapshot() -> LeagueSnapshot {
    LeagueSnapshot {
        meta: LeagueMeta {
            league_name: "Test Purge".to_string(),
            current_week: "Wildcard".to_string(),
            last_updated: "2025-01-11".to_string(),
        },
        teams: vec![
            team(1, 1, TeamStatus::Active, "Top Seed"),
            team(2, 2, TeamStatus::Active, "<b>Bold</b> & Co"),
            team(3, 3, TeamStatus::Eliminated, "Chopped"),
        ],
        rosters: vec![
            RosterEntry::new(1, "Wildcard", "WR", "Fast Hands", "MIA", 14.5),
            RosterEntry::new(1, "Wildcard", "QB", "Big Arm", "BUF", 22.0),
            RosterEntry::new(1, "Week 18", "RB", "Old Legs", "DET", 4.0),
            RosterEntry::new(2, "Wildcard", "TE", "Soft Hands", "KC", 8.0),
        ],
        requirements: vec![RosterRequirement {
            week: "Wildcard".to_string(),
            teams_left: 8,
            positions_required: "QB, RB, WR, FLEX".to_string(),
            payout: "$20".to_string(),
        }],
    }
}

#[async_trait]
impl SnapshotSource for FakeSource {
    async fn fetch_snapshot(&self) -> Result<LeagueSnapshot, SheetsError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(SheetsError::Server("backend unavailable".to_string()));
        }
        Ok(snapshot())
    }
}

fn create_test_app(source: Arc<FakeSource>) -> (Router, Arc<LeagueCache>) {
    let cache = Arc::new(LeagueCache::new(source, Duration::from_secs(300)));
    let settings = SiteSettings {
        app_title: "PlayoffPurge Test".to_string(),
        admin_username: "admin".to_string(),
        admin_password: "secret".to_string(),
    };
    let app = build_router(AppState::new(Arc::clone(&cache), settings));
    (app, cache)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_refresh(auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri("/refresh");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    (status, serde_json::from_str(&body).unwrap())
}

#[tokio::test]
async fn test_health() {
    let source = FakeSource::new();
    let (app, _) = create_test_app(source);

    let (status, body) = send_json(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["league"], "Test Purge");
    assert_eq!(body["week"], "Wildcard");
    assert_eq!(body["cache"]["cached"], true);
}

#[tokio::test]
async fn test_health_unhealthy_without_data() {
    let source = FakeSource::new();
    source.set_failing(true);
    let (app, _) = create_test_app(source);

    let (status, body) = send_json(&app, get("/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
    assert!(body["error"].as_str().unwrap().contains("backend unavailable"));
}

#[tokio::test]
async fn test_api_teams_in_seed_order() {
    let source = FakeSource::new();
    let (app, _) = create_test_app(Arc::clone(&source));

    let (status, body) = send_json(&app, get("/api/teams")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<u64> = body["teams"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["team_id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(body["teams"][2]["status"], "eliminated");

    // Second request is served from the cache
    send_json(&app, get("/api/teams")).await;
    assert_eq!(source.fetches(), 1);
}

#[tokio::test]
async fn test_api_team_detail() {
    let (app, _) = create_test_app(FakeSource::new());

    let (status, body) = send_json(&app, get("/api/teams/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["team_id"], 1);
    assert_eq!(body["week"], "Wildcard");
    let players: Vec<&str> = body["roster"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["player_name"].as_str().unwrap())
        .collect();
    assert_eq!(players, vec!["Big Arm", "Fast Hands"]);
}

#[tokio::test]
async fn test_api_team_detail_unknown_team() {
    let (app, _) = create_test_app(FakeSource::new());

    let (status, body) = send_json(&app, get("/api/teams/42")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn test_api_bad_parameters_are_json_errors() {
    let source = FakeSource::new();
    let (app, _) = create_test_app(Arc::clone(&source));

    let (status, body) = send_json(&app, get("/api/teams/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "bad_request");
    assert!(body["error"].is_string());

    let (status, body) = send_json(&app, get("/api/rosters?team_id=x")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "bad_request");

    // Rejected before reaching the cache
    assert_eq!(source.fetches(), 0);
}

#[tokio::test]
async fn test_api_rosters_filter() {
    let (app, _) = create_test_app(FakeSource::new());

    let (_, all) = send_json(&app, get("/api/rosters")).await;
    assert_eq!(all["rosters"].as_array().unwrap().len(), 4);

    let (status, team_one) = send_json(&app, get("/api/rosters?team_id=1")).await;
    assert_eq!(status, StatusCode::OK);
    let rosters = team_one["rosters"].as_array().unwrap();
    assert_eq!(rosters.len(), 3);
    assert!(rosters.iter().all(|e| e["team_id"] == 1));
}

#[tokio::test]
async fn test_api_league() {
    let (app, _) = create_test_app(FakeSource::new());

    let (status, body) = send_json(&app, get("/api/league")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["league"]["league_name"], "Test Purge");
    assert_eq!(body["roster_requirements"][0]["teams_left"], 8);
}

#[tokio::test]
async fn test_api_error_from_upstream() {
    let source = FakeSource::new();
    source.set_failing(true);
    let (app, _) = create_test_app(source);

    let (status, body) = send_json(&app, get("/api/teams")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["kind"], "upstream_unreachable");
}

#[tokio::test]
async fn test_dashboard_page() {
    let (app, _) = create_test_app(FakeSource::new());

    let (status, html) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<title>Test Purge - PlayoffPurge Test</title>"));
    assert!(html.contains("8 teams left"));
    assert!(html.contains("Top Seed"));
    assert!(html.contains("&lt;b&gt;Bold&lt;/b&gt; &amp; Co"));
    assert!(!html.contains("<b>Bold</b>"));
    assert!(html.contains("data cached"));
}

#[tokio::test]
async fn test_team_page() {
    let (app, _) = create_test_app(FakeSource::new());

    let (status, html) = send(&app, get("/team/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Big Arm"));
    // History includes earlier weeks
    assert!(html.contains("Old Legs"));
}

#[tokio::test]
async fn test_team_page_not_found() {
    let (app, _) = create_test_app(FakeSource::new());

    let (status, html) = send(&app, get("/team/42")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(html.contains("Not found"));
}

#[tokio::test]
async fn test_refresh_requires_credentials() {
    let source = FakeSource::new();
    let (app, cache) = create_test_app(Arc::clone(&source));
    send_json(&app, get("/api/teams")).await;

    let response = app.clone().oneshot(post_refresh(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers()[header::WWW_AUTHENTICATE],
        "Basic realm=\"playoffpurge\""
    );

    let (status, _) = send_json(&app, post_refresh(Some(BAD_AUTH))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Cache untouched
    assert!(!cache.status().await.stale);
    send_json(&app, get("/api/teams")).await;
    assert_eq!(source.fetches(), 1);
}

#[tokio::test]
async fn test_refresh_with_credentials() {
    let source = FakeSource::new();
    let (app, _) = create_test_app(Arc::clone(&source));
    send_json(&app, get("/api/teams")).await;

    let (status, body) = send_json(&app, post_refresh(Some(GOOD_AUTH))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Cache refreshed from Google Sheets.");
    assert_eq!(body["teams"], 3);
    assert_eq!(source.fetches(), 2);

    send_json(&app, get("/api/teams")).await;
    assert_eq!(source.fetches(), 2);
}

#[tokio::test]
async fn test_refresh_failure_keeps_stale_data() {
    let source = FakeSource::new();
    let (app, _) = create_test_app(Arc::clone(&source));
    send_json(&app, get("/api/teams")).await;

    source.set_failing(true);
    let (status, body) = send_json(&app, post_refresh(Some(GOOD_AUTH))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["kind"], "upstream_unreachable");

    // Readers fall back to the previous snapshot
    let (status, body) = send_json(&app, get("/api/teams")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["teams"].as_array().unwrap().len(), 3);
}
