use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::models::{LeagueMeta, LeagueSnapshot, RosterEntry, RosterRequirement, Team, TeamDetail};
use crate::sheets::SheetsError;

/// Where snapshots come from. The production source is `SheetsClient`.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<LeagueSnapshot, SheetsError>;
}

#[derive(Debug, Clone)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
    fetched_at: Instant,
    invalidated: bool,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
            fetched_at: Instant::now(),
            invalidated: false,
        }
    }

    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }

    pub fn is_stale(&self, ttl: Duration) -> bool {
        self.invalidated || self.age() >= ttl
    }
}

/// Point-in-time view of the cache, for health checks and page footers.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub cached: bool,
    pub stale: bool,
    pub ttl_seconds: u64,
    pub age_seconds: Option<u64>,
    pub age_display: Option<String>,
    pub last_refreshed: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Read-through TTL cache over a single league snapshot.
///
/// Readers of a fresh entry only take the read lock. When the entry has
/// expired, one caller fetches while the others wait on `refresh_lock` and
/// then pick up the new entry. A failed fetch keeps serving the previous
/// snapshot if there is one.
pub struct LeagueCache {
    source: Arc<dyn SnapshotSource>,
    ttl: Duration,
    slot: RwLock<Option<CachedData<Arc<LeagueSnapshot>>>>,
    refresh_lock: Mutex<()>,
    last_error: RwLock<Option<String>>,
}

impl LeagueCache {
    pub fn new(source: Arc<dyn SnapshotSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            slot: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            last_error: RwLock::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    async fn fresh(&self) -> Option<Arc<LeagueSnapshot>> {
        let slot = self.slot.read().await;
        slot.as_ref()
            .filter(|cached| !cached.is_stale(self.ttl))
            .map(|cached| Arc::clone(&cached.data))
    }

    async fn stale(&self) -> Option<(Arc<LeagueSnapshot>, String)> {
        let slot = self.slot.read().await;
        slot.as_ref()
            .map(|cached| (Arc::clone(&cached.data), cached.age_display()))
    }

    /// Fetch from the source and store the result. Caller holds `refresh_lock`.
    async fn fetch_and_store(&self) -> Result<Arc<LeagueSnapshot>, SheetsError> {
        let started = Instant::now();
        match self.source.fetch_snapshot().await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                *self.slot.write().await = Some(CachedData::new(Arc::clone(&snapshot)));
                *self.last_error.write().await = None;
                info!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    teams = snapshot.teams.len(),
                    "League cache refreshed"
                );
                Ok(snapshot)
            }
            Err(e) => {
                *self.last_error.write().await = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// The cached snapshot, fetching it if missing or expired.
    ///
    /// Within the TTL every call returns the same `Arc`.
    pub async fn snapshot(&self) -> Result<Arc<LeagueSnapshot>, SheetsError> {
        if let Some(snapshot) = self.fresh().await {
            return Ok(snapshot);
        }

        let _guard = self.refresh_lock.lock().await;

        // Someone else may have refreshed while we waited for the lock
        if let Some(snapshot) = self.fresh().await {
            debug!("League cache refreshed by a concurrent request");
            return Ok(snapshot);
        }

        match self.fetch_and_store().await {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => match self.stale().await {
                Some((snapshot, age)) => {
                    if e.is_transient() {
                        warn!(error = %e, kind = e.kind(), age = %age, "Sheet fetch failed, serving stale league data");
                    } else {
                        // Will not clear up by itself: bad credentials or a renamed tab
                        error!(error = %e, kind = e.kind(), age = %age, "Sheet fetch failed, serving stale league data");
                    }
                    Ok(snapshot)
                }
                None => {
                    warn!(error = %e, kind = e.kind(), "Sheet fetch failed with nothing cached");
                    Err(e)
                }
            },
        }
    }

    /// Fetch now regardless of age. Failures are returned rather than
    /// masked by stale data, but the stale entry stays for other readers.
    pub async fn refresh(&self) -> Result<Arc<LeagueSnapshot>, SheetsError> {
        let _guard = self.refresh_lock.lock().await;
        self.fetch_and_store().await
    }

    /// Mark the entry expired. The data is kept as a fallback for failed fetches.
    pub async fn invalidate(&self) {
        if let Some(cached) = self.slot.write().await.as_mut() {
            cached.invalidated = true;
        }
        info!("League cache invalidated");
    }

    pub async fn status(&self) -> CacheStatus {
        let slot = self.slot.read().await;
        let last_error = self.last_error.read().await.clone();
        match slot.as_ref() {
            Some(cached) => CacheStatus {
                cached: true,
                stale: cached.is_stale(self.ttl),
                ttl_seconds: self.ttl.as_secs(),
                age_seconds: Some(cached.age().as_secs()),
                age_display: Some(cached.age_display()),
                last_refreshed: Some(cached.cached_at),
                last_error,
            },
            None => CacheStatus {
                cached: false,
                stale: true,
                ttl_seconds: self.ttl.as_secs(),
                age_seconds: None,
                age_display: None,
                last_refreshed: None,
                last_error,
            },
        }
    }

    // ===== Typed accessors =====

    /// Teams sorted by seed.
    pub async fn get_teams(&self) -> Result<Vec<Team>, SheetsError> {
        Ok(self.snapshot().await?.teams.clone())
    }

    /// All roster rows, or only those of `team_id`.
    pub async fn get_rosters(&self, team_id: Option<u32>) -> Result<Vec<RosterEntry>, SheetsError> {
        Ok(self.snapshot().await?.rosters_for(team_id))
    }

    pub async fn get_league_meta(&self) -> Result<LeagueMeta, SheetsError> {
        Ok(self.snapshot().await?.meta.clone())
    }

    pub async fn get_roster_requirements(&self) -> Result<Vec<RosterRequirement>, SheetsError> {
        Ok(self.snapshot().await?.requirements.clone())
    }

    pub async fn get_roster_requirement_for_week(
        &self,
        week: &str,
    ) -> Result<Option<RosterRequirement>, SheetsError> {
        Ok(self.snapshot().await?.requirement_for_week(week).cloned())
    }

    pub async fn get_team_detail(&self, team_id: u32) -> Result<TeamDetail, SheetsError> {
        self.snapshot()
            .await?
            .team_detail(team_id)
            .ok_or_else(|| SheetsError::NotFound(format!("team {}", team_id)))
    }

    pub async fn get_teams_with_rosters(&self) -> Result<Vec<TeamDetail>, SheetsError> {
        Ok(self.snapshot().await?.teams_with_rosters())
    }
}

// ============================================================================
// Tests
// ============================================================================
