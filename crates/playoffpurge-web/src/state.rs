//! Shared application state passed to all route handlers.

use std::sync::Arc;

use playoffpurge_core::{Config, LeagueCache};

/// Per-site settings the handlers need, split out of `Config` so the
/// credentials never reach the web layer.
#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub app_title: String,
    pub admin_username: String,
    pub admin_password: String,
}

impl SiteSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            app_title: config.app_title.clone(),
            admin_username: config.admin_username.clone(),
            admin_password: config.admin_password.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<LeagueCache>,
    pub settings: Arc<SiteSettings>,
}

impl AppState {
    pub fn new(cache: Arc<LeagueCache>, settings: SiteSettings) -> Self {
        Self {
            cache,
            settings: Arc::new(settings),
        }
    }
}
