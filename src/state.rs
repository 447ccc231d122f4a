//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::config::Config;
use crate::listings::ListingService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub listings: Arc<ListingService>,
    pub jwt_secret: String,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        Self {
            listings: Arc::new(ListingService::new(pool)),
            jwt_secret: config.jwt_secret.clone(),
        }
    }
}

impl FromRef<AppState> for Arc<ListingService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.listings.clone()
    }
}
