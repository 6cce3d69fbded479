pub mod auth;
pub mod booking;
pub mod crypto;
pub mod event;
pub mod log;
pub mod records;
pub mod seed;
pub mod user;

use std::{sync::Arc, time::Duration};

use crate::{config::Config, db::Store};

/// Shared by every service call; one per process.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub latency: Duration,
    pub jwt: auth::JwtSettings,
}

impl AppState {
    pub fn new(store: Store, config: &Config) -> Self {
        AppState {
            store: Arc::new(store),
            latency: config.latency,
            jwt: auth::JwtSettings::new(&config.jwt_secret, config.access_token_ttl),
        }
    }

    /// Fixed artificial delay in front of every call.
    pub async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}
