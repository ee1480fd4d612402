use std::sync::Arc;
use std::time::Instant;

use berthcare_data::{Database, Repositories};
use berthcare_domain::auth::RefreshService;
use berthcare_domain::config::AppConfig;
use berthcare_domain::health::{DatabaseHealthService, HealthServiceTrait};

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    pub repositories: Arc<Repositories>,
    pub health_service: Arc<dyn HealthServiceTrait>,
    pub refresh_service: Arc<RefreshService>,
    pub config: Arc<AppConfig>,
    pub started_at: Instant,
}

impl AppState {
    /// Wire repositories and services onto one database handle
    pub fn new(db: &Database, config: AppConfig) -> Self {
        let repositories = Repositories::new(db);
        let refresh_service = RefreshService::new(repositories.refresh_tokens.clone(), config.auth.clone());

        Self {
            repositories: Arc::new(repositories),
            health_service: Arc::new(DatabaseHealthService::new(db.clone())),
            refresh_service: Arc::new(refresh_service),
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }

    /// Replace the health service, mostly for tests
    pub fn with_health_service(mut self, health_service: Arc<dyn HealthServiceTrait>) -> Self {
        self.health_service = health_service;
        self
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
