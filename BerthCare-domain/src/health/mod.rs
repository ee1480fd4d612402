//! Domain layer health check functionality
//! This module provides health check services for the application

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use berthcare_data::database::Database;
use tracing::{debug, warn};

/// System health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    pub status: ComponentStatus,
    /// Optional details about the component status
    pub details: Option<String>,
}

/// Represents the overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    pub status: SystemStatus,
    /// Map of component names to their health status
    pub components: HashMap<String, HealthComponent>,
}

/// Public detail for a database that could not be reached
pub const DATABASE_UNAVAILABLE: &str = "Database connection failed";

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Check the status of the database
    /// Returns true if the database is healthy, false if not
    /// Returns an error if the check could not be performed
    async fn check_database_status(&self) -> Result<bool, String>;
}

/// Something that can prove the storage layer answers queries
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectionProbe: Send + Sync {
    async fn ping(&self) -> Result<(), String>;

    /// Human readable description of the connection
    fn describe(&self) -> String;
}

#[async_trait]
impl ConnectionProbe for Database {
    async fn ping(&self) -> Result<(), String> {
        Database::ping(self)
            .await
            .map_err(|e| format!("Database connection error: {}", e))
    }

    fn describe(&self) -> String {
        self.connection_info()
    }
}

/// Health service backed by a storage probe.
///
/// A probe slower than the threshold reports the database as degraded.
pub struct DatabaseHealthService<P = Database> {
    probe: P,
    slow_threshold: Duration,
}

impl<P: ConnectionProbe> DatabaseHealthService<P> {
    pub const DEFAULT_SLOW_THRESHOLD: Duration = Duration::from_millis(500);

    pub fn new(probe: P) -> Self {
        Self {
            probe,
            slow_threshold: Self::DEFAULT_SLOW_THRESHOLD,
        }
    }

    pub fn with_slow_threshold(mut self, threshold: Duration) -> Self {
        self.slow_threshold = threshold;
        self
    }
}

impl<P: ConnectionProbe> fmt::Debug for DatabaseHealthService<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseHealthService")
            .field("probe", &self.probe.describe())
            .field("slow_threshold", &self.slow_threshold)
            .finish()
    }
}

#[async_trait]
impl<P: ConnectionProbe + 'static> HealthServiceTrait for DatabaseHealthService<P> {
    async fn get_system_health(&self) -> SystemHealth {
        let db_component = match self.check_database_status().await {
            Ok(true) => HealthComponent {
                status: ComponentStatus::Healthy,
                details: Some(self.probe.describe()),
            },
            Ok(false) => HealthComponent {
                status: ComponentStatus::Degraded,
                details: Some("Database is available but responding slowly".to_string()),
            },
            // check_database_status already logged the cause
            Err(_) => HealthComponent {
                status: ComponentStatus::Unhealthy,
                details: Some(DATABASE_UNAVAILABLE.to_string()),
            },
        };

        let overall_status = match db_component.status {
            ComponentStatus::Unhealthy => SystemStatus::Unhealthy,
            ComponentStatus::Degraded => SystemStatus::Degraded,
            ComponentStatus::Healthy => SystemStatus::Healthy,
        };

        SystemHealth {
            status: overall_status,
            components: [
                ("database".to_string(), db_component),
                (
                    "api".to_string(),
                    HealthComponent {
                        status: ComponentStatus::Healthy,
                        details: None,
                    },
                ),
            ]
            .into_iter()
            .collect(),
        }
    }

    async fn check_database_status(&self) -> Result<bool, String> {
        let started = Instant::now();
        self.probe.ping().await.map_err(|e| {
            warn!("Database health probe failed: {}", e);
            e
        })?;

        let elapsed = started.elapsed();
        debug!("Database probe answered in {:?}", elapsed);
        Ok(elapsed <= self.slow_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe_returning(result: Result<(), String>) -> MockConnectionProbe {
        let mut probe = MockConnectionProbe::new();
        probe.expect_ping().returning(move || result.clone());
        probe
            .expect_describe()
            .returning(|| "SQLite in-memory database".to_string());
        probe
    }

    #[tokio::test]
    async fn test_healthy_probe_reports_healthy_system() {
        let service = DatabaseHealthService::new(probe_returning(Ok(())));

        let health = service.get_system_health().await;

        assert_eq!(health.status, SystemStatus::Healthy);
        assert_eq!(health.components["database"].status, ComponentStatus::Healthy);
        assert!(health.components.contains_key("api"));
    }

    #[tokio::test]
    async fn test_failed_probe_reports_unhealthy_system() {
        let service = DatabaseHealthService::new(probe_returning(Err(
            "pool exhausted at /var/lib/berthcare.db".to_string(),
        )));

        assert_eq!(
            service.check_database_status().await,
            Err("pool exhausted at /var/lib/berthcare.db".to_string())
        );
        let health = service.get_system_health().await;
        assert_eq!(health.status, SystemStatus::Unhealthy);
        assert_eq!(
            health.components["database"].details.as_deref(),
            Some(DATABASE_UNAVAILABLE)
        );
    }

    #[tokio::test]
    async fn test_slow_probe_reports_degraded() {
        let mut probe = MockConnectionProbe::new();
        probe.expect_ping().returning(|| {
            std::thread::sleep(Duration::from_millis(20));
            Ok(())
        });
        probe.expect_describe().returning(String::new);
        let service = DatabaseHealthService::new(probe).with_slow_threshold(Duration::from_millis(1));

        assert_eq!(service.check_database_status().await, Ok(false));
        assert_eq!(service.get_system_health().await.status, SystemStatus::Degraded);
    }

    #[tokio::test]
    async fn test_real_database_probe() {
        let db = Database::open_in_memory().unwrap();
        let service = DatabaseHealthService::new(db.clone());
        assert!(service.check_database_status().await.is_ok());

        db.close();
        assert!(service.check_database_status().await.is_err());
    }
}
