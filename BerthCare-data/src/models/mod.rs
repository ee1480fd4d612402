//! Storage models for BerthCare care records
//!
//! Each entity has a record type as read back from storage, a `New*` payload for
//! inserts, an `Update*` patch and a `*Filter` for equality lookups. Patches use
//! `Option<Option<T>>` for nullable columns so that an absent field leaves the
//! column untouched while an explicit `null` clears it.

/// Declares a closed set of text values stored in a `TEXT` column.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Stored text representation
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(format!("invalid {}: {}", stringify!($name), other)),
                }
            }
        }

        impl rusqlite::types::FromSql for $name {
            fn column_result(
                value: rusqlite::types::ValueRef<'_>,
            ) -> rusqlite::types::FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: String| rusqlite::types::FromSqlError::Other(e.into()))
            }
        }

        impl From<$name> for rusqlite::types::Value {
            fn from(value: $name) -> Self {
                rusqlite::types::Value::Text(value.as_str().to_string())
            }
        }
    };
}

pub(crate) mod codec;
pub mod patch;

pub mod alert;
pub mod audit_log;
pub mod caregiver;
pub mod client;
pub mod consent;
pub mod photo;
pub mod refresh_token;
pub mod schedule;
pub mod visit;

pub use alert::{Alert, AlertFilter, NewAlert, UpdateAlert};
pub use audit_log::{ActorType, AuditLog, AuditLogFilter, NewAuditLog, UpdateAuditLog};
pub use caregiver::{Caregiver, CaregiverFilter, CaregiverRole, NewCaregiver, UpdateCaregiver};
pub use client::{Client, ClientFilter, NewClient, UpdateClient};
pub use consent::{Consent, ConsentFilter, ConsentType, NewConsent, UpdateConsent};
pub use photo::{NewPhoto, Photo, PhotoFilter, PhotoSyncStatus, UpdatePhoto};
pub use refresh_token::{RefreshToken, UpsertRefreshToken};
pub use schedule::{NewSchedule, Schedule, ScheduleFilter, ScheduleStatus, UpdateSchedule};
pub use visit::{NewVisit, UpdateVisit, Visit, VisitFilter, VisitSyncStatus};
