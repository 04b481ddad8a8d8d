use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only audit log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Stable identifier.
    pub id: i64,
    /// Acting user, absent for anonymous actions.
    pub user_id: Option<i64>,
    /// Acting username snapshot.
    pub username: Option<String>,
    /// Free-text action description.
    pub action: String,
    /// Client IP.
    pub ip: Option<String>,
    /// Timestamp.
    pub recorded_at: DateTime<Utc>,
    /// Whether the documented operation succeeded.
    pub success: bool,
}
