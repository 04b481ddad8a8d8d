use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smartsales_core::UserRole;

/// Platform user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Stable identifier.
    pub id: i64,
    /// Unique login name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Assigned role.
    pub role: UserRole,
    /// Registration timestamp.
    pub joined_at: DateTime<Utc>,
    /// Whether the account may authenticate.
    pub active: bool,
}
