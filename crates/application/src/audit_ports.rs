use async_trait::async_trait;
use smartsales_core::AppResult;
use smartsales_domain::AuditEntry;

/// Immutable audit entry payload emitted by application services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditEntry {
    /// Acting user.
    pub user_id: Option<i64>,
    /// Acting username snapshot.
    pub username: Option<String>,
    /// Free-text action description.
    pub action: String,
    /// Client IP.
    pub ip: Option<String>,
    /// Whether the documented operation succeeded.
    pub success: bool,
}

/// Query parameters for audit log listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogQuery {
    /// Case-insensitive match over username, action and IP.
    pub search: Option<String>,
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped.
    pub offset: usize,
}

/// Port for the append-only audit log.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Persists one audit entry.
    async fn append_entry(&self, entry: NewAuditEntry) -> AppResult<()>;

    /// Lists entries newest first.
    async fn list_entries(&self, query: AuditLogQuery) -> AppResult<Vec<AuditEntry>>;
}
