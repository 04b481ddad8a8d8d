use async_trait::async_trait;
use smartsales_core::{AppResult, UserRole};
use smartsales_domain::UserAccount;

/// Input for creating an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserAccount {
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
    /// SHA-256 hex of the bearer token.
    pub token_hash: String,
}

/// Repository port for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds an active account by bearer token hash.
    async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<UserAccount>>;

    /// Finds an account by identifier.
    async fn find_by_id(&self, user_id: i64) -> AppResult<Option<UserAccount>>;

    /// Lists accounts, optionally restricted to one role.
    async fn list_users(&self, role: Option<UserRole>) -> AppResult<Vec<UserAccount>>;

    /// Returns whether at least one administrator exists.
    async fn has_administrator(&self) -> AppResult<bool>;

    /// Creates an account; duplicate usernames are conflicts.
    async fn create_user(&self, input: NewUserAccount) -> AppResult<UserAccount>;

    /// Changes the role of an account.
    async fn update_role(&self, user_id: i64, role: UserRole) -> AppResult<UserAccount>;

    /// Deletes an account.
    async fn delete_user(&self, user_id: i64) -> AppResult<()>;
}
