use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

/// Fixed platform roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Shopper buying products and requesting maintenance.
    Cliente,
    /// Technician handling assigned maintenance tickets.
    Tecnico,
    /// Back-office administrator.
    Administrador,
}

impl UserRole {
    /// Returns the stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cliente => "cliente",
            Self::Tecnico => "tecnico",
            Self::Administrador => "administrador",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[UserRole] = &[UserRole::Cliente, UserRole::Tecnico, UserRole::Administrador];

        ALL
    }
}

impl Display for UserRole {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "cliente" => Ok(Self::Cliente),
            "tecnico" | "técnico" => Ok(Self::Tecnico),
            "administrador" | "admin" => Ok(Self::Administrador),
            other => Err(AppError::Validation(format!("unknown role '{other}'"))),
        }
    }
}

/// Explicit request context carried into every use case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    user_id: i64,
    username: String,
    role: UserRole,
    client_ip: Option<String>,
}

impl ActorContext {
    /// Creates a request context for an authenticated user.
    #[must_use]
    pub fn new(
        user_id: i64,
        username: impl Into<String>,
        role: UserRole,
        client_ip: Option<String>,
    ) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
            client_ip,
        }
    }

    /// Returns the authenticated user identifier.
    #[must_use]
    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Returns the authenticated username.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Returns the role of the caller.
    #[must_use]
    pub fn role(&self) -> UserRole {
        self.role
    }

    /// Returns the client IP resolved for the request, if known.
    #[must_use]
    pub fn client_ip(&self) -> Option<&str> {
        self.client_ip.as_deref()
    }

    /// Returns whether the caller is an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Administrador
    }

    /// Fails with a forbidden error unless the caller is an administrator.
    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{}' requires the administrador role",
            self.username
        )))
    }

    /// Fails unless the caller is an administrator or the owner of the resource.
    pub fn require_owner_or_admin(&self, owner_id: i64) -> AppResult<()> {
        if self.is_admin() || self.user_id == owner_id {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{}' cannot access a resource owned by another user",
            self.username
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::{ActorContext, UserRole};
    use crate::AppError;

    #[test]
    fn role_parsing_accepts_accents_and_aliases() {
        assert!(matches!("Técnico".parse::<UserRole>(), Ok(UserRole::Tecnico)));
        assert!(matches!("admin".parse::<UserRole>(), Ok(UserRole::Administrador)));
        assert!("gerente".parse::<UserRole>().is_err());
    }

    #[test]
    fn owner_check_allows_admin_and_owner_only() {
        let owner = ActorContext::new(7, "ana", UserRole::Cliente, None);
        let other = ActorContext::new(8, "luis", UserRole::Cliente, None);
        let admin = ActorContext::new(1, "root", UserRole::Administrador, None);

        assert!(owner.require_owner_or_admin(7).is_ok());
        assert!(admin.require_owner_or_admin(7).is_ok());
        assert!(matches!(
            other.require_owner_or_admin(7),
            Err(AppError::Forbidden(_))
        ));
    }
}
