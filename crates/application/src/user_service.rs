use std::sync::Arc;

use smartsales_core::{ActorContext, AppError, AppResult, NonEmptyString, UserRole};
use smartsales_domain::UserAccount;

use crate::{AuditRecorder, NewUserAccount, UserRepository};

mod token_crypto;

#[cfg(test)]
mod tests;

/// Input for administrator-driven account creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserInput {
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
}

/// Account created together with its one-time raw token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedUser {
    /// Stored account.
    pub account: UserAccount,
    /// Raw bearer token; only its hash is persisted.
    pub token: String,
}

/// Role listing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleDescriptor {
    /// Role value.
    pub role: UserRole,
    /// Human description.
    pub description: &'static str,
    /// Capabilities granted by the role.
    pub capabilities: &'static [&'static str],
}

/// Application service for accounts, bearer tokens and roles.
#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    audit: AuditRecorder,
}

impl UserService {
    /// Creates a new user service.
    #[must_use]
    pub fn new(repository: Arc<dyn UserRepository>, audit: AuditRecorder) -> Self {
        Self { repository, audit }
    }

    /// Resolves a raw bearer token into an active account.
    pub async fn authenticate_token(&self, raw_token: &str) -> AppResult<UserAccount> {
        let token = raw_token.trim();
        if token.is_empty() {
            return Err(AppError::Unauthorized("authentication required".to_owned()));
        }

        self.repository
            .find_by_token_hash(&token_crypto::hash_token(token))
            .await?
            .filter(|account| account.active)
            .ok_or_else(|| AppError::Unauthorized("invalid or inactive token".to_owned()))
    }

    /// Seeds an administrator with a configured token when none exists yet.
    pub async fn bootstrap_admin(&self, raw_token: &str) -> AppResult<Option<UserAccount>> {
        if self.repository.has_administrator().await? {
            return Ok(None);
        }

        let account = self
            .repository
            .create_user(NewUserAccount {
                username: "admin".to_owned(),
                email: "admin@smartsales.local".to_owned(),
                phone: None,
                address: None,
                role: UserRole::Administrador,
                token_hash: token_crypto::hash_token(raw_token.trim()),
            })
            .await?;
        self.audit
            .record_anonymous("Creó administrador inicial", None, true)
            .await;

        Ok(Some(account))
    }

    /// Creates an account and returns its raw token once.
    pub async fn create_user(
        &self,
        actor: &ActorContext,
        input: CreateUserInput,
    ) -> AppResult<IssuedUser> {
        actor.require_admin()?;
        let username = NonEmptyString::new(input.username)?;
        let email = NonEmptyString::new(input.email)?;
        if !email.as_str().contains('@') {
            return Err(AppError::Validation("email inválido".to_owned()));
        }

        let (token, token_hash) = token_crypto::generate_token()?;
        let repository = self.repository.clone();
        let account = self
            .audit
            .audited(
                actor,
                &format!("Crear usuario {}", username.as_str()),
                async move {
                    repository
                        .create_user(NewUserAccount {
                            username: username.into(),
                            email: email.into(),
                            phone: input.phone,
                            address: input.address,
                            role: input.role,
                            token_hash,
                        })
                        .await
                },
                |account: &UserAccount| {
                    format!(
                        "Creó usuario: {} con rol {}",
                        account.username, account.role
                    )
                },
            )
            .await?;

        Ok(IssuedUser { account, token })
    }

    /// Lists accounts for administrators.
    pub async fn list_users(
        &self,
        actor: &ActorContext,
        role: Option<UserRole>,
    ) -> AppResult<Vec<UserAccount>> {
        actor.require_admin()?;
        self.repository.list_users(role).await
    }

    /// Returns the caller's own account.
    pub async fn current_user(&self, actor: &ActorContext) -> AppResult<UserAccount> {
        self.repository
            .find_by_id(actor.user_id())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("usuario {}", actor.user_id())))
    }

    /// Changes the role of another account.
    pub async fn change_role(
        &self,
        actor: &ActorContext,
        user_id: i64,
        role: UserRole,
    ) -> AppResult<UserAccount> {
        actor.require_admin()?;
        if user_id == actor.user_id() && role != UserRole::Administrador {
            return Err(AppError::Conflict(
                "un administrador no puede quitarse su propio rol".to_owned(),
            ));
        }

        self.audit
            .audited(
                actor,
                &format!("Cambiar rol del usuario #{user_id}"),
                self.repository.update_role(user_id, role),
                |account: &UserAccount| {
                    format!("Asignó rol {} al usuario {}", account.role, account.username)
                },
            )
            .await
    }

    /// Deletes an account.
    pub async fn delete_user(&self, actor: &ActorContext, user_id: i64) -> AppResult<()> {
        actor.require_admin()?;
        if user_id == actor.user_id() {
            return Err(AppError::Conflict(
                "un administrador no puede eliminar su propia cuenta".to_owned(),
            ));
        }
        let account = self
            .repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("usuario {user_id}")))?;

        self.audit
            .audited(
                actor,
                &format!("Eliminar usuario #{user_id}"),
                self.repository.delete_user(user_id),
                |_| format!("Eliminó usuario: {}", account.username),
            )
            .await
    }

    /// Fixed role catalogue.
    #[must_use]
    pub fn list_roles(&self) -> Vec<RoleDescriptor> {
        UserRole::all()
            .iter()
            .map(|role| match role {
                UserRole::Cliente => RoleDescriptor {
                    role: *role,
                    description: "Compra productos y solicita mantenimientos",
                    capabilities: &["catalogo.leer", "carrito", "compras", "mantenimiento.solicitar"],
                },
                UserRole::Tecnico => RoleDescriptor {
                    role: *role,
                    description: "Atiende mantenimientos asignados",
                    capabilities: &["catalogo.leer", "mantenimiento.atender"],
                },
                UserRole::Administrador => RoleDescriptor {
                    role: *role,
                    description: "Administra catálogo, ventas, usuarios y reportes",
                    capabilities: &[
                        "catalogo.administrar",
                        "ventas.administrar",
                        "usuarios.administrar",
                        "reportes",
                        "bitacora.leer",
                    ],
                },
            })
            .collect()
    }
}
