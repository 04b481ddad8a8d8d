use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use smartsales_core::{AppError, AppResult, UserRole};
use smartsales_domain::UserAccount;
use tokio::sync::Mutex;

use super::{CreateUserInput, UserService, token_crypto};
use crate::test_support::{actor, recorder};
use crate::{NewUserAccount, UserRepository};

#[derive(Default)]
struct InMemoryUsers {
    accounts: Mutex<Vec<(UserAccount, String)>>,
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<UserAccount>> {
        Ok(self
            .accounts
            .lock()
            .await
            .iter()
            .find(|(_, hash)| hash == token_hash)
            .map(|(account, _)| account.clone()))
    }

    async fn find_by_id(&self, user_id: i64) -> AppResult<Option<UserAccount>> {
        Ok(self
            .accounts
            .lock()
            .await
            .iter()
            .find(|(account, _)| account.id == user_id)
            .map(|(account, _)| account.clone()))
    }

    async fn list_users(&self, role: Option<UserRole>) -> AppResult<Vec<UserAccount>> {
        Ok(self
            .accounts
            .lock()
            .await
            .iter()
            .filter(|(account, _)| role.is_none_or(|role| account.role == role))
            .map(|(account, _)| account.clone())
            .collect())
    }

    async fn has_administrator(&self) -> AppResult<bool> {
        Ok(self
            .accounts
            .lock()
            .await
            .iter()
            .any(|(account, _)| account.role == UserRole::Administrador))
    }

    async fn create_user(&self, input: NewUserAccount) -> AppResult<UserAccount> {
        let mut accounts = self.accounts.lock().await;
        if accounts
            .iter()
            .any(|(account, _)| account.username == input.username)
        {
            return Err(AppError::Conflict(format!(
                "el usuario '{}' ya existe",
                input.username
            )));
        }
        let account = UserAccount {
            id: i64::try_from(accounts.len()).unwrap_or_default() + 1,
            username: input.username,
            email: input.email,
            phone: input.phone,
            address: input.address,
            role: input.role,
            joined_at: Utc::now(),
            active: true,
        };
        accounts.push((account.clone(), input.token_hash));
        Ok(account)
    }

    async fn update_role(&self, user_id: i64, role: UserRole) -> AppResult<UserAccount> {
        let mut accounts = self.accounts.lock().await;
        let (account, _) = accounts
            .iter_mut()
            .find(|(account, _)| account.id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("usuario {user_id}")))?;
        account.role = role;
        Ok(account.clone())
    }

    async fn delete_user(&self, user_id: i64) -> AppResult<()> {
        self.accounts
            .lock()
            .await
            .retain(|(account, _)| account.id != user_id);
        Ok(())
    }
}

fn input(username: &str, role: UserRole) -> CreateUserInput {
    CreateUserInput {
        username: username.to_owned(),
        email: format!("{username}@smartsales.test"),
        phone: None,
        address: None,
        role,
    }
}

#[tokio::test]
async fn bootstrap_admin_runs_once_and_token_authenticates() {
    let (audit, _) = recorder();
    let service = UserService::new(Arc::new(InMemoryUsers::default()), audit);

    let first = service.bootstrap_admin("  seed-token ").await;
    let second = service.bootstrap_admin("other-token").await;

    assert!(matches!(first, Ok(Some(ref account)) if account.role == UserRole::Administrador));
    assert!(matches!(second, Ok(None)));
    assert!(matches!(
        service.authenticate_token("seed-token").await,
        Ok(ref account) if account.username == "admin"
    ));
    assert!(matches!(
        service.authenticate_token("other-token").await,
        Err(AppError::Unauthorized(_))
    ));
    assert!(matches!(
        service.authenticate_token("").await,
        Err(AppError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn created_user_token_is_returned_once_and_only_hash_is_stored() {
    let repository = Arc::new(InMemoryUsers::default());
    let (audit, entries) = recorder();
    let service = UserService::new(repository.clone(), audit);

    let Ok(issued) = service
        .create_user(&actor(1, UserRole::Administrador), input("rosa", UserRole::Tecnico))
        .await
    else {
        panic!("admin should create user");
    };

    let stored_hash = repository.accounts.lock().await[0].1.clone();
    assert_eq!(stored_hash, token_crypto::hash_token(&issued.token));
    assert_ne!(stored_hash, issued.token);
    assert!(service.authenticate_token(&issued.token).await.is_ok());
    assert_eq!(
        entries.actions().await,
        vec!["Creó usuario: rosa con rol tecnico".to_owned()]
    );
}

#[tokio::test]
async fn user_management_is_admin_only() {
    let (audit, _) = recorder();
    let service = UserService::new(Arc::new(InMemoryUsers::default()), audit);
    let customer = actor(3, UserRole::Cliente);

    let create = service.create_user(&customer, input("eve", UserRole::Administrador)).await;
    let list = service.list_users(&customer, None).await;
    let delete = service.delete_user(&customer, 1).await;

    assert!(matches!(create, Err(AppError::Forbidden(_))));
    assert!(matches!(list, Err(AppError::Forbidden(_))));
    assert!(matches!(delete, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn invalid_email_and_duplicate_username_are_rejected() {
    let (audit, entries) = recorder();
    let service = UserService::new(Arc::new(InMemoryUsers::default()), audit);
    let admin = actor(1, UserRole::Administrador);

    let mut bad_email = input("leo", UserRole::Cliente);
    bad_email.email = "leo-at-example".to_owned();
    assert!(matches!(
        service.create_user(&admin, bad_email).await,
        Err(AppError::Validation(_))
    ));

    assert!(service.create_user(&admin, input("leo", UserRole::Cliente)).await.is_ok());
    let duplicate = service.create_user(&admin, input("leo", UserRole::Cliente)).await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let entries = entries.entries.lock().await;
    assert!(!entries[1].success);
}

#[tokio::test]
async fn role_change_and_deletion_are_audited() {
    let (audit, entries) = recorder();
    let service = UserService::new(Arc::new(InMemoryUsers::default()), audit);
    let admin = actor(99, UserRole::Administrador);
    let Ok(issued) = service.create_user(&admin, input("tomas", UserRole::Cliente)).await else {
        panic!("user should be created");
    };

    let changed = service
        .change_role(&admin, issued.account.id, UserRole::Tecnico)
        .await;
    assert!(matches!(changed, Ok(ref account) if account.role == UserRole::Tecnico));
    assert!(service.delete_user(&admin, issued.account.id).await.is_ok());

    let self_demotion = service.change_role(&admin, 99, UserRole::Cliente).await;
    assert!(matches!(self_demotion, Err(AppError::Conflict(_))));

    let actions = entries.actions().await;
    assert_eq!(actions[1], "Asignó rol tecnico al usuario tomas");
    assert_eq!(actions[2], "Eliminó usuario: tomas");
}

#[test]
fn role_catalogue_lists_every_role() {
    let (audit, _) = recorder();
    let service = UserService::new(Arc::new(InMemoryUsers::default()), audit);

    let roles = service.list_roles();
    assert_eq!(roles.len(), UserRole::all().len());
    assert!(roles.iter().all(|role| !role.capabilities.is_empty()));
}
