use std::future::Future;
use std::sync::Arc;

use smartsales_core::{ActorContext, AppResult};
use smartsales_domain::AuditEntry;
use tracing::warn;

use crate::{AuditLogQuery, AuditRepository, NewAuditEntry};

/// Cross-cutting audit recorder wrapped around mutating use cases.
///
/// Audit writes never fail the documented operation: storage errors are
/// logged and swallowed.
#[derive(Clone)]
pub struct AuditRecorder {
    repository: Arc<dyn AuditRepository>,
}

impl AuditRecorder {
    /// Creates a recorder backed by the given repository.
    #[must_use]
    pub fn new(repository: Arc<dyn AuditRepository>) -> Self {
        Self { repository }
    }

    /// Appends one entry attributed to `actor`.
    pub async fn record(&self, actor: &ActorContext, action: impl Into<String>, success: bool) {
        self.append(NewAuditEntry {
            user_id: Some(actor.user_id()),
            username: Some(actor.username().to_owned()),
            action: action.into(),
            ip: actor.client_ip().map(ToOwned::to_owned),
            success,
        })
        .await;
    }

    /// Appends one entry for an unauthenticated caller.
    pub async fn record_anonymous(
        &self,
        action: impl Into<String>,
        ip: Option<&str>,
        success: bool,
    ) {
        self.append(NewAuditEntry {
            user_id: None,
            username: None,
            action: action.into(),
            ip: ip.map(ToOwned::to_owned),
            success,
        })
        .await;
    }

    /// Runs `operation` and records its outcome.
    ///
    /// On success the entry text comes from `describe`; on failure an entry
    /// flagged unsuccessful is written from `attempt` and the error is returned.
    pub async fn audited<T, F, D>(
        &self,
        actor: &ActorContext,
        attempt: &str,
        operation: F,
        describe: D,
    ) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>> + Send,
        D: FnOnce(&T) -> String + Send,
        T: Send,
    {
        match operation.await {
            Ok(value) => {
                self.record(actor, describe(&value), true).await;
                Ok(value)
            }
            Err(error) => {
                self.record(actor, format!("{attempt} (fallido): {error}"), false)
                    .await;
                Err(error)
            }
        }
    }

    /// Lists audit entries for administrators.
    pub async fn list_entries(
        &self,
        actor: &ActorContext,
        query: AuditLogQuery,
    ) -> AppResult<Vec<AuditEntry>> {
        actor.require_admin()?;
        self.repository.list_entries(query).await
    }

    async fn append(&self, entry: NewAuditEntry) {
        let action = entry.action.clone();
        if let Err(error) = self.repository.append_entry(entry).await {
            warn!(%action, error = %error, "failed to append audit entry");
        }
    }
}

impl std::fmt::Debug for AuditRecorder {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("AuditRecorder").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use smartsales_core::{ActorContext, AppError, AppResult, UserRole};
    use smartsales_domain::AuditEntry;
    use tokio::sync::Mutex;

    use super::AuditRecorder;
    use crate::{AuditLogQuery, AuditRepository, NewAuditEntry};

    #[derive(Default)]
    struct RecordingAuditRepository {
        entries: Mutex<Vec<NewAuditEntry>>,
        fail_writes: bool,
    }

    #[async_trait]
    impl AuditRepository for RecordingAuditRepository {
        async fn append_entry(&self, entry: NewAuditEntry) -> AppResult<()> {
            if self.fail_writes {
                return Err(AppError::Internal("audit table unavailable".to_owned()));
            }
            self.entries.lock().await.push(entry);
            Ok(())
        }

        async fn list_entries(&self, _query: AuditLogQuery) -> AppResult<Vec<AuditEntry>> {
            Ok(Vec::new())
        }
    }

    fn actor(role: UserRole) -> ActorContext {
        ActorContext::new(5, "marta", role, Some("10.0.0.8".to_owned()))
    }

    #[tokio::test]
    async fn successful_operation_records_description_with_ip() {
        let repository = Arc::new(RecordingAuditRepository::default());
        let recorder = AuditRecorder::new(repository.clone());

        let result = recorder
            .audited(
                &actor(UserRole::Administrador),
                "Crear marca",
                async { Ok::<_, AppError>("LG".to_owned()) },
                |name| format!("Creó marca: {name}"),
            )
            .await;

        assert!(result.is_ok());
        let entries = repository.entries.lock().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "Creó marca: LG");
        assert_eq!(entries[0].ip.as_deref(), Some("10.0.0.8"));
        assert!(entries[0].success);
    }

    #[tokio::test]
    async fn failed_operation_records_unsuccessful_entry_and_returns_error() {
        let repository = Arc::new(RecordingAuditRepository::default());
        let recorder = AuditRecorder::new(repository.clone());

        let result: AppResult<()> = recorder
            .audited(
                &actor(UserRole::Cliente),
                "Cancelar venta #3",
                async { Err(AppError::Conflict("ya cancelada".to_owned())) },
                |_| String::new(),
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        let entries = repository.entries.lock().await;
        assert!(!entries[0].success);
        assert!(entries[0].action.starts_with("Cancelar venta #3 (fallido)"));
    }

    #[tokio::test]
    async fn audit_storage_failure_does_not_fail_operation() {
        let repository = Arc::new(RecordingAuditRepository {
            entries: Mutex::new(Vec::new()),
            fail_writes: true,
        });
        let recorder = AuditRecorder::new(repository);

        let result = recorder
            .audited(
                &actor(UserRole::Administrador),
                "Crear categoría",
                async { Ok::<_, AppError>(1_i64) },
                |id| format!("Creó categoría #{id}"),
            )
            .await;

        assert!(matches!(result, Ok(1)));
    }

    #[tokio::test]
    async fn listing_requires_admin() {
        let recorder = AuditRecorder::new(Arc::new(RecordingAuditRepository::default()));
        let query = AuditLogQuery {
            search: None,
            limit: 50,
            offset: 0,
        };

        let result = recorder.list_entries(&actor(UserRole::Tecnico), query).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
