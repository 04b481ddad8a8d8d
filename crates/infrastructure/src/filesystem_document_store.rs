use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use smartsales_application::DocumentStore;
use smartsales_core::{AppError, AppResult};
use tracing::debug;

/// Stores generated documents below a media root directory.
///
/// Keys are relative paths such as `reportes/3_reporte_ventas_20240901_101500_9f2c4e1a07.pdf`;
/// absolute keys and parent-directory segments are rejected.
#[derive(Debug, Clone)]
pub struct FilesystemDocumentStore {
    root: PathBuf,
}

impl FilesystemDocumentStore {
    /// Creates a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(key);
        let is_plain = !key.trim().is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !is_plain {
            return Err(AppError::Validation(format!(
                "ruta de documento inválida '{key}'"
            )));
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl DocumentStore for FilesystemDocumentStore {
    async fn save(&self, key: &str, bytes: &[u8]) -> AppResult<String> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|error| {
                AppError::Internal(format!(
                    "failed to create directory '{}': {error}",
                    parent.display()
                ))
            })?;
        }

        let staging = path.with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
        tokio::fs::write(&staging, bytes).await.map_err(|error| {
            AppError::Internal(format!(
                "failed to write document '{}': {error}",
                staging.display()
            ))
        })?;
        tokio::fs::rename(&staging, &path).await.map_err(|error| {
            AppError::Internal(format!(
                "failed to move document into '{}': {error}",
                path.display()
            ))
        })?;

        debug!(key, bytes = bytes.len(), "document stored");
        Ok(key.to_owned())
    }

    async fn read(&self, path: &str) -> AppResult<Vec<u8>> {
        let resolved = self.resolve(path)?;
        tokio::fs::read(&resolved).await.map_err(|error| {
            if error.kind() == ErrorKind::NotFound {
                AppError::NotFound(format!("archivo {path} no encontrado"))
            } else {
                AppError::Internal(format!("failed to read document '{path}': {error}"))
            }
        })
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        let resolved = self.resolve(path)?;
        match tokio::fs::remove_file(&resolved).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(AppError::Internal(format!(
                "failed to delete document '{path}': {error}"
            ))),
        }
    }
}
