//! The acting admin account.
//!
//! Lifecycle: start from the cached account (if any), serve from it
//! immediately, then replace it with the server's fresh copy once that
//! arrives. The cache file is rewritten on every successful refresh.

use std::path::Path;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::AdminUser;
use crate::upstream::LeadsApi;

#[derive(Debug, Default)]
pub struct Session {
    admin: Option<AdminUser>,
    fresh: bool,
}

/// Serializable snapshot of the session for the dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub admin: Option<AdminUser>,
    /// False while only the cached copy has been seen.
    pub fresh: bool,
}

impl Session {
    pub fn new(cached: Option<AdminUser>) -> Self {
        Self {
            admin: cached,
            fresh: false,
        }
    }

    pub fn current(&self) -> Option<&AdminUser> {
        self.admin.as_ref()
    }

    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    /// The acting account, or a permission error when nobody is logged in.
    pub fn require(&self) -> Result<&AdminUser, AppError> {
        self.current()
            .ok_or_else(|| AppError::Permission("No admin session".to_string()))
    }

    pub fn replace(&mut self, admin: AdminUser) {
        self.admin = Some(admin);
        self.fresh = true;
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            admin: self.current().cloned(),
            fresh: self.is_fresh(),
        }
    }
}

/// Read the cached account. A missing or unreadable cache is not an error.
pub async fn load_cached(path: &Path) -> Option<AdminUser> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!("Failed to read session cache {:?}: {}", path, e);
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(admin) => Some(admin),
        Err(e) => {
            tracing::warn!("Ignoring corrupt session cache {:?}: {}", path, e);
            None
        }
    }
}

pub async fn store_cached(path: &Path, admin: &AdminUser) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, serde_json::to_vec_pretty(admin)?).await?;
    Ok(())
}

/// Fetch the fresh account from upstream and install it.
///
/// On failure the cached account stays in place.
pub async fn refresh(
    session: &RwLock<Session>,
    api: &dyn LeadsApi,
    cache_path: &Path,
) -> Result<AdminUser, AppError> {
    let admin = api.fresh_admin().await.map_err(|e| {
        tracing::warn!("Failed to refresh admin session: {}", e);
        e
    })?;

    session.write().await.replace(admin.clone());
    tracing::info!(admin = %admin.id, role = ?admin.role, "Admin session refreshed");

    if let Err(e) = store_cached(cache_path, &admin).await {
        tracing::warn!("Failed to write session cache: {}", e);
    }
    Ok(admin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::fake::{admin, superadmin, InMemoryApi};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_cache_loads_nothing() {
        let dir = TempDir::new().unwrap();
        assert!(load_cached(&dir.path().join("none.json")).await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_cache_is_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();
        assert!(load_cached(&path).await.is_none());
    }

    #[tokio::test]
    async fn test_refresh_replaces_cached_and_rewrites_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("session.json");
        store_cached(&path, &admin(Some("W1"))).await.unwrap();

        let session = RwLock::new(Session::new(load_cached(&path).await));
        assert_eq!(
            session.read().await.require().unwrap().worker_id(),
            Some("W1")
        );
        assert!(!session.read().await.is_fresh());

        let api = InMemoryApi::default();
        api.set_admin(superadmin());
        refresh(&session, &api, &path).await.unwrap();

        let current = session.read().await;
        assert!(current.is_fresh());
        assert!(current.require().unwrap().is_superadmin());
        assert!(load_cached(&path).await.unwrap().is_superadmin());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_cached_admin() {
        let dir = TempDir::new().unwrap();
        let session = RwLock::new(Session::new(Some(admin(Some("W1")))));
        let api = InMemoryApi::default();
        api.set_offline(true);

        assert!(refresh(&session, &api, &dir.path().join("s.json"))
            .await
            .is_err());
        assert_eq!(session.read().await.current().unwrap().id, "A1");
    }

    #[test]
    fn test_require_without_admin() {
        let session = Session::new(None);
        assert!(matches!(session.require(), Err(AppError::Permission(_))));
    }
}
