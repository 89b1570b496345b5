//! Serialized read-modify-write access to the document file.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::Document;

/// Store for the timetable document.
///
/// Readers share the lock; each mutation holds it exclusively from the read
/// through the final rename, so concurrent writers cannot lose each other's
/// changes. Other processes writing the same file are not coordinated.
pub struct DocumentStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl DocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full document.
    pub async fn load(&self) -> Result<Document, AppError> {
        let _guard = self.lock.read().await;
        self.read_file().await
    }

    /// Overwrite the document as given, only stamping `lastUpdated`.
    /// Returns what was written.
    pub async fn replace(&self, mut document: Document) -> Result<Document, AppError> {
        let _guard = self.lock.write().await;
        self.write_file(&mut document).await?;
        tracing::info!("Replaced database ({} top-level fields)", document.as_map().len());
        Ok(document)
    }

    /// Get a semester by name.
    pub async fn semester(&self, name: &str) -> Result<Value, AppError> {
        let document = self.load().await?;
        document
            .semester(name)?
            .cloned()
            .ok_or_else(|| AppError::NotFound(name.to_string()))
    }

    /// Create an empty semester and return it.
    pub async fn create_semester(&self, name: &str) -> Result<Value, AppError> {
        let semester = self
            .modify(|document| {
                document
                    .add_semester(name)?
                    .cloned()
                    .ok_or_else(|| AppError::Conflict(name.to_string()))
            })
            .await?;

        tracing::info!("Created semester {:?}", name);
        Ok(semester)
    }

    /// Delete a semester, moving the current selection if needed.
    pub async fn delete_semester(&self, name: &str) -> Result<(), AppError> {
        self.modify(|document| {
            if document.remove_semester(name)? {
                Ok(())
            } else {
                Err(AppError::NotFound(name.to_string()))
            }
        })
        .await?;

        tracing::info!("Deleted semester {:?}", name);
        Ok(())
    }

    /// Run `f` against the current document and persist the result.
    /// Nothing is written if `f` fails.
    async fn modify<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Document) -> Result<T, AppError>,
    {
        let _guard = self.lock.write().await;
        let mut document = self.read_file().await?;
        let output = f(&mut document)?;
        self.write_file(&mut document).await?;
        Ok(output)
    }

    async fn read_file(&self) -> Result<Document, AppError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(AppError::storage_read)?;
        serde_json::from_str(&raw).map_err(AppError::storage_read)
    }

    /// Write through a sibling temp file and rename it into place.
    async fn write_file(&self, document: &mut Document) -> Result<(), AppError> {
        document.stamp(Utc::now());
        let json = serde_json::to_string_pretty(document).map_err(AppError::storage_write)?;

        let tmp_path = self.tmp_path();
        tokio::fs::write(&tmp_path, json)
            .await
            .map_err(AppError::storage_write)?;

        if let Err(e) = tokio::fs::rename(&tmp_path, &self.path).await {
            tokio::fs::remove_file(&tmp_path).await.ok();
            return Err(AppError::storage_write(e));
        }

        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_SEMESTER;
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn seeded_store() -> (DocumentStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = DocumentStore::new(temp_dir.path().join("timetable.json"));
        store.replace(Document::seed()).await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_replace_stamps_last_updated() {
        let (store, _temp_dir) = seeded_store().await;
        let before = store.load().await.unwrap().last_updated().unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let doc: Document = serde_json::from_value(serde_json::json!({
            "currentSemester": "Client Choice",
            "lastUpdated": "1999-01-01T00:00:00.000Z"
        }))
        .unwrap();
        let written = store.replace(doc).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, written);
        assert_eq!(loaded.current_semester(), Some("Client Choice"));
        assert!(loaded.last_updated().unwrap() > before);
        // No semesters key is invented for the caller
        assert!(!loaded.as_map().contains_key("semesters"));
    }

    #[tokio::test]
    async fn test_file_is_pretty_printed() {
        let (store, _temp_dir) = seeded_store().await;
        let raw = std::fs::read_to_string(store.path()).unwrap();

        assert!(raw.starts_with("{\n  \"semesters\""));
        assert!(!store.tmp_path().exists());
    }

    #[tokio::test]
    async fn test_create_conflict_leaves_file_untouched() {
        let (store, _temp_dir) = seeded_store().await;
        let before = std::fs::read_to_string(store.path()).unwrap();

        let err = store.create_semester(DEFAULT_SEMESTER).await.unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);
    }

    #[tokio::test]
    async fn test_delete_missing_leaves_file_untouched() {
        let (store, _temp_dir) = seeded_store().await;
        let before = std::fs::read_to_string(store.path()).unwrap();

        let err = store.delete_semester("Nope").await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);
    }

    #[tokio::test]
    async fn test_semester_not_found() {
        let (store, _temp_dir) = seeded_store().await;
        assert!(matches!(
            store.semester("Nope").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_file_is_read_failure() {
        let temp_dir = TempDir::new().unwrap();
        let store = DocumentStore::new(temp_dir.path().join("absent.json"));

        assert!(matches!(store.load().await, Err(AppError::StorageRead(_))));
        assert!(matches!(
            store.create_semester("X").await,
            Err(AppError::StorageRead(_))
        ));
    }

    #[tokio::test]
    async fn test_write_failure() {
        let temp_dir = TempDir::new().unwrap();
        let store = DocumentStore::new(temp_dir.path().join("missing-dir").join("db.json"));

        let err = store.replace(Document::seed()).await.unwrap_err();
        assert!(matches!(err, AppError::StorageWrite(_)));
    }

    #[tokio::test]
    async fn test_failed_rename_removes_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        // A non-empty directory in place of the data file makes the rename fail
        let path = temp_dir.path().join("timetable.json");
        std::fs::create_dir_all(path.join("occupied")).unwrap();
        let store = DocumentStore::new(&path);

        let err = store.replace(Document::seed()).await.unwrap_err();

        assert!(matches!(err, AppError::StorageWrite(_)));
        assert!(!store.tmp_path().exists());
    }

    #[tokio::test]
    async fn test_semester_ops_on_document_without_semesters() {
        let (store, _temp_dir) = seeded_store().await;
        let doc: Document =
            serde_json::from_value(serde_json::json!({ "currentSemester": null })).unwrap();
        store.replace(doc).await.unwrap();
        let before = std::fs::read_to_string(store.path()).unwrap();

        assert!(matches!(
            store.semester(DEFAULT_SEMESTER).await,
            Err(AppError::StorageRead(_))
        ));
        assert!(matches!(
            store.create_semester("X").await,
            Err(AppError::StorageRead(_))
        ));
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);
    }

    #[tokio::test]
    async fn test_concurrent_creates_are_not_lost() {
        let (store, _temp_dir) = seeded_store().await;
        let store = Arc::new(store);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.create_semester(&format!("Term {}", i)).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let doc = store.load().await.unwrap();
        assert_eq!(doc.semesters().unwrap().len(), 17);
        for i in 0..16 {
            assert!(doc.semester(&format!("Term {}", i)).unwrap().is_some());
        }
    }
}
