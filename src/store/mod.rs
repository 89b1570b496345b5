//! Document store backed by a single JSON file.
//!
//! The file is the source of truth; every request reads it in full and every
//! mutation rewrites it in full.

mod document_store;

pub use document_store::*;

use std::path::Path;

use crate::errors::AppError;
use crate::models::Document;

/// Open the document file, seeding it on first start.
pub async fn init_store(data_file: &Path) -> Result<DocumentStore, AppError> {
    // Ensure the parent directory exists
    if let Some(parent) = data_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(AppError::storage_write)?;
    }

    let store = DocumentStore::new(data_file);

    let exists = tokio::fs::try_exists(data_file)
        .await
        .map_err(AppError::storage_read)?;

    if exists {
        // Never overwrite an existing file, even one we cannot parse.
        if store.load().await.is_err() {
            tracing::warn!(
                "Existing database {:?} is unreadable; requests will fail until it is fixed",
                data_file
            );
        }
    } else {
        store.replace(Document::seed()).await?;
        tracing::info!("Created database {:?} with default semester", data_file);
    }

    Ok(store)
}
