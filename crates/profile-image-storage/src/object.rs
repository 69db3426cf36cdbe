//! `object_store` operations shared by the S3 and local backends.

use crate::traits::{StorageError, StorageResult};
use bytes::Bytes;
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{Attribute, Attributes, ObjectStore, ObjectStoreExt, PutOptions, PutPayload};

/// Store location for `key`, taken verbatim (`Path::from` percent-encodes `[`, `%`
/// and friends, which would split the written key from the one in the URL).
pub(crate) fn store_path(key: &str) -> StorageResult<Path> {
    Path::parse(key).map_err(|e| StorageError::InvalidKey(format!("{}: {}", key, e)))
}

/// Put `data` at `key`, tagging it with `content_type` when the store supports
/// object attributes.
pub(crate) async fn put_object<S: ObjectStore + ?Sized>(
    store: &S,
    store_label: &str,
    key: &str,
    content_type: Option<&str>,
    data: Bytes,
) -> StorageResult<()> {
    let size = data.len() as u64;
    let location = store_path(key)?;
    let start = std::time::Instant::now();

    let mut attributes = Attributes::new();
    if let Some(content_type) = content_type {
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
    }
    let options = PutOptions {
        attributes,
        ..Default::default()
    };

    store
        .put_opts(&location, PutPayload::from(data), options)
        .await
        .map_err(|e| {
            tracing::error!(
                error = %e,
                store = %store_label,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Object upload failed"
            );
            StorageError::UploadFailed {
                key: key.to_string(),
                source: e,
            }
        })?;

    tracing::info!(
        store = %store_label,
        key = %key,
        size_bytes = size,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Object upload successful"
    );

    Ok(())
}

/// Delete `key`. A missing object is treated as already deleted.
pub(crate) async fn delete_object<S: ObjectStore + ?Sized>(
    store: &S,
    store_label: &str,
    key: &str,
) -> StorageResult<()> {
    let location = store_path(key)?;
    let start = std::time::Instant::now();

    match store.delete(&location).await {
        Ok(()) => {}
        Err(ObjectStoreError::NotFound { .. }) => {
            tracing::debug!(
                store = %store_label,
                key = %key,
                "Object already absent, treating delete as successful"
            );
            return Ok(());
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                store = %store_label,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Object delete failed"
            );
            return Err(StorageError::DeleteFailed {
                key: key.to_string(),
                source: e,
            });
        }
    }

    tracing::info!(
        store = %store_label,
        key = %key,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Object delete successful"
    );

    Ok(())
}

pub(crate) async fn object_exists<S: ObjectStore + ?Sized>(
    store: &S,
    key: &str,
) -> StorageResult<bool> {
    match store.head(&store_path(key)?).await {
        Ok(_) => Ok(true),
        Err(ObjectStoreError::NotFound { .. }) => Ok(false),
        Err(e) => Err(StorageError::BackendError(e)),
    }
}
