//! Upload storage with content-hash deduplication and a filesystem backend.
//!
//! Image uploads are content-addressed: the BLAKE3 hash of the bytes decides
//! whether a new blob is written or an existing row is reused, so the same
//! hero image uploaded twice occupies one blob.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use pagelift_core::{new_v7, Error, Result, Upload};

/// Storage backend trait for different storage implementations.
///
/// Allows abstracting over filesystem, S3-compatible stores, or other
/// providers.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Write data to the specified path.
    async fn write(&self, path: &str, data: &[u8]) -> Result<()>;

    /// Read data from the specified path.
    async fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Delete data at the specified path.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Check if data exists at the specified path.
    async fn exists(&self, path: &str) -> Result<bool>;
}

/// Filesystem storage backend.
///
/// Stores blobs in a directory hierarchy based on UUIDv7 blob ids.
/// Path format: `{base_path}/blobs/{first-2-hex}/{next-2-hex}/{uuid}.bin`
pub struct FilesystemBackend {
    base_path: PathBuf,
}

impl FilesystemBackend {
    /// Create a new filesystem backend with the given base directory.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }

    /// Validate that the backend can write, read, and delete files.
    ///
    /// Runs a full round-trip at startup to catch filesystem issues
    /// (permissions, missing mounts) before the first upload does.
    pub async fn validate(&self) -> std::result::Result<(), String> {
        let test_dir = self.base_path.join("blobs/.health-check");
        let test_file = test_dir.join("test.bin");

        fs::create_dir_all(&test_dir)
            .await
            .map_err(|e| format!("create_dir_all({:?}): {}", test_dir, e))?;

        let data = b"storage-health-check";
        fs::write(&test_file, data)
            .await
            .map_err(|e| format!("write({:?}): {}", test_file, e))?;

        let read_back = fs::read(&test_file)
            .await
            .map_err(|e| format!("read({:?}): {}", test_file, e))?;
        if read_back != data {
            return Err("read-back mismatch".to_string());
        }

        fs::remove_file(&test_file)
            .await
            .map_err(|e| format!("remove_file({:?}): {}", test_file, e))?;
        let _ = fs::remove_dir(&test_dir).await;

        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FilesystemBackend {
    async fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.full_path(path);
        debug!(
            subsystem = "db",
            component = "file_storage",
            op = "write",
            storage_path = %path,
            size = data.len(),
            "Writing blob"
        );

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                warn!(parent = %parent.display(), error = %e, "create_dir_all failed");
                e
            })?;
        }

        // Atomic write: temp file + rename
        let temp_path = full_path.with_extension("tmp");
        fs::write(&temp_path, data).await?;
        fs::rename(&temp_path, &full_path).await?;
        Ok(())
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.full_path(path)).await?)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let full_path = self.full_path(path);
        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(fs::try_exists(self.full_path(path)).await?)
    }
}

/// Compute the BLAKE3 content hash of upload bytes (hex-encoded).
pub fn compute_content_hash(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Generate the storage path for a blob id.
///
/// Two levels of hex prefix fan the blobs out so no directory grows
/// unbounded.
pub fn generate_storage_path(blob_id: Uuid) -> String {
    let hex = blob_id.simple().to_string();
    format!("blobs/{}/{}/{}.bin", &hex[0..2], &hex[2..4], hex)
}

/// PostgreSQL upload repository writing blobs through a storage backend.
pub struct PgUploadRepository {
    pool: Pool<Postgres>,
    backend: Box<dyn StorageBackend>,
}

fn upload_from_row(row: &PgRow) -> Upload {
    Upload {
        id: row.get("id"),
        filename: row.get("filename"),
        content_type: row.get("content_type"),
        size_bytes: row.get("size_bytes"),
        content_hash: row.get("content_hash"),
        storage_path: row.get("storage_path"),
        public_url: row.get("public_url"),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
    }
}

impl PgUploadRepository {
    /// Create a new PgUploadRepository with the given pool and backend.
    pub fn new(pool: Pool<Postgres>, backend: impl StorageBackend + 'static) -> Self {
        Self {
            pool,
            backend: Box::new(backend),
        }
    }

    /// Store an upload, reusing the existing blob when the same content was
    /// uploaded before. `public_base` is the URL prefix uploads are served
    /// from.
    pub async fn store(
        &self,
        created_by: Uuid,
        filename: &str,
        content_type: &str,
        data: &[u8],
        public_base: &str,
    ) -> Result<Upload> {
        let content_hash = compute_content_hash(data);

        // Same bytes already stored: return the existing row.
        let existing = sqlx::query(
            "SELECT id, filename, content_type, size_bytes, content_hash, storage_path, \
             public_url, created_by, created_at \
             FROM uploads WHERE content_hash = $1",
        )
        .bind(&content_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        if let Some(row) = existing {
            debug!(
                subsystem = "db",
                component = "file_storage",
                op = "store",
                content_hash = %content_hash,
                "Upload deduplicated against existing blob"
            );
            return Ok(upload_from_row(&row));
        }

        let id = new_v7();
        let storage_path = generate_storage_path(id);
        self.backend.write(&storage_path, data).await?;

        let public_url = format!("{}/{}", public_base.trim_end_matches('/'), storage_path);

        let row = sqlx::query(
            r#"
            INSERT INTO uploads
                (id, filename, content_type, size_bytes, content_hash, storage_path,
                 public_url, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, filename, content_type, size_bytes, content_hash, storage_path,
                      public_url, created_by, created_at
            "#,
        )
        .bind(id)
        .bind(filename)
        .bind(content_type)
        .bind(data.len() as i64)
        .bind(&content_hash)
        .bind(&storage_path)
        .bind(&public_url)
        .bind(created_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(upload_from_row(&row))
    }

    /// Read an upload's bytes by storage path.
    pub async fn read(&self, storage_path: &str) -> Result<Vec<u8>> {
        self.backend.read(storage_path).await
    }

    /// Delete an upload by its public URL. Returns false when no row
    /// matched.
    pub async fn delete_by_url(&self, public_url: &str) -> Result<bool> {
        let row = sqlx::query("SELECT id, storage_path FROM uploads WHERE public_url = $1")
            .bind(public_url)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        let Some(row) = row else {
            return Ok(false);
        };
        let id: Uuid = row.get("id");
        let storage_path: String = row.get("storage_path");

        self.backend.delete(&storage_path).await?;

        sqlx::query("DELETE FROM uploads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_is_stable() {
        let a = compute_content_hash(b"hello");
        let b = compute_content_hash(b"hello");
        assert_eq!(a, b);
        assert_ne!(a, compute_content_hash(b"world"));
    }

    #[test]
    fn test_storage_path_shape() {
        let id = Uuid::nil();
        let path = generate_storage_path(id);
        assert_eq!(path, "blobs/00/00/00000000000000000000000000000000.bin");
    }

    #[tokio::test]
    async fn test_filesystem_backend_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FilesystemBackend::new(dir.path());

        backend.write("blobs/aa/bb/test.bin", b"data").await.unwrap();
        assert!(backend.exists("blobs/aa/bb/test.bin").await.unwrap());
        assert_eq!(backend.read("blobs/aa/bb/test.bin").await.unwrap(), b"data");

        backend.delete("blobs/aa/bb/test.bin").await.unwrap();
        assert!(!backend.exists("blobs/aa/bb/test.bin").await.unwrap());
        // deleting again is a no-op
        backend.delete("blobs/aa/bb/test.bin").await.unwrap();
    }

    #[tokio::test]
    async fn test_filesystem_backend_validate() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FilesystemBackend::new(dir.path());
        backend.validate().await.unwrap();
    }
}
