//! AWS S3 client wrapper
//!
//! Every operation maps onto a single S3 API call per key and runs over its
//! inputs strictly in order, stopping at the first failure.

use anyhow::{Context, Result};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use aws_sdk_s3::Client;
use bytes::Bytes;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use crate::s3::keys::{download_target, join_key, retain_listed_keys, upload_key};
use crate::session::Session;

/// S3 client wrapper with high-level operations
#[derive(Debug, Clone)]
pub struct S3Client {
    client: Client,
}

impl S3Client {
    /// Create a client bound to the given session
    pub fn new(session: &Session) -> Self {
        Self {
            client: session.s3_client(),
        }
    }

    /// Download each key into `local_dir`, named after the key's last path component.
    ///
    /// `local_dir` is created if it does not exist. Objects whose keys share a
    /// file name overwrite each other.
    pub async fn download_files<K: AsRef<str>>(
        &self,
        local_dir: &Path,
        bucket: &str,
        keys: &[K],
    ) -> Result<()> {
        if !local_dir.exists() {
            tokio::fs::create_dir_all(local_dir)
                .await
                .context("Failed to create download directory")?;
        }

        for key in keys {
            let key = key.as_ref();
            let target = download_target(local_dir, key)?;
            tracing::debug!("Downloading s3://{}/{} to {:?}", bucket, key, target);

            let response = self
                .client
                .get_object()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .context("S3 GetObject failed")?;

            let mut file = tokio::fs::File::create(&target)
                .await
                .context("Failed to create local file")?;
            let mut body = response.body;
            while let Some(chunk) = body
                .try_next()
                .await
                .context("Failed to read S3 object body")?
            {
                file.write_all(&chunk)
                    .await
                    .context("Failed to write local file")?;
            }
            file.flush().await.context("Failed to write local file")?;
        }

        tracing::info!("Downloaded {} object(s) from {}", keys.len(), bucket);
        Ok(())
    }

    /// Download each key into memory, returning a map from key to contents
    pub async fn download_bytes<K: AsRef<str>>(
        &self,
        bucket: &str,
        keys: &[K],
    ) -> Result<HashMap<String, Bytes>> {
        let mut objects = HashMap::with_capacity(keys.len());

        for key in keys {
            let key = key.as_ref();
            tracing::debug!("Fetching s3://{}/{}", bucket, key);

            let response = self
                .client
                .get_object()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .context("S3 GetObject failed")?;

            let data = response
                .body
                .collect()
                .await
                .context("Failed to read S3 object body")?;
            objects.insert(key.to_string(), data.into_bytes());
        }

        Ok(objects)
    }

    /// Upload each local file under `prefix` + its file name
    pub async fn upload_files<P: AsRef<Path>>(
        &self,
        files: &[P],
        bucket: &str,
        prefix: &str,
    ) -> Result<()> {
        for file in files {
            let file = file.as_ref();
            tokio::fs::metadata(file)
                .await
                .with_context(|| format!("Failed to stat local file {:?}", file))?;
            let key = upload_key(prefix, file)?;

            let body = ByteStream::from_path(file)
                .await
                .with_context(|| format!("Failed to open local file {:?}", file))?;

            tracing::debug!("Uploading {:?} to s3://{}/{}", file, bucket, key);
            self.client
                .put_object()
                .bucket(bucket)
                .key(&key)
                .body(body)
                .send()
                .await
                .context("S3 PutObject failed")?;
        }

        tracing::info!("Uploaded {} file(s) to {}", files.len(), bucket);
        Ok(())
    }

    /// Upload each `(name, payload)` pair under `prefix` joined with `name`
    pub async fn upload_bytes<I, K, B>(&self, objects: I, bucket: &str, prefix: &str) -> Result<()>
    where
        I: IntoIterator<Item = (K, B)>,
        K: AsRef<str>,
        B: Into<ByteStream>,
    {
        let mut count = 0usize;
        for (name, payload) in objects {
            let key = join_key(prefix, name.as_ref());
            tracing::debug!("Uploading s3://{}/{}", bucket, key);

            self.client
                .put_object()
                .bucket(bucket)
                .key(&key)
                .body(payload.into())
                .send()
                .await
                .context("S3 PutObject failed")?;
            count += 1;
        }

        tracing::info!("Uploaded {} object(s) to {}", count, bucket);
        Ok(())
    }

    /// Delete all keys with a single quiet-mode DeleteObjects call.
    ///
    /// Per-key failures reported by the service are logged, not returned.
    pub async fn delete_keys<K: AsRef<str>>(&self, bucket: &str, keys: &[K]) -> Result<()> {
        if keys.is_empty() {
            tracing::debug!("Nothing to delete in {}", bucket);
            return Ok(());
        }

        let objects = keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key.as_ref()).build())
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to build object identifiers")?;

        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()
            .context("Failed to build delete request")?;

        let response = self
            .client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .context("S3 DeleteObjects failed")?;

        for error in response.errors() {
            tracing::warn!(
                "Failed to delete s3://{}/{}: {} {}",
                bucket,
                error.key().unwrap_or_default(),
                error.code().unwrap_or_default(),
                error.message().unwrap_or_default()
            );
        }

        tracing::info!("Deleted {} key(s) from {}", keys.len(), bucket);
        Ok(())
    }

    /// List keys under `prefix` (first page only), excluding the prefix itself
    pub async fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        let response = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .send()
            .await
            .context("S3 ListObjectsV2 failed")?;

        let listed = response.contents().iter().filter_map(|o| o.key());
        Ok(retain_listed_keys(prefix, listed))
    }

    /// Presigned URL allowing a single PUT of `key` for `expires_in_secs` seconds
    pub async fn presign_put_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in_secs: u64,
    ) -> Result<String> {
        let config = PresigningConfig::expires_in(Duration::from_secs(expires_in_secs))
            .context("Invalid presign expiry")?;

        let presigned = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .presigned(config)
            .await
            .context("S3 PutObject presign failed")?;

        tracing::debug!("Presigned PUT for s3://{}/{} ({}s)", bucket, key, expires_in_secs);
        Ok(presigned.uri().to_string())
    }

    /// Underlying SDK client
    pub fn inner(&self) -> &Client {
        &self.client
    }
}
