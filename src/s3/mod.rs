//! S3 object-store module
//!
//! - [`client::S3Client`] - transfer, delete, list and presign operations
//! - [`keys`] - key and local path marshalling
//! - [`types::S3Url`] - `s3://bucket/key` addressing

pub mod client;
pub mod keys;
pub mod types;

pub use client::S3Client;
pub use types::S3Url;
