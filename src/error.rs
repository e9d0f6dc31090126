//! Local marshalling errors
//!
//! SDK and IO failures travel as `anyhow::Error` with a static context line.
//! The variants here cover the cases where a request cannot even be built.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn caller input into an object key or local path
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("object key '{0}' has no file name component")]
    NoFileName(String),

    #[error("local file {0:?} has no file name")]
    NoLocalFileName(PathBuf),

    #[error("local file name {0:?} is not valid UTF-8")]
    NonUtf8FileName(PathBuf),
}

/// Failure to resolve a named profile from the shared AWS files
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error(
        "profile '{name}' not found in shared config or credentials file (available: {})",
        .available.join(", ")
    )]
    NotFound { name: String, available: Vec<String> },
}
