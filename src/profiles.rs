//! Shared AWS profile lookup
//!
//! Reads profile names from the shared config file (`~/.aws/config`) and the
//! shared credentials file (`~/.aws/credentials`). The locations can be
//! overridden with `AWS_CONFIG_FILE` and `AWS_SHARED_CREDENTIALS_FILE`, the
//! same variables the SDK honors.
//!
//! Only names are collected. Resolving the actual credentials is left to the
//! SDK's profile provider.

use anyhow::{Context, Result};
use directories::BaseDirs;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::ProfileError;

const DEFAULT_PROFILE: &str = "default";

/// Set of profile names known to the shared AWS files
#[derive(Debug, Clone)]
pub struct ProfileSet {
    names: BTreeSet<String>,
}

impl ProfileSet {
    /// Load profile names from the shared config and credentials files.
    ///
    /// Missing files are not an error; the `default` profile is always present.
    pub fn load() -> Result<Self> {
        let config = read_optional(&config_file_path())
            .context("Failed to read AWS config file")?;
        let credentials = read_optional(&credentials_file_path())
            .context("Failed to read AWS credentials file")?;

        Ok(Self::from_sources(config.as_deref(), credentials.as_deref()))
    }

    /// Build a profile set from the raw contents of the two files
    pub fn from_sources(config: Option<&str>, credentials: Option<&str>) -> Self {
        let mut names = BTreeSet::new();
        names.insert(DEFAULT_PROFILE.to_string());

        if let Some(content) = credentials {
            names.extend(section_names(content).filter_map(credentials_profile));
        }
        if let Some(content) = config {
            names.extend(section_names(content).filter_map(config_profile));
        }

        Self { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Fail unless a profile with this name exists
    pub fn require(&self, name: &str) -> std::result::Result<(), ProfileError> {
        if self.contains(name) {
            Ok(())
        } else {
            Err(ProfileError::NotFound {
                name: name.to_string(),
                available: self.names().into_iter().map(String::from).collect(),
            })
        }
    }

    /// Profile names, sorted, with `default` first
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .names
            .iter()
            .map(String::as_str)
            .filter(|n| *n != DEFAULT_PROFILE)
            .collect();
        names.insert(0, DEFAULT_PROFILE);
        names
    }
}

fn home_dir() -> PathBuf {
    BaseDirs::new()
        .map(|b| b.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn config_file_path() -> PathBuf {
    std::env::var_os("AWS_CONFIG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".aws").join("config"))
}

fn credentials_file_path() -> PathBuf {
    std::env::var_os("AWS_SHARED_CREDENTIALS_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".aws").join("credentials"))
}

fn read_optional(path: &Path) -> std::io::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Iterate the `[section]` headers of an INI-style file, skipping comments
fn section_names(content: &str) -> impl Iterator<Item = &str> {
    content.lines().filter_map(|line| {
        let line = line.trim();
        if line.starts_with('#') || line.starts_with(';') {
            return None;
        }
        line.strip_prefix('[')
            .and_then(|l| l.strip_suffix(']'))
            .map(str::trim)
    })
}

/// In the config file only `[default]` and `[profile name]` define profiles
fn config_profile(section: &str) -> Option<String> {
    if section == DEFAULT_PROFILE {
        return Some(section.to_string());
    }
    section
        .strip_prefix("profile ")
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

/// In the credentials file every section is a profile name
fn credentials_profile(section: &str) -> Option<String> {
    (!section.is_empty()).then(|| section.to_string())
}
