//! Persisted session defaults
//!
//! Stored in the platform-specific config folder:
//! - Linux: ~/.config/easy-aws/settings.json
//! - Windows: %APPDATA%/easy-aws/config/settings.json
//! - macOS: ~/Library/Application Support/easy-aws/settings.json

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default presigned URL lifetime in seconds
pub const DEFAULT_PRESIGN_EXPIRY_SECS: u64 = 3600;

/// Defaults used when building a session from settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Named profile; environment credentials are used when unset
    #[serde(default)]
    pub profile: Option<String>,

    /// Region override
    #[serde(default)]
    pub region: Option<String>,

    /// Custom endpoint for S3/SES-compatible services
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Use path-style bucket addressing (needed by MinIO)
    #[serde(default)]
    pub force_path_style: bool,

    #[serde(default = "default_presign_expiry")]
    pub presign_expiry_secs: u64,
}

fn default_presign_expiry() -> u64 {
    DEFAULT_PRESIGN_EXPIRY_SECS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            profile: None,
            region: None,
            endpoint_url: None,
            force_path_style: false,
            presign_expiry_secs: DEFAULT_PRESIGN_EXPIRY_SECS,
        }
    }
}

impl Settings {
    /// Load settings from the default location, returning defaults if the file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::settings_path()?)
    }

    /// Load settings from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("Settings file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;

        let settings: Settings = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings from {:?}", path))?;

        tracing::info!(
            "Loaded settings: profile={:?}, region={:?}, endpoint={:?}",
            settings.profile,
            settings.region,
            settings.endpoint_url
        );

        Ok(settings)
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::settings_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save settings to an explicit path, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create settings directory {:?}", parent))?;
        }

        let contents = serde_json::to_string_pretty(self)
            .context("Failed to serialize settings")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write settings to {:?}", path))?;

        tracing::debug!("Saved settings to {:?}", path);

        Ok(())
    }

    /// Get the path to the settings file
    pub fn settings_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "easy-aws", "easy-aws")
            .context("Failed to determine settings directory")?;

        Ok(proj_dirs.config_dir().join("settings.json"))
    }

    /// Overlay the values that are set in `other`
    pub fn merge(&mut self, other: SettingsOverride) {
        if let Some(profile) = other.profile {
            self.profile = Some(profile);
        }
        if let Some(region) = other.region {
            self.region = Some(region);
        }
        if let Some(endpoint_url) = other.endpoint_url {
            self.endpoint_url = Some(endpoint_url);
        }
        if let Some(force_path_style) = other.force_path_style {
            self.force_path_style = force_path_style;
        }
        if let Some(secs) = other.presign_expiry_secs {
            self.presign_expiry_secs = secs;
        }
    }
}

/// Per-invocation overrides, typically from command-line flags
#[derive(Debug, Clone, Default)]
pub struct SettingsOverride {
    pub profile: Option<String>,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub force_path_style: Option<bool>,
    pub presign_expiry_secs: Option<u64>,
}
