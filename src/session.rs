//! Authenticated session construction
//!
//! A [`Session`] holds the resolved SDK configuration and is handed to
//! [`crate::s3::S3Client`] and [`crate::ses::SesClient`]. It can be built from
//! environment variables, a named shared-config profile, static keys, or the
//! persisted [`Settings`].

use anyhow::Result;
use aws_config::environment::EnvironmentVariableCredentialsProvider;
use aws_config::{BehaviorVersion, ConfigLoader, Region, SdkConfig};
use aws_credential_types::Credentials;

use crate::profiles::ProfileSet;
use crate::settings::Settings;

const PROVIDER_NAME: &str = "easy-aws";

/// Where a session takes its credentials from
enum CredentialSource<'a> {
    Environment,
    Profile(&'a str),
    Static {
        access_key_id: &'a str,
        secret_access_key: &'a str,
    },
}

/// Authenticated handle used to sign and route S3 and SES calls
#[derive(Debug, Clone)]
pub struct Session {
    config: SdkConfig,
    endpoint_url: Option<String>,
    force_path_style: bool,
}

impl Session {
    /// Credentials from `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and
    /// optionally `AWS_SESSION_TOKEN`; region from the default chain.
    ///
    /// Missing variables surface as an error on the first call, not here.
    pub async fn from_env_vars() -> Self {
        Self::load(CredentialSource::Environment, None).await
    }

    /// Credentials and region from the named shared-config profile
    pub async fn from_profile(profile: &str) -> Result<Self> {
        ProfileSet::load()?.require(profile)?;
        Ok(Self::load(CredentialSource::Profile(profile), None).await)
    }

    /// Static access keys (no session token) in an explicit region
    pub async fn from_static_creds(
        access_key_id: &str,
        secret_access_key: &str,
        region: &str,
    ) -> Self {
        Self::load(
            CredentialSource::Static {
                access_key_id,
                secret_access_key,
            },
            Some(region),
        )
        .await
    }

    /// Profile session when `settings.profile` is set, env-var session otherwise,
    /// with the region and endpoint overrides applied.
    pub async fn from_settings(settings: &Settings) -> Result<Self> {
        let source = match settings.profile.as_deref() {
            Some(profile) => {
                ProfileSet::load()?.require(profile)?;
                CredentialSource::Profile(profile)
            }
            None => CredentialSource::Environment,
        };

        let mut session = Self::load(source, settings.region.as_deref()).await;
        if let Some(url) = &settings.endpoint_url {
            session = session.with_endpoint_url(url.clone());
        }
        Ok(session.with_force_path_style(settings.force_path_style))
    }

    async fn load(source: CredentialSource<'_>, region: Option<&str>) -> Self {
        let mut loader: ConfigLoader = aws_config::defaults(BehaviorVersion::latest());

        loader = match source {
            CredentialSource::Environment => {
                tracing::debug!("Building session from environment variables");
                loader.credentials_provider(EnvironmentVariableCredentialsProvider::new())
            }
            CredentialSource::Profile(name) => {
                tracing::debug!("Building session from profile '{}'", name);
                loader.profile_name(name)
            }
            CredentialSource::Static {
                access_key_id,
                secret_access_key,
            } => {
                tracing::debug!("Building session from static credentials");
                loader.credentials_provider(Credentials::new(
                    access_key_id,
                    secret_access_key,
                    None,
                    None,
                    PROVIDER_NAME,
                ))
            }
        };

        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }

        let config = loader.load().await;
        tracing::info!(
            "Session ready (region={})",
            config.region().map(|r| r.as_ref()).unwrap_or("<unset>")
        );

        Self {
            config,
            endpoint_url: None,
            force_path_style: false,
        }
    }

    /// Send requests to a custom endpoint (MinIO, LocalStack, ...)
    pub fn with_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    /// Address buckets as `endpoint/bucket` instead of `bucket.endpoint`
    pub fn with_force_path_style(mut self, force_path_style: bool) -> Self {
        self.force_path_style = force_path_style;
        self
    }

    /// Resolved region, if any
    pub fn region(&self) -> Option<&str> {
        self.config.region().map(|r| r.as_ref())
    }

    pub fn endpoint_url(&self) -> Option<&str> {
        self.endpoint_url.as_deref()
    }

    pub fn force_path_style(&self) -> bool {
        self.force_path_style
    }

    pub fn sdk_config(&self) -> &SdkConfig {
        &self.config
    }

    pub(crate) fn s3_client(&self) -> aws_sdk_s3::Client {
        let mut builder = aws_sdk_s3::config::Builder::from(&self.config)
            .force_path_style(self.force_path_style);
        if let Some(url) = &self.endpoint_url {
            builder = builder.endpoint_url(url);
        }
        aws_sdk_s3::Client::from_conf(builder.build())
    }

    pub(crate) fn ses_client(&self) -> aws_sdk_sesv2::Client {
        let mut builder = aws_sdk_sesv2::config::Builder::from(&self.config);
        if let Some(url) = &self.endpoint_url {
            builder = builder.endpoint_url(url);
        }
        aws_sdk_sesv2::Client::from_conf(builder.build())
    }
}
