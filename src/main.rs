//! easy-aws command line
//!
//! Exposes the S3 and SES wrappers as subcommands. Session defaults come from
//! the persisted settings and can be overridden per invocation.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use easy_aws::s3::{S3Client, S3Url};
use easy_aws::ses::{Mail, SesClient};
use easy_aws::settings::{Settings, SettingsOverride};
use easy_aws::Session;

/// Convenience wrappers over AWS S3 and SES
#[derive(Parser)]
#[command(name = "easy-aws")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    session: SessionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SessionArgs {
    /// Shared-config profile (environment credentials when unset)
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Region override
    #[arg(long, global = true)]
    region: Option<String>,

    /// Custom endpoint, e.g. http://localhost:9000 for MinIO
    #[arg(long, global = true)]
    endpoint_url: Option<String>,

    /// Use path-style bucket addressing (`--path-style=false` turns a saved default off)
    #[arg(
        long,
        global = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    path_style: Option<bool>,
}

impl SessionArgs {
    fn to_override(&self) -> SettingsOverride {
        SettingsOverride {
            profile: self.profile.clone(),
            region: self.region.clone(),
            endpoint_url: self.endpoint_url.clone(),
            force_path_style: self.path_style,
            presign_expiry_secs: None,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List keys under s3://bucket/prefix
    Ls { url: S3Url },

    /// Download objects into a local directory
    Get {
        bucket: String,
        keys: Vec<String>,

        /// Target directory (created if missing)
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Print an object to stdout
    Cat { url: S3Url },

    /// Upload local files under s3://bucket/prefix
    Put {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Destination bucket and key prefix
        #[arg(short, long)]
        dest: S3Url,
    },

    /// Delete keys from a bucket
    Rm { bucket: String, keys: Vec<String> },

    /// Print a presigned PUT URL
    Presign {
        url: S3Url,

        /// Lifetime in seconds (defaults to the configured value)
        #[arg(short, long)]
        expires: Option<u64>,
    },

    /// Send an HTML email via SES
    SendMail {
        #[arg(long)]
        from: String,

        #[arg(long)]
        to: Vec<String>,

        #[arg(long)]
        cc: Vec<String>,

        #[arg(long)]
        bcc: Vec<String>,

        #[arg(long)]
        subject: String,

        /// File holding the HTML body
        #[arg(long)]
        html: PathBuf,

        /// File holding the plain-text body (rendered from HTML when omitted)
        #[arg(long)]
        text: Option<PathBuf>,
    },

    /// Persist the session flags (and presign default) as settings
    Configure {
        /// Default presigned URL lifetime in seconds
        #[arg(long)]
        presign_expiry: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so `cat` output stays clean
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::load()?;
    settings.merge(cli.session.to_override());

    if let Commands::Configure { presign_expiry } = cli.command {
        settings.presign_expiry_secs = presign_expiry.unwrap_or(settings.presign_expiry_secs);
        let path = settings.save()?;
        println!("Saved settings to {}", path.display());
        return Ok(());
    }

    let session = Session::from_settings(&settings).await?;

    match cli.command {
        Commands::Ls { url } => {
            let s3 = S3Client::new(&session);
            for key in s3.list_keys(&url.bucket, &url.key).await? {
                println!("{key}");
            }
        }
        Commands::Get { bucket, keys, dir } => {
            S3Client::new(&session)
                .download_files(&dir, &bucket, &keys)
                .await?;
        }
        Commands::Cat { url } => {
            let objects = S3Client::new(&session)
                .download_bytes(&url.bucket, &[url.key.as_str()])
                .await?;
            let mut stdout = std::io::stdout().lock();
            for data in objects.values() {
                stdout.write_all(data).context("Failed to write to stdout")?;
            }
        }
        Commands::Put { files, dest } => {
            S3Client::new(&session)
                .upload_files(&files, &dest.bucket, &dest.key)
                .await?;
        }
        Commands::Rm { bucket, keys } => {
            S3Client::new(&session).delete_keys(&bucket, &keys).await?;
        }
        Commands::Presign { url, expires } => {
            let secs = expires.unwrap_or(settings.presign_expiry_secs);
            let presigned = S3Client::new(&session)
                .presign_put_url(&url.bucket, &url.key, secs)
                .await?;
            println!("{presigned}");
        }
        Commands::SendMail {
            from,
            to,
            cc,
            bcc,
            subject,
            html: html_path,
            text: text_path,
        } => {
            let html = tokio::fs::read_to_string(&html_path)
                .await
                .with_context(|| format!("Failed to read HTML body from {:?}", html_path))?;
            let mut mail = Mail::new(from, subject, html).to(to).cc(cc).bcc(bcc);
            if let Some(path) = text_path {
                let text = tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read text body from {:?}", path))?;
                mail = mail.with_text(text);
            }

            let message_id = SesClient::new(&session).send_mail(&mail).await?;
            println!("{message_id}");
        }
        // handled before the session is built
        Commands::Configure { .. } => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_style_override(args: &[&str]) -> Option<bool> {
        let cli = Cli::try_parse_from(args).unwrap();
        cli.session.to_override().force_path_style
    }

    #[test]
    fn test_path_style_flag() {
        assert_eq!(path_style_override(&["easy-aws", "ls", "s3://b"]), None);
        assert_eq!(
            path_style_override(&["easy-aws", "--path-style", "ls", "s3://b"]),
            Some(true)
        );
        assert_eq!(
            path_style_override(&["easy-aws", "ls", "s3://b", "--path-style=false"]),
            Some(false)
        );
    }

    #[test]
    fn test_path_style_false_clears_saved_default() {
        let mut settings = Settings {
            force_path_style: true,
            ..Default::default()
        };
        let cli = Cli::try_parse_from(["easy-aws", "--path-style=false", "ls", "s3://b"]).unwrap();
        settings.merge(cli.session.to_override());
        assert!(!settings.force_path_style);
    }
}
