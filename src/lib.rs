//! Thin convenience layer over AWS S3 and SES
//!
//! Build a [`session::Session`] once (environment variables, a named profile,
//! or static keys) and hand it to [`s3::S3Client`] or [`ses::SesClient`].

pub mod error;
pub mod profiles;
pub mod s3;
pub mod ses;
pub mod session;
pub mod settings;

pub use session::Session;
