//! SES email module
//!
//! - [`client::SesClient`] - send a single email
//! - [`message::Mail`] - the envelope and body

pub mod client;
pub mod message;

pub use client::SesClient;
pub use message::Mail;
