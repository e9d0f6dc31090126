//! AWS SES client wrapper

use anyhow::{Context, Result};
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use aws_sdk_sesv2::Client;

use crate::ses::message::Mail;
use crate::session::Session;

/// SES client wrapper for sending mail
#[derive(Debug, Clone)]
pub struct SesClient {
    client: Client,
}

impl SesClient {
    /// Create a client bound to the given session
    pub fn new(session: &Session) -> Self {
        Self {
            client: session.ses_client(),
        }
    }

    /// Send `mail` with an HTML and a plain-text part, returning the SES message id.
    ///
    /// Reply-to and the bounce/complaint feedback address are both the sender.
    pub async fn send_mail(&self, mail: &Mail) -> Result<String> {
        let destination = build_destination(mail);

        let body = Body::builder()
            .html(content(&mail.html).context("Failed to build HTML content")?)
            .text(content(&mail.text_body()).context("Failed to build text content")?)
            .build();

        let message = Message::builder()
            .subject(content(&mail.subject).context("Failed to build subject")?)
            .body(body)
            .build();

        tracing::debug!(
            "Sending mail from {} to {} recipient(s)",
            mail.from,
            mail.to.len() + mail.cc.len() + mail.bcc.len()
        );

        let response = self
            .client
            .send_email()
            .from_email_address(&mail.from)
            .destination(destination)
            .content(EmailContent::builder().simple(message).build())
            .reply_to_addresses(&mail.from)
            .feedback_forwarding_email_address(&mail.from)
            .send()
            .await
            .context("SES SendEmail failed")?;

        let message_id = response
            .message_id()
            .context("SES SendEmail returned no message id")?
            .to_string();

        tracing::info!("Mail sent, message_id={}", message_id);
        Ok(message_id)
    }
}

fn content(data: &str) -> std::result::Result<Content, aws_sdk_sesv2::error::BuildError> {
    Content::builder().data(data).charset("UTF-8").build()
}

fn build_destination(mail: &Mail) -> Destination {
    let non_empty = |list: &Vec<String>| (!list.is_empty()).then(|| list.clone());

    Destination::builder()
        .set_to_addresses(non_empty(&mail.to))
        .set_cc_addresses(non_empty(&mail.cc))
        .set_bcc_addresses(non_empty(&mail.bcc))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_sesv2::config::{BehaviorVersion, Credentials, Region};
    use aws_smithy_runtime::client::http::test_util::{capture_request, CaptureRequestReceiver};

    /// Client whose transport records the request and answers with an empty 200
    fn capturing_client() -> (SesClient, CaptureRequestReceiver) {
        let (http_client, request) = capture_request(None);
        let config = aws_sdk_sesv2::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("AKIDEXAMPLE", "secret", None, None, "test"))
            .http_client(http_client)
            .build();
        let client = SesClient {
            client: Client::from_conf(config),
        };
        (client, request)
    }

    #[tokio::test]
    async fn test_send_mail_request_and_missing_message_id() {
        let (client, request) = capturing_client();
        let mail = Mail::new("sender@example.com", "Welcome", "<h1>Hi</h1><p>a &amp; b</p>")
            .to(["to@example.com"])
            .bcc(["audit@example.com"]);

        let err = client.send_mail(&mail).await.unwrap_err();
        assert_eq!(err.to_string(), "SES SendEmail returned no message id");

        let sent = request.expect_request();
        let body: serde_json::Value =
            serde_json::from_slice(sent.body().bytes().expect("in-memory body")).unwrap();

        assert_eq!(body["FromEmailAddress"], "sender@example.com");
        assert_eq!(body["ReplyToAddresses"], serde_json::json!(["sender@example.com"]));
        assert_eq!(body["FeedbackForwardingEmailAddress"], "sender@example.com");
        assert_eq!(body["Destination"]["ToAddresses"], serde_json::json!(["to@example.com"]));
        assert_eq!(body["Destination"]["BccAddresses"], serde_json::json!(["audit@example.com"]));
        assert!(body["Destination"].get("CcAddresses").is_none());

        let simple = &body["Content"]["Simple"];
        assert_eq!(simple["Subject"]["Data"], "Welcome");
        assert_eq!(simple["Body"]["Html"]["Data"], "<h1>Hi</h1><p>a &amp; b</p>");
        assert_eq!(simple["Body"]["Text"]["Data"], "Hi a & b");
        assert_eq!(simple["Body"]["Text"]["Charset"], "UTF-8");
    }

    #[tokio::test]
    async fn test_send_mail_uses_explicit_text_part() {
        let (client, request) = capturing_client();
        let mail = Mail::new("sender@example.com", "s", "<p>html</p>")
            .to(["to@example.com"])
            .with_text("plain version");

        assert!(client.send_mail(&mail).await.is_err());

        let sent = request.expect_request();
        let body: serde_json::Value =
            serde_json::from_slice(sent.body().bytes().expect("in-memory body")).unwrap();
        assert_eq!(body["Content"]["Simple"]["Body"]["Text"]["Data"], "plain version");
    }

    #[test]
    fn test_destination_omits_empty_lists() {
        let mail = Mail::new("me@example.com", "s", "b").to(["you@example.com"]);
        let destination = build_destination(&mail);

        assert_eq!(destination.to_addresses(), ["you@example.com".to_string()]);
        assert!(destination.cc_addresses.is_none());
        assert!(destination.bcc_addresses.is_none());
    }

    #[test]
    fn test_destination_all_lists() {
        let mail = Mail::new("me@example.com", "s", "b")
            .to(["a@example.com"])
            .cc(["b@example.com"])
            .bcc(["c@example.com", "d@example.com"]);
        let destination = build_destination(&mail);

        assert_eq!(destination.cc_addresses(), ["b@example.com".to_string()]);
        assert_eq!(destination.bcc_addresses().len(), 2);
    }

    #[test]
    fn test_content_sets_charset() {
        let c = content("hello").unwrap();
        assert_eq!(c.data(), "hello");
        assert_eq!(c.charset(), Some("UTF-8"));
    }
}
