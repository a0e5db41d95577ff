use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, Secret};

/// A rendered message, HTML and plain text alternatives of the same content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// A file shipped along with a message.
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Name the recipient sees, not the name on disk.
    pub name: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

pub struct EmailClient {
    http_client: Client,
    base_url: String,
    sender: String,
    authorization_token: Secret<String>,
}

impl EmailClient {
    pub fn new(
        base_url: String,
        sender: String,
        authorization_token: Secret<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url,
            sender,
            authorization_token,
        })
    }

    #[tracing::instrument(
        name = "Sending email through the mail relay",
        skip(self, content, attachments),
        fields(subject = %content.subject, attachments = attachments.len())
    )]
    pub async fn send_email(
        &self,
        recipient: &str,
        content: &EmailContent,
        attachments: &[Attachment],
    ) -> Result<(), reqwest::Error> {
        let url = format!("{}/email", self.base_url);
        let attachments = attachments
            .iter()
            .map(|attachment| AttachmentBody {
                name: &attachment.name,
                content: base64::encode(&attachment.content),
                content_type: &attachment.content_type,
            })
            .collect();
        let request_body = SendEmailRequest {
            from: &self.sender,
            to: recipient,
            subject: &content.subject,
            html_body: &content.html,
            text_body: &content.text,
            attachments,
        };
        self.http_client
            .post(&url)
            .header(
                "X-Postmark-Server-Token",
                self.authorization_token.expose_secret(),
            )
            .json(&request_body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<AttachmentBody<'a>>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "PascalCase")]
struct AttachmentBody<'a> {
    name: &'a str,
    content: String,
    content_type: &'a str,
}
