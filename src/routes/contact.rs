use actix_web::http::StatusCode;
use actix_web::{web, HttpMessage, HttpRequest, HttpResponse, ResponseError};
use anyhow::Context;

use crate::domain::{ContactInquiry, ContactSubmission};
use crate::email_client::EmailClient;
use crate::notifications;
use crate::routes::{error_chain_fmt, SubmissionResponse};
use crate::startup::OwnerAddress;
use crate::store::SubmissionStore;

#[derive(thiserror::Error)]
pub enum ContactError {
    #[error("Malformed JSON body")]
    MalformedBody(#[source] serde_json::Error),
    #[error("Failed to add to contact list")]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for ContactError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for ContactError {
    fn status_code(&self) -> StatusCode {
        match self {
            ContactError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ContactError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(SubmissionResponse::failed(self.to_string()))
    }
}

/// Largest JSON body `/contact` reads.
pub const MAX_CONTACT_BODY_BYTES: usize = 100 * 1024;

/// Only `application/json` bodies are parsed. Anything else carries no fields,
/// so it fails later as a missing-field error instead of a 400.
fn parse_submission(
    request: &HttpRequest,
    body: &[u8],
) -> Result<ContactSubmission, ContactError> {
    let content_type = request.content_type();
    if !content_type.eq_ignore_ascii_case("application/json") || body.is_empty() {
        tracing::debug!(content_type, "Contact body carries no JSON fields");
        return Ok(ContactSubmission::default());
    }
    serde_json::from_slice(body).map_err(ContactError::MalformedBody)
}

#[tracing::instrument(
    name = "Adding a new contact inquiry",
    skip(request, body, store, email_client, owner),
    fields(inquiry_id = tracing::field::Empty)
)]
pub async fn contact(
    request: HttpRequest,
    body: web::Bytes,
    store: web::Data<dyn SubmissionStore>,
    email_client: web::Data<EmailClient>,
    owner: web::Data<OwnerAddress>,
) -> Result<HttpResponse, ContactError> {
    let submission = parse_submission(&request, &body)?;
    let inquiry =
        ContactInquiry::try_from(submission).context("Failed to build a contact inquiry record")?;
    tracing::Span::current().record("inquiry_id", &tracing::field::display(&inquiry.id));

    store
        .insert_contact_inquiry(&inquiry)
        .await
        .context("Failed to store the contact inquiry")?;

    email_client
        .send_email(
            &inquiry.email,
            &notifications::contact_thank_you(&inquiry),
            &[],
        )
        .await
        .context("Failed to send the thank-you email to the submitter")?;
    email_client
        .send_email(
            &owner.0,
            &notifications::contact_owner_notification(&inquiry),
            &[],
        )
        .await
        .context("Failed to send the contact notification to the owner")?;

    Ok(HttpResponse::Ok().json(SubmissionResponse::succeeded("Added to contact list")))
}
