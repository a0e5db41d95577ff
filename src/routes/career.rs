use actix_multipart::Multipart;
use actix_web::http::StatusCode;
use actix_web::{web, HttpMessage, HttpRequest, HttpResponse, ResponseError};
use anyhow::Context;

use crate::domain::CareerApplication;
use crate::email_client::{Attachment, EmailClient};
use crate::notifications;
use crate::routes::{error_chain_fmt, SubmissionResponse};
use crate::startup::OwnerAddress;
use crate::store::SubmissionStore;
use crate::uploads::{receive_career_upload, UploadError, UploadPolicy};

#[derive(thiserror::Error)]
pub enum CareerError {
    #[error(transparent)]
    UploadError(#[from] UploadError),
    #[error("Failed to submit application")]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for CareerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for CareerError {
    fn status_code(&self) -> StatusCode {
        match self {
            CareerError::UploadError(UploadError::MissingFile) => StatusCode::BAD_REQUEST,
            CareerError::UploadError(_) | CareerError::UnexpectedError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            CareerError::UploadError(e) => SubmissionResponse::failed(e.to_string()),
            CareerError::UnexpectedError(e) => {
                SubmissionResponse::failed(self.to_string()).with_details(format!("{:#}", e))
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[tracing::instrument(
    name = "Submitting a career application",
    skip(request, payload, store, email_client, owner, policy),
    fields(application_id = tracing::field::Empty, resume = tracing::field::Empty)
)]
pub async fn career(
    request: HttpRequest,
    payload: Multipart,
    store: web::Data<dyn SubmissionStore>,
    email_client: web::Data<EmailClient>,
    owner: web::Data<OwnerAddress>,
    policy: web::Data<UploadPolicy>,
) -> Result<HttpResponse, CareerError> {
    // Anything but a multipart body cannot carry a file.
    if !request.content_type().starts_with("multipart/") {
        return Err(UploadError::MissingFile.into());
    }
    let upload = receive_career_upload(payload, &policy).await?;
    let resume = upload.resume;
    tracing::Span::current().record("resume", &tracing::field::display(&resume.filename));

    let application = CareerApplication::try_from(upload.submission)
        .context("Failed to build a career application record")?;
    tracing::Span::current().record("application_id", &tracing::field::display(&application.id));

    store
        .insert_career_application(&application)
        .await
        .context("Failed to store the career application")?;

    email_client
        .send_email(
            &application.email,
            &notifications::application_receipt(&application),
            &[],
        )
        .await
        .context("Failed to send the receipt to the applicant")?;

    let content = tokio::fs::read(&resume.path)
        .await
        .with_context(|| format!("Failed to read back {}", resume.path.display()))?;
    let attachment = Attachment {
        name: resume.original_name,
        content_type: resume.content_type,
        content,
    };
    email_client
        .send_email(
            &owner.0,
            &notifications::application_owner_notification(&application),
            &[attachment],
        )
        .await
        .context("Failed to send the application notification to the owner")?;

    Ok(HttpResponse::Ok().json(SubmissionResponse::succeeded(
        "Application submitted successfully",
    )))
}
