use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use actix_multipart::{Field, Multipart, MultipartError};
use chrono::Utc;
use futures_util::TryStreamExt;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::domain::CareerSubmission;

/// Name of the single file part accepted by `/career`.
pub const RESUME_FIELD: &str = "resume";

/// Text parts are small form inputs; anything longer is refused.
pub const MAX_FIELD_BYTES: usize = 1024 * 1024;

/// Why a career form could not be turned into a stored resume.
#[derive(thiserror::Error, Debug)]
pub enum UploadError {
    #[error("No file uploaded")]
    MissingFile,
    #[error("Unsupported file type")]
    UnsupportedFileType(String),
    #[error("File too large")]
    FileTooLarge { limit: usize },
    #[error("Field value too long")]
    FieldTooLarge(String),
    #[error("Field value is not valid UTF-8")]
    InvalidEncoding(String),
    #[error("Unexpected field")]
    UnexpectedField(String),
    #[error("{0}")]
    Malformed(String),
    #[error("Failed to store the uploaded file")]
    Storage(#[source] std::io::Error),
}

impl From<MultipartError> for UploadError {
    fn from(e: MultipartError) -> Self {
        Self::Malformed(e.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub directory: PathBuf,
    pub max_bytes: usize,
}

impl UploadPolicy {
    /// Only images and PDF documents are accepted as resumes.
    pub fn accepts_content_type(&self, content_type: &str) -> bool {
        content_type.starts_with("image/") || content_type == "application/pdf"
    }
}

/// A resume written to the upload directory.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Generated name on disk, `<unix millis><original extension>`.
    pub filename: String,
    /// Name the client gave the file.
    pub original_name: String,
    pub content_type: String,
    pub path: PathBuf,
    pub size: usize,
}

#[derive(Debug)]
pub struct CareerUpload {
    /// Text parts of the form; `resume` is already set to the stored filename.
    pub submission: CareerSubmission,
    pub resume: StoredFile,
}

/// Accumulates a part while enforcing an upper bound on its size.
struct SizeLimitedBuffer {
    bytes: Vec<u8>,
    limit: usize,
}

impl SizeLimitedBuffer {
    fn new(limit: usize) -> Self {
        Self {
            bytes: Vec::new(),
            limit,
        }
    }

    fn push(&mut self, chunk: &[u8]) -> Result<(), usize> {
        if self.bytes.len() + chunk.len() > self.limit {
            return Err(self.limit);
        }
        self.bytes.extend_from_slice(chunk);
        Ok(())
    }
}

async fn read_part(field: &mut Field, limit: usize) -> Result<Result<Vec<u8>, usize>, MultipartError> {
    let mut buffer = SizeLimitedBuffer::new(limit);
    while let Some(chunk) = field.try_next().await? {
        if let Err(limit) = buffer.push(&chunk) {
            return Ok(Err(limit));
        }
    }
    Ok(Ok(buffer.bytes))
}

struct ReceivedFile {
    original_name: String,
    content_type: String,
    content: Vec<u8>,
}

/// Read every part of a career form, vet the resume and write it to disk.
///
/// The file is only written once the whole body has been read, so a rejected
/// upload leaves nothing behind.
#[tracing::instrument(name = "Receiving career form upload", skip(payload, policy))]
pub async fn receive_career_upload(
    mut payload: Multipart,
    policy: &UploadPolicy,
) -> Result<CareerUpload, UploadError> {
    let mut submission = CareerSubmission::default();
    let mut resume: Option<ReceivedFile> = None;

    while let Some(mut field) = payload.try_next().await? {
        let (name, filename) = {
            let disposition = field.content_disposition();
            (
                disposition.get_name().unwrap_or_default().to_owned(),
                disposition.get_filename().map(ToOwned::to_owned),
            )
        };

        match filename {
            Some(original_name) => {
                let content_type = field
                    .content_type()
                    .map(|mime| mime.essence_str().to_owned())
                    .unwrap_or_default();
                // Browsers send a file input left empty as a nameless part
                // with no bytes; only its content tells it apart from a file.
                let unnamed = original_name.is_empty();
                if !unnamed {
                    check_resume_part(&name, resume.is_some(), &content_type, policy)?;
                }
                let content = read_part(&mut field, policy.max_bytes)
                    .await?
                    .map_err(|limit| UploadError::FileTooLarge { limit })?;
                if unnamed {
                    if content.is_empty() {
                        tracing::debug!(field = %name, "Skipping empty file input");
                        continue;
                    }
                    check_resume_part(&name, resume.is_some(), &content_type, policy)?;
                }
                resume = Some(ReceivedFile {
                    original_name,
                    content_type,
                    content,
                });
            }
            None => {
                let value = read_part(&mut field, MAX_FIELD_BYTES)
                    .await?
                    .map_err(|_| UploadError::FieldTooLarge(name.clone()))?;
                let value = String::from_utf8(value)
                    .map_err(|_| UploadError::InvalidEncoding(name.clone()))?;
                set_text_field(&mut submission, &name, value);
            }
        }
    }

    let resume = resume.ok_or(UploadError::MissingFile)?;
    let stored = store_file(&policy.directory, resume)
        .await
        .map_err(UploadError::Storage)?;
    tracing::info!(
        filename = %stored.filename,
        size = stored.size,
        "Stored uploaded resume"
    );
    submission.resume = Some(stored.filename.clone());
    Ok(CareerUpload {
        submission,
        resume: stored,
    })
}

fn check_resume_part(
    name: &str,
    already_received: bool,
    content_type: &str,
    policy: &UploadPolicy,
) -> Result<(), UploadError> {
    if name != RESUME_FIELD || already_received {
        return Err(UploadError::UnexpectedField(name.to_owned()));
    }
    if !policy.accepts_content_type(content_type) {
        return Err(UploadError::UnsupportedFileType(content_type.to_owned()));
    }
    Ok(())
}

fn set_text_field(submission: &mut CareerSubmission, name: &str, value: String) {
    match name {
        "name" => submission.name = Some(value),
        "phone" => submission.phone = Some(value),
        "email" => submission.email = Some(value),
        "position" => submission.position = Some(value),
        "message" => submission.message = Some(value),
        other => tracing::debug!(field = other, "Ignoring unknown form field"),
    }
}

/// `<unix millis><ext>`, where `ext` keeps its leading dot and may be empty.
pub fn generated_filename(millis: i64, original_name: &str) -> String {
    let extension = Path::new(original_name)
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| format!(".{}", extension))
        .unwrap_or_default();
    format!("{}{}", millis, extension)
}

async fn store_file(directory: &Path, file: ReceivedFile) -> Result<StoredFile, std::io::Error> {
    let mut millis = Utc::now().timestamp_millis();
    loop {
        let filename = generated_filename(millis, &file.original_name);
        let path = directory.join(&filename);
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(mut handle) => {
                handle.write_all(&file.content).await?;
                handle.flush().await?;
                return Ok(StoredFile {
                    filename,
                    original_name: file.original_name,
                    content_type: file.content_type,
                    path,
                    size: file.content.len(),
                });
            }
            // Another upload landed in the same millisecond.
            Err(e) if e.kind() == ErrorKind::AlreadyExists => millis += 1,
            Err(e) => return Err(e),
        }
    }
}
