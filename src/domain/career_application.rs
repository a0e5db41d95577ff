use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{required, MissingField};

/// Text parts of a `POST /career` form. `resume` holds the generated name of
/// the file already written to the upload directory.
#[derive(Debug, Default, Clone)]
pub struct CareerSubmission {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub position: Option<String>,
    pub message: Option<String>,
    pub resume: Option<String>,
}

#[derive(serde::Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CareerApplication {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub position: String,
    pub message: Option<String>,
    pub resume: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<CareerSubmission> for CareerApplication {
    type Error = MissingField;

    fn try_from(submission: CareerSubmission) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: required("name", submission.name)?,
            phone: required("phone", submission.phone)?,
            email: required("email", submission.email)?,
            position: required("position", submission.position)?,
            message: submission.message,
            resume: required("resume", submission.resume)?,
            created_at: Utc::now(),
        })
    }
}
