use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{required, MissingField};

/// Body of `POST /contact`, exactly as the client sent it.
#[derive(serde::Deserialize, Debug, Default, Clone)]
pub struct ContactSubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub service: Option<String>,
    pub message: Option<String>,
}

#[derive(serde::Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ContactInquiry {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub service: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ContactSubmission> for ContactInquiry {
    type Error = MissingField;

    fn try_from(submission: ContactSubmission) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: required("name", submission.name)?,
            email: required("email", submission.email)?,
            mobile: required("mobile", submission.mobile)?,
            service: required("service", submission.service)?,
            message: required("message", submission.message)?,
            created_at: Utc::now(),
        })
    }
}
