mod career_application;
mod contact_inquiry;

pub use career_application::{CareerApplication, CareerSubmission};
pub use contact_inquiry::{ContactInquiry, ContactSubmission};

/// A submission was turned into a record while one of its required fields was absent.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("`{0}` is required")]
pub struct MissingField(pub &'static str);

/// An empty string is as good as no value; whitespace is kept as the submitter sent it.
pub(crate) fn required(field: &'static str, value: Option<String>) -> Result<String, MissingField> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(MissingField(field)),
    }
}
