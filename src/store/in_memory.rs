use std::sync::{Mutex, MutexGuard};

use crate::domain::{CareerApplication, ContactInquiry};
use crate::store::{StoreError, SubmissionStore};

/// Process-local store for running without a database.
#[derive(Default)]
pub struct InMemoryStore {
    contact_inquiries: Mutex<Vec<ContactInquiry>>,
    career_applications: Mutex<Vec<CareerApplication>>,
}

impl InMemoryStore {
    pub fn contact_inquiries(&self) -> Vec<ContactInquiry> {
        lock(&self.contact_inquiries)
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn career_applications(&self) -> Vec<CareerApplication> {
        lock(&self.career_applications)
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

fn lock<T>(collection: &Mutex<Vec<T>>) -> Result<MutexGuard<'_, Vec<T>>, StoreError> {
    collection
        .lock()
        .map_err(|_| StoreError::Unavailable("in-memory collection lock poisoned".into()))
}

#[async_trait::async_trait]
impl SubmissionStore for InMemoryStore {
    #[tracing::instrument(
        name = "Saving new contact inquiry in memory",
        skip(self, inquiry),
        fields(inquiry_id = %inquiry.id)
    )]
    async fn insert_contact_inquiry(&self, inquiry: &ContactInquiry) -> Result<(), StoreError> {
        lock(&self.contact_inquiries)?.push(inquiry.clone());
        Ok(())
    }

    #[tracing::instrument(
        name = "Saving new career application in memory",
        skip(self, application),
        fields(application_id = %application.id)
    )]
    async fn insert_career_application(
        &self,
        application: &CareerApplication,
    ) -> Result<(), StoreError> {
        lock(&self.career_applications)?.push(application.clone());
        Ok(())
    }
}
