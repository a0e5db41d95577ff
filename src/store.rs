//! Append-only persistence for the two submission kinds.
mod in_memory;
mod postgres;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;

use crate::domain::{CareerApplication, ContactInquiry};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Failed to insert a record into `{collection}`")]
    Insert {
        collection: &'static str,
        #[source]
        source: sqlx::Error,
    },
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// One collection per record kind, each write a single insert.
///
/// Nothing here reads records back; there are no cross-collection transactions.
#[async_trait::async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn insert_contact_inquiry(&self, inquiry: &ContactInquiry) -> Result<(), StoreError>;

    async fn insert_career_application(
        &self,
        application: &CareerApplication,
    ) -> Result<(), StoreError>;

    /// Release the underlying connections. Called once the server has stopped.
    async fn close(&self) {}
}
