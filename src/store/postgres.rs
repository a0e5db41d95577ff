use std::time::Duration;

use anyhow::Context;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::configuration::DatabaseSettings;
use crate::domain::{CareerApplication, ContactInquiry};
use crate::store::{StoreError, SubmissionStore};

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connections are opened on first use, so startup does not wait on the database.
    pub fn connect_lazy(configuration: &DatabaseSettings) -> Self {
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_secs(2))
            .connect_lazy_with(configuration.with_db());
        Self { pool }
    }

    #[tracing::instrument(name = "Running database migrations", skip(self))]
    pub async fn migrate(&self) -> Result<(), anyhow::Error> {
        // Resolved like `configuration/`, relative to the working directory.
        let directory = std::env::current_dir()
            .context("Failed to determine the current directory")?
            .join("migrations");
        let migrator = Migrator::new(directory.as_path())
            .await
            .with_context(|| format!("Failed to read migrations from {}", directory.display()))?;
        migrator.run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl SubmissionStore for PostgresStore {
    #[tracing::instrument(
        name = "Saving new contact inquiry in the database",
        skip(self, inquiry),
        fields(inquiry_id = %inquiry.id)
    )]
    async fn insert_contact_inquiry(&self, inquiry: &ContactInquiry) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO contact_inquiries (id, name, email, mobile, service, message, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(inquiry.id)
        .bind(&inquiry.name)
        .bind(&inquiry.email)
        .bind(&inquiry.mobile)
        .bind(&inquiry.service)
        .bind(&inquiry.message)
        .bind(inquiry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to execute query: {:?}", e);
            StoreError::Insert {
                collection: "contact_inquiries",
                source: e,
            }
        })?;
        Ok(())
    }

    #[tracing::instrument(
        name = "Saving new career application in the database",
        skip(self, application),
        fields(application_id = %application.id)
    )]
    async fn insert_career_application(
        &self,
        application: &CareerApplication,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO career_applications
                (id, name, phone, email, position, message, resume, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(application.id)
        .bind(&application.name)
        .bind(&application.phone)
        .bind(&application.email)
        .bind(&application.position)
        .bind(&application.message)
        .bind(&application.resume)
        .bind(application.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to execute query: {:?}", e);
            StoreError::Insert {
                collection: "career_applications",
                source: e,
            }
        })?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
