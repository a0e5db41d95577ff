use std::net::TcpListener;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::http::header;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use tracing_actix_web::TracingLogger;

use crate::configuration::{DatabaseSettings, Settings, StoreBackend};
use crate::email_client::EmailClient;
use crate::routes;
use crate::store::{InMemoryStore, PostgresStore, SubmissionStore};
use crate::uploads::UploadPolicy;

/// Recipient of the owner notifications.
pub struct OwnerAddress(pub String);

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(
        configuration: Settings,
        store: Arc<dyn SubmissionStore>,
    ) -> Result<Self, anyhow::Error> {
        let email_client = EmailClient::new(
            configuration.email_client.base_url.clone(),
            configuration.email_client.sender_email.clone(),
            configuration.email_client.authorization_token.clone(),
            configuration.email_client.timeout(),
        )
        .context("Failed to build the email client")?;
        let owner = OwnerAddress(configuration.email_client.owner());

        let policy = UploadPolicy {
            directory: configuration.application.upload_dir.clone(),
            max_bytes: configuration.application.max_upload_bytes,
        };
        tokio::fs::create_dir_all(&policy.directory)
            .await
            .with_context(|| {
                format!(
                    "Failed to create the upload directory {}",
                    policy.directory.display()
                )
            })?;

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)
            .with_context(|| format!("Failed to bind {}", address))?;
        let port = listener.local_addr()?.port();
        tracing::info!(%address, port, "Listening");

        let server = run(
            listener,
            store,
            email_client,
            owner,
            policy,
            configuration.application.allowed_origin,
        )?;
        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

/// Build the configured store; Postgres is migrated before it is handed out.
pub async fn build_store(
    configuration: &DatabaseSettings,
) -> Result<Arc<dyn SubmissionStore>, anyhow::Error> {
    match configuration.backend {
        StoreBackend::InMemory => Ok(Arc::new(InMemoryStore::default())),
        StoreBackend::Postgres => {
            let store = PostgresStore::connect_lazy(configuration);
            store
                .migrate()
                .await
                .context("Failed to migrate the database")?;
            Ok(Arc::new(store))
        }
    }
}

fn cors(allowed_origin: &str) -> Cors {
    Cors::default()
        .allowed_origin(allowed_origin)
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
}

pub fn run(
    listener: TcpListener,
    store: Arc<dyn SubmissionStore>,
    email_client: EmailClient,
    owner: OwnerAddress,
    policy: UploadPolicy,
    allowed_origin: String,
) -> Result<Server, std::io::Error> {
    let store = web::Data::from(store);
    let email_client = web::Data::new(email_client);
    let owner = web::Data::new(owner);
    let policy = web::Data::new(policy);
    let server = HttpServer::new(move || {
        App::new()
            .wrap(cors(&allowed_origin))
            .wrap(TracingLogger::default())
            .route("/", web::get().to(routes::home))
            .route("/health_check", web::get().to(routes::health_check))
            .service(
                web::resource("/contact")
                    .app_data(web::PayloadConfig::new(routes::MAX_CONTACT_BODY_BYTES))
                    .route(web::post().to(routes::contact)),
            )
            .route("/career", web::post().to(routes::career))
            .app_data(store.clone())
            .app_data(email_client.clone())
            .app_data(owner.clone())
            .app_data(policy.clone())
    })
    .listen(listener)?
    .run();
    Ok(server)
}
