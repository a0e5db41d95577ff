use std::path::PathBuf;
use std::sync::Arc;

use hr_backend::configuration::get_configuration;
use hr_backend::startup::Application;
use hr_backend::store::InMemoryStore;
use hr_backend::telemetry::{get_subscriber, init_subscriber};
use once_cell::sync::Lazy;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const OWNER_EMAIL: &str = "owner@naoh.example";
pub const ALLOWED_ORIGIN: &str = "https://hr-project-front-end.vercel.app";

// Ensure that the `tracing` stack is only initialised once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

pub struct TestApp {
    pub address: String,
    pub store: Arc<InMemoryStore>,
    pub email_server: MockServer,
    pub upload_dir: TempDir,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub async fn post_contact(&self, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/contact", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_career(&self, form: reqwest::multipart::Form) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/career", &self.address))
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Every JSON body the mail relay received, in arrival order.
    pub async fn sent_emails(&self) -> Vec<serde_json::Value> {
        self.email_server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .map(|request| serde_json::from_slice(&request.body).unwrap())
            .collect()
    }

    pub fn stored_resumes(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.upload_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }

    pub async fn mount_email_relay(&self, expected_requests: u64) {
        Mock::given(path("/email"))
            .and(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(expected_requests)
            .mount(&self.email_server)
            .await;
    }
}

pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    let email_server = MockServer::start().await;
    let upload_dir = tempfile::tempdir().expect("Failed to create an upload directory");

    // Randomise configuration to ensure test isolation
    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration.");
        // Use a random OS port
        c.application.port = 0;
        c.application.upload_dir = upload_dir.path().to_path_buf();
        c.email_client.base_url = email_server.uri();
        c.email_client.owner_email = Some(OWNER_EMAIL.into());
        c
    };

    let store = Arc::new(InMemoryStore::default());
    let application = Application::build(configuration, store.clone())
        .await
        .expect("Failed to build application.");
    let address = format!("http://127.0.0.1:{}", application.port());
    let _ = tokio::spawn(application.run_until_stopped());

    TestApp {
        address,
        store,
        email_server,
        upload_dir,
        api_client: reqwest::Client::new(),
    }
}

pub fn contact_body() -> serde_json::Value {
    serde_json::json!({
        "name": "Ursula Le Guin",
        "email": "ursula_le_guin@gmail.com",
        "mobile": "+1 555 0100",
        "service": "Recruitment",
        "message": "Please call me back."
    })
}

pub fn resume_part(bytes: Vec<u8>, file_name: &str, mime: &str) -> reqwest::multipart::Part {
    reqwest::multipart::Part::bytes(bytes)
        .file_name(file_name.to_string())
        .mime_str(mime)
        .unwrap()
}

/// A complete career form, without the resume.
pub fn career_fields() -> reqwest::multipart::Form {
    reqwest::multipart::Form::new()
        .text("name", "Grace Hopper")
        .text("phone", "+1 555 0199")
        .text("email", "grace@example.com")
        .text("position", "Data Analyst")
        .text("message", "Available immediately.")
}
