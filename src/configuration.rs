use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, Secret};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

/// 10 MiB, the largest resume accepted by `/career`.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub email_client: EmailClientSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub allowed_origin: String,
    pub upload_dir: PathBuf,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

#[derive(serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(try_from = "String")]
pub enum StoreBackend {
    Postgres,
    InMemory,
}

impl TryFrom<String> for StoreBackend {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "postgres" => Ok(Self::Postgres),
            "in_memory" => Ok(Self::InMemory),
            other => Err(format!(
                "{} is not a supported store backend. Use either `postgres` or `in_memory`.",
                other
            )),
        }
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub backend: StoreBackend,
    pub username: String,
    pub password: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub database_name: String,
    pub require_ssl: bool,
}

impl DatabaseSettings {
    pub fn without_db(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };
        PgConnectOptions::new()
            .host(&self.host)
            .username(&self.username)
            .password(self.password.expose_secret())
            .port(self.port)
            .ssl_mode(ssl_mode)
    }

    pub fn with_db(&self) -> PgConnectOptions {
        self.without_db().database(&self.database_name)
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct EmailClientSettings {
    pub base_url: String,
    pub sender_email: String,
    /// Receives the owner notifications; falls back to `sender_email`.
    pub owner_email: Option<String>,
    pub authorization_token: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl EmailClientSettings {
    pub fn owner(&self) -> String {
        self.owner_email
            .clone()
            .unwrap_or_else(|| self.sender_email.clone())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
}

impl Settings {
    /// Rejects settings that deserialize fine but cannot serve a request.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let required = [
            ("application.allowed_origin", self.application.allowed_origin.as_str()),
            ("email_client.base_url", self.email_client.base_url.as_str()),
            ("email_client.sender_email", self.email_client.sender_email.as_str()),
            (
                "email_client.authorization_token",
                self.email_client.authorization_token.expose_secret().as_str(),
            ),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(config::ConfigError::Message(format!(
                    "`{}` must be set",
                    key
                )));
            }
        }
        if let Err(e) = reqwest::Url::parse(&self.application.allowed_origin) {
            return Err(config::ConfigError::Message(format!(
                "`application.allowed_origin` is not a valid origin: {}",
                e
            )));
        }
        match reqwest::Url::parse(&self.email_client.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(config::ConfigError::Message(format!(
                    "`email_client.base_url` must use http or https, not {}",
                    url.scheme()
                )))
            }
            Err(e) => {
                return Err(config::ConfigError::Message(format!(
                    "`email_client.base_url` is not a valid URL: {}",
                    e
                )))
            }
        }
        if self.application.max_upload_bytes == 0 {
            return Err(config::ConfigError::Message(
                "`application.max_upload_bytes` must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let mut settings = config::Config::default();
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("Failed to read current directory: {}", e)))?;
    let configuration_directory = base_path.join("configuration");

    // Read the defaults shared by every environment
    settings.merge(config::File::from(configuration_directory.join("base")).required(true))?;

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;

    // Layer the environment specific file on top
    settings.merge(
        config::File::from(configuration_directory.join(environment.as_str())).required(true),
    )?;

    // e.g. `APP_EMAIL_CLIENT__AUTHORIZATION_TOKEN=...` sets `email_client.authorization_token`
    settings.merge(config::Environment::with_prefix("app").separator("__"))?;

    let settings: Settings = settings.try_into()?;
    settings.validate()?;
    Ok(settings)
}

#[derive(Debug)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}
