// src/state.rs
use std::sync::Arc;
use std::time::Duration;

use crate::{
    errors::RelayError as AppError,
    services::{
        auth_service::GoogleAuth,
        firestore_service::{FirestoreConfig, FirestoreUserDirectory, UserDirectory},
        messaging_service::{FcmConfig, FcmNotificationService, MockNotificationService, NotificationService},
        order_service::OrderNotificationService,
    },
};

pub struct AppState {
    pub order_service: Arc<OrderNotificationService>,
    pub notification_service: Arc<dyn NotificationService>,
    pub config: AppConfig,
}

/// Firebase service account, read field by field from the environment.
#[derive(Clone)]
pub struct ServiceAccount {
    pub project_id: String,
    pub private_key: String,
    pub client_email: String,
    pub token_uri: String,
    pub private_key_id: Option<String>,
}

impl ServiceAccount {
    pub const DEFAULT_TOKEN_URI: &'static str = "https://oauth2.googleapis.com/token";

    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            project_id: required_var("FIREBASE_PROJECT_ID")?,
            // Keys pasted into env files carry literal "\n" sequences
            private_key: required_var("FIREBASE_PRIVATE_KEY")?.replace("\\n", "\n"),
            client_email: required_var("FIREBASE_CLIENT_EMAIL")?,
            token_uri: std::env::var("FIREBASE_TOKEN_URI")
                .unwrap_or_else(|_| Self::DEFAULT_TOKEN_URI.to_string()),
            private_key_id: std::env::var("FIREBASE_PRIVATE_KEY_ID").ok(),
        })
    }
}

impl std::fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub environment: String,
    pub users_collection: String,
    pub http_timeout_secs: u64,
    /// Log messages instead of sending them through FCM.
    pub fcm_dry_run: bool,
    pub service_account: ServiceAccount,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            port: parsed_var("PORT", 3000)?,
            environment: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            users_collection: std::env::var("USERS_COLLECTION").unwrap_or_else(|_| "Users".to_string()),
            http_timeout_secs: parsed_var("HTTP_TIMEOUT_SECS", 10)?,
            fcm_dry_run: parsed_var("FCM_DRY_RUN", false)?,
            service_account: ServiceAccount::from_env()?,
        })
    }
}

fn required_var(name: &str) -> Result<String, AppError> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AppError::MissingEnvironmentVariable(name.to_string()))
}

fn parsed_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::ConfigurationError(format!("{} has an invalid value: {}", name, raw))),
        Err(_) => Ok(default),
    }
}

impl AppState {
    /// Builds the Firebase clients once for the whole process. Fails when the
    /// credentials are unusable.
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| AppError::ConfigurationError(e.to_string()))?;

        let auth = Arc::new(GoogleAuth::new(config.service_account.clone(), client.clone())?);

        let directory: Arc<dyn UserDirectory> = Arc::new(FirestoreUserDirectory::new(
            FirestoreConfig {
                collection: config.users_collection.clone(),
                ..Default::default()
            },
            client.clone(),
            auth.clone(),
        ));

        let notification_service: Arc<dyn NotificationService> = if config.fcm_dry_run {
            tracing::warn!("FCM_DRY_RUN set, notifications will only be logged");
            Arc::new(MockNotificationService)
        } else {
            Arc::new(FcmNotificationService::new(FcmConfig::default(), client, auth))
        };

        Ok(Self::with_services(config, directory, notification_service))
    }

    /// Wires the state around already-built collaborators.
    pub fn with_services(
        config: AppConfig,
        directory: Arc<dyn UserDirectory>,
        notification_service: Arc<dyn NotificationService>,
    ) -> Self {
        let order_service = Arc::new(OrderNotificationService::new(directory, notification_service.clone()));

        Self {
            order_service,
            notification_service,
            config,
        }
    }
}
