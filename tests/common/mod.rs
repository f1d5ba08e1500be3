//! Shared fakes for the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use gigigo_relay::{
    RelayError,
    create_router,
    models::{
        notification::PushMessage,
        user::{UserRecord, UserRole, UserStatus},
    },
    services::{
        firestore_service::{FieldFilter, UserDirectory},
        messaging_service::{BatchResponse, NotificationService, SendError},
    },
    state::{AppConfig, AppState, ServiceAccount},
};

// ============================================================
// Document store
// ============================================================

/// Applies equality filters the way Firestore does: exact, case-sensitive.
#[derive(Default)]
pub struct InMemoryDirectory {
    users: Vec<UserRecord>,
    failure: Option<String>,
    calls: AtomicUsize,
}

impl InMemoryDirectory {
    pub fn new(users: Vec<UserRecord>) -> Self {
        Self { users, ..Default::default() }
    }

    pub fn failing(message: &str) -> Self {
        Self { failure: Some(message.to_string()), ..Default::default() }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn matches(record: &UserRecord, filter: &FieldFilter) -> bool {
        match filter.field.as_str() {
            "rol" => record.role.as_stored() == filter.value,
            "estado" => record.status.as_ref().map(UserStatus::as_stored) == Some(filter.value.as_str()),
            _ => false,
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn query_users(&self, filters: &[FieldFilter]) -> Result<Vec<UserRecord>, RelayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.failure {
            return Err(RelayError::FirestoreQuery(message.clone()));
        }

        Ok(self
            .users
            .iter()
            .filter(|record| filters.iter().all(|f| Self::matches(record, f)))
            .cloned()
            .collect())
    }
}

pub fn user(id: &str, role: &str, status: Option<&str>, token: Option<&str>) -> UserRecord {
    UserRecord {
        id: id.to_string(),
        name: Some(format!("User {}", id)),
        role: UserRole::from_stored(role),
        status: status.map(UserStatus::from_stored),
        fcm_token: token.map(str::to_string),
    }
}

// ============================================================
// Messaging
// ============================================================

/// Records every attempt; tokens in `failing` are rejected as unregistered.
/// With `batch_failure` set, multicast fails before any send.
#[derive(Default)]
pub struct RecordingSender {
    failing: HashSet<String>,
    batch_failure: Option<String>,
    attempts: Mutex<Vec<(String, PushMessage)>>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(tokens: &[&str]) -> Self {
        Self {
            failing: tokens.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn unauthorized(message: &str) -> Self {
        Self {
            batch_failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn attempts(&self) -> Vec<(String, PushMessage)> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn attempted_tokens(&self) -> Vec<String> {
        self.attempts().into_iter().map(|(token, _)| token).collect()
    }
}

#[async_trait]
impl NotificationService for RecordingSender {
    async fn send_to_device(&self, device_token: &str, message: &PushMessage) -> Result<String, SendError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            attempts.push((device_token.to_string(), message.clone()));
            attempts.len()
        };

        if self.failing.contains(device_token) {
            return Err(SendError::new(
                "messaging/registration-token-not-registered",
                "Requested entity was not found.",
            ));
        }

        Ok(format!("projects/test/messages/{}", attempt))
    }

    async fn send_multicast(&self, device_tokens: &[String], message: &PushMessage) -> Result<BatchResponse, RelayError> {
        if let Some(reason) = &self.batch_failure {
            return Err(RelayError::FirebaseAuth(reason.clone()));
        }

        let mut batch = BatchResponse::default();
        for token in device_tokens {
            batch.push(self.send_to_device(token, message).await);
        }
        Ok(batch)
    }
}

// ============================================================
// App
// ============================================================

pub fn test_config() -> AppConfig {
    AppConfig {
        port: 0,
        environment: "test".to_string(),
        users_collection: "Users".to_string(),
        http_timeout_secs: 5,
        fcm_dry_run: false,
        service_account: ServiceAccount {
            project_id: "gigigo-test".to_string(),
            private_key: "unused".to_string(),
            client_email: "relay@gigigo-test.iam.gserviceaccount.com".to_string(),
            token_uri: ServiceAccount::DEFAULT_TOKEN_URI.to_string(),
            private_key_id: None,
        },
    }
}

pub fn build_app(directory: Arc<InMemoryDirectory>, sender: Arc<RecordingSender>) -> Router {
    create_router(Arc::new(AppState::with_services(test_config(), directory, sender)))
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}
