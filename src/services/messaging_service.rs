// src/services/messaging_service.rs
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;
use tracing;

use crate::{
    errors::RelayError as AppError,
    models::{notification::PushMessage, user::token_preview},
    services::auth_service::GoogleAuth,
};

/// Failure of a single send. Absorbed by the caller, never a request failure.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct SendError {
    pub code: String,
    pub message: String,
}

impl SendError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SendError>,
}

/// Per-token breakdown of a multicast send, in token order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub success_count: usize,
    pub failure_count: usize,
    pub responses: Vec<SendResponse>,
}

impl BatchResponse {
    pub fn push(&mut self, outcome: Result<String, SendError>) {
        let response = match outcome {
            Ok(message_id) => {
                self.success_count += 1;
                SendResponse { success: true, message_id: Some(message_id), error: None }
            }
            Err(error) => {
                self.failure_count += 1;
                SendResponse { success: false, message_id: None, error: Some(error) }
            }
        };
        self.responses.push(response);
    }
}

#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Sends one message to one device and returns the provider message id.
    async fn send_to_device(&self, device_token: &str, message: &PushMessage) -> Result<String, SendError>;

    /// Sends the same message to every token. Individual failures are reported
    /// in the breakdown; `Err` is reserved for failures that affect the whole
    /// batch.
    async fn send_multicast(&self, device_tokens: &[String], message: &PushMessage) -> Result<BatchResponse, AppError> {
        let mut batch = BatchResponse::default();
        for token in device_tokens {
            batch.push(self.send_to_device(token, message).await);
        }
        Ok(batch)
    }
}

#[derive(Debug, Clone)]
pub struct FcmConfig {
    pub fcm_base_url: String,
}

impl Default for FcmConfig {
    fn default() -> Self {
        Self {
            fcm_base_url: "https://fcm.googleapis.com/v1".to_string(),
        }
    }
}

/// FCM HTTP v1 client.
pub struct FcmNotificationService {
    config: FcmConfig,
    client: reqwest::Client,
    auth: Arc<GoogleAuth>,
}

impl FcmNotificationService {
    pub fn new(config: FcmConfig, client: reqwest::Client, auth: Arc<GoogleAuth>) -> Self {
        Self { config, client, auth }
    }

    fn send_url(&self) -> String {
        format!("{}/projects/{}/messages:send", self.config.fcm_base_url, self.auth.project_id())
    }
}

/// Builds the `message` object of an FCM v1 send request.
pub fn fcm_message(device_token: &str, message: &PushMessage) -> Value {
    let mut fcm_message = json!({
        "token": device_token,
        "notification": {
            "title": message.title,
            "body": message.body,
        },
        "data": message.data,
    });

    if let Some(android) = &message.android {
        let mut notification = json!({
            "channel_id": android.channel_id,
            "sound": android.sound,
        });
        if let Some(icon) = &android.icon {
            notification["icon"] = json!(icon);
        }
        if let Some(color) = &android.color {
            notification["color"] = json!(color);
        }
        fcm_message["android"] = json!({
            "priority": android.priority.as_fcm(),
            "notification": notification,
        });
    }

    if let Some(apns) = &message.apns {
        fcm_message["apns"] = json!({
            "payload": { "aps": { "sound": apns.sound, "badge": apns.badge } }
        });
    }

    fcm_message
}

/// Maps an FCM v1 error body onto a firebase-style error code.
pub fn classify_fcm_error(body: &Value) -> SendError {
    let error = &body["error"];
    let message = error["message"].as_str().unwrap_or("Unknown error").to_string();

    let fcm_code = error["details"]
        .as_array()
        .and_then(|details| details.iter().find_map(|d| d["errorCode"].as_str()))
        .or_else(|| error["status"].as_str())
        .unwrap_or("UNKNOWN");

    let code = match fcm_code {
        "UNREGISTERED" | "NOT_FOUND" => "messaging/registration-token-not-registered",
        "INVALID_ARGUMENT" => "messaging/invalid-argument",
        "SENDER_ID_MISMATCH" => "messaging/mismatched-credential",
        "QUOTA_EXCEEDED" | "RESOURCE_EXHAUSTED" => "messaging/message-rate-exceeded",
        "UNAVAILABLE" => "messaging/server-unavailable",
        "INTERNAL" => "messaging/internal-error",
        "THIRD_PARTY_AUTH_ERROR" => "messaging/third-party-auth-error",
        "PERMISSION_DENIED" | "UNAUTHENTICATED" => "messaging/authentication-error",
        _ => "messaging/unknown-error",
    };

    SendError::new(code, message)
}

#[async_trait]
impl NotificationService for FcmNotificationService {
    async fn send_to_device(&self, device_token: &str, message: &PushMessage) -> Result<String, SendError> {
        if device_token.is_empty() {
            return Err(SendError::new("messaging/invalid-argument", "Empty device token"));
        }

        tracing::debug!("Sending FCM notification to device: {}...", token_preview(device_token, 30));

        let access_token = self
            .auth
            .access_token()
            .await
            .map_err(|e| SendError::new("app/invalid-credential", e.to_string()))?;

        let response = self
            .client
            .post(self.send_url())
            .bearer_auth(access_token)
            .json(&json!({ "message": fcm_message(device_token, message) }))
            .send()
            .await
            .map_err(|e| SendError::new("messaging/network-error", e.to_string()))?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            let error = classify_fcm_error(&body);
            tracing::error!("FCM request failed ({}): {}", status, error);
            return Err(error);
        }

        let message_id = body["name"].as_str().unwrap_or_default().to_string();
        tracing::debug!("FCM notification sent successfully: {}", message_id);
        Ok(message_id)
    }

    async fn send_multicast(&self, device_tokens: &[String], message: &PushMessage) -> Result<BatchResponse, AppError> {
        // Credential failures fail the whole batch; the token stays cached for the sends below
        self.auth.access_token().await?;

        let mut batch = BatchResponse::default();
        for token in device_tokens {
            batch.push(self.send_to_device(token, message).await);
        }
        Ok(batch)
    }
}

/// Logs instead of sending. Used when `FCM_DRY_RUN` is set.
#[derive(Debug)]
pub struct MockNotificationService;

#[async_trait]
impl NotificationService for MockNotificationService {
    async fn send_to_device(&self, device_token: &str, message: &PushMessage) -> Result<String, SendError> {
        tracing::info!("[MOCK] Would send FCM to {}...: {} - {}",
            token_preview(device_token, 30), message.title, message.body);
        Ok(format!("mock/{}", uuid::Uuid::new_v4()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notification::{AndroidHints, ApnsHints, NotificationPriority};
    use std::collections::BTreeMap;

    #[test]
    fn test_fcm_message_shape() {
        let mut data = BTreeMap::new();
        data.insert("type".to_string(), "new_order".to_string());

        let message = PushMessage::new("Title", "Body")
            .with_data(data)
            .with_android(AndroidHints {
                channel_id: "orders_channel".to_string(),
                priority: NotificationPriority::High,
                sound: "notification".to_string(),
                icon: None,
                color: Some("#4CAF50".to_string()),
            })
            .with_apns(ApnsHints { sound: "notification.wav".to_string(), badge: 1 });

        let value = fcm_message("tok", &message);
        assert_eq!(value["token"], "tok");
        assert_eq!(value["notification"]["title"], "Title");
        assert_eq!(value["data"]["type"], "new_order");
        assert_eq!(value["android"]["priority"], "high");
        assert_eq!(value["android"]["notification"]["channel_id"], "orders_channel");
        assert_eq!(value["android"]["notification"]["color"], "#4CAF50");
        assert!(value["android"]["notification"].get("icon").is_none());
        assert_eq!(value["apns"]["payload"]["aps"]["badge"], 1);
    }

    #[test]
    fn test_classify_prefers_fcm_error_code() {
        let body = json!({
            "error": {
                "code": 404,
                "message": "Requested entity was not found.",
                "status": "NOT_FOUND",
                "details": [{
                    "@type": "type.googleapis.com/google.firebase.fcm.v1.FcmError",
                    "errorCode": "UNREGISTERED"
                }]
            }
        });

        let error = classify_fcm_error(&body);
        assert_eq!(error.code, "messaging/registration-token-not-registered");
        assert_eq!(error.message, "Requested entity was not found.");
    }

    #[test]
    fn test_classify_falls_back_to_status() {
        let body = json!({ "error": { "message": "quota", "status": "RESOURCE_EXHAUSTED" } });
        assert_eq!(classify_fcm_error(&body).code, "messaging/message-rate-exceeded");
        assert_eq!(classify_fcm_error(&Value::Null).code, "messaging/unknown-error");
    }

    #[test]
    fn test_batch_response_counts() {
        let mut batch = BatchResponse::default();
        batch.push(Ok("id-1".to_string()));
        batch.push(Err(SendError::new("messaging/invalid-argument", "bad")));

        assert_eq!(batch.success_count, 1);
        assert_eq!(batch.failure_count, 1);
        let json = serde_json::to_value(&batch).unwrap();
        assert_eq!(json["successCount"], 1);
        assert_eq!(json["responses"][1]["error"]["code"], "messaging/invalid-argument");
    }

    #[tokio::test]
    async fn test_default_multicast_attempts_every_token() {
        let tokens = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let batch = MockNotificationService
            .send_multicast(&tokens, &PushMessage::new("t", "b"))
            .await
            .unwrap();
        assert_eq!(batch.success_count, 3);
        assert_eq!(batch.responses.len(), 3);
    }
}
