// src/handlers/notification_handler.rs
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{
    errors::RelayError as AppError,
    models::notification::PushMessage,
    services::{messaging_service::BatchResponse, token_service::strip_quotes},
    state::AppState,
};

pub const MISSING_FIELDS_MESSAGE: &str = "Se requieren tokens de registro, título y cuerpo.";
const FAILURE_CONTEXT: &str = "Error al enviar la notificación";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationRequest {
    pub registration_tokens: Option<Vec<String>>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub data: Option<serde_json::Map<String, Value>>,
}

#[derive(Debug, Serialize)]
pub struct SendNotificationResponse {
    pub message: String,
    pub response: BatchResponse,
}

/// FCM data values must be strings; other JSON values are sent in their JSON
/// text form and nulls are dropped.
fn stringify_data(data: serde_json::Map<String, Value>) -> BTreeMap<String, String> {
    data.into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect()
}

pub async fn send_notification(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SendNotificationRequest>, JsonRejection>,
) -> Result<Json<SendNotificationResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::InvalidBody(e.body_text()))?;

    let (tokens, title, body) = match (request.registration_tokens, request.title, request.body) {
        (Some(tokens), Some(title), Some(body))
            if !tokens.is_empty() && !title.is_empty() && !body.is_empty() =>
        {
            (tokens, title, body)
        }
        _ => return Err(AppError::bad_request(MISSING_FIELDS_MESSAGE)),
    };

    // Quote stripping only; blank tokens are left for FCM to reject
    let tokens: Vec<String> = tokens.iter().map(|t| strip_quotes(t)).collect();
    let message = PushMessage::new(&title, &body).with_data(request.data.map(stringify_data).unwrap_or_default());

    tracing::info!("Sending \"{}\" to {} tokens", message.title, tokens.len());

    let batch = state
        .notification_service
        .send_multicast(&tokens, &message)
        .await
        .map_err(|e| {
            tracing::error!("Multicast send failed: {}", e);
            AppError::request_failed(FAILURE_CONTEXT, e)
        })?;

    tracing::info!("Multicast result: {}/{} delivered", batch.success_count, tokens.len());

    Ok(Json(SendNotificationResponse {
        message: format!("Notificaciones enviadas: {}/{}", batch.success_count, tokens.len()),
        response: batch,
    }))
}
