// src/handlers/order_handler.rs
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    errors::RelayError as AppError,
    models::{order::OrderEvent, stats::NotificationStats},
    state::AppState,
};

pub const MISSING_ORDER_MESSAGE: &str = "Se requieren los datos de la orden.";
const FAILURE_CONTEXT: &str = "Error al enviar notificaciones de nueva orden";

#[derive(Debug, Deserialize)]
pub struct NotifyOrderRequest {
    #[serde(rename = "ordenData")]
    pub orden_data: Option<OrderEvent>,
}

#[derive(Debug, Serialize)]
pub struct NotifyOrderResponse {
    pub message: String,
    pub stats: NotificationStats,
}

pub async fn notify_new_order(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NotifyOrderRequest>, JsonRejection>,
) -> Result<Json<NotifyOrderResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::InvalidBody(e.body_text()))?;
    let order = request
        .orden_data
        .ok_or_else(|| AppError::bad_request(MISSING_ORDER_MESSAGE))?;

    let span = tracing::info_span!("notify_new_order", request_id = %Uuid::new_v4(), order = %order.order_number());

    let outcome = state
        .order_service
        .notify_new_order(&order)
        .instrument(span)
        .await
        .map_err(|e| {
            tracing::error!("Failed to notify order {}: {}", order.order_number(), e);
            AppError::request_failed(FAILURE_CONTEXT, e)
        })?;

    Ok(Json(NotifyOrderResponse {
        message: outcome.message.to_string(),
        stats: outcome.stats,
    }))
}
