// src/handlers/status_handler.rs
use axum::{Json, extract::State};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: &'static str,
    pub environment: String,
    pub timestamp: String,
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "Servidor Gígigo en línea y funcionando correctamente",
        environment: state.config.environment.clone(),
        timestamp: Utc::now().to_rfc3339(),
    })
}
