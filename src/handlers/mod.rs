// src/handlers/mod.rs
pub mod notification_handler;
pub mod order_handler;
pub mod status_handler;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/status", get(status_handler::get_status))
        .route("/notify-new-order", post(order_handler::notify_new_order))
        .route("/send-notification", post(notification_handler::send_notification))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
