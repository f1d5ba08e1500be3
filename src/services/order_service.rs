// src/services/order_service.rs
use futures::future::try_join;
use std::sync::Arc;
use tracing;

use crate::{
    errors::RelayError as AppError,
    models::{
        order::OrderEvent,
        stats::NotificationStats,
        user::{RecipientClass, UserRole, UserStatus},
    },
    services::{
        composer_service::compose,
        dispatch_service::FanOutDispatcher,
        firestore_service::UserDirectory,
        messaging_service::NotificationService,
        recipient_service::RecipientResolver,
        token_service::extract_tokens,
    },
};

pub const SENT_MESSAGE: &str = "Notificaciones de nueva orden enviadas";
pub const NO_RECIPIENTS_MESSAGE: &str = "No hay repartidores ni administradores con tokens FCM válidos";

#[derive(Debug, Clone)]
pub struct OrderNotification {
    pub message: &'static str,
    pub stats: NotificationStats,
}

/// Announces a new order to active couriers and to administrators.
pub struct OrderNotificationService {
    resolver: RecipientResolver,
    dispatcher: FanOutDispatcher,
}

impl OrderNotificationService {
    pub fn new(directory: Arc<dyn UserDirectory>, sender: Arc<dyn NotificationService>) -> Self {
        Self {
            resolver: RecipientResolver::new(directory),
            dispatcher: FanOutDispatcher::new(sender),
        }
    }

    pub async fn notify_new_order(&self, order: &OrderEvent) -> Result<OrderNotification, AppError> {
        let order_number = order.order_number();
        tracing::info!("Notifying new order: {}", order_number);

        let (couriers, admins) = try_join(
            self.resolver.resolve(&UserRole::Courier, Some(&UserStatus::Active)),
            self.resolver.resolve(&UserRole::Administrator, None),
        )
        .await?;

        let courier_tokens = extract_tokens(&couriers, RecipientClass::Courier);
        let admin_tokens = extract_tokens(&admins, RecipientClass::Administrator);
        let price = order.resolved_price();

        if courier_tokens.is_empty() && admin_tokens.is_empty() {
            tracing::warn!("Order {}: no recipients with valid FCM tokens", order_number);
            return Ok(OrderNotification {
                message: NO_RECIPIENTS_MESSAGE,
                stats: NotificationStats::aggregate(&[], order_number, price),
            });
        }

        let courier_message = compose(order, RecipientClass::Courier, None);
        let admin_message = compose(order, RecipientClass::Administrator, Some(couriers.len()));

        let tokens: Vec<_> = courier_tokens.into_iter().chain(admin_tokens).collect();
        tracing::info!("Sending order {} to {} devices", order_number, tokens.len());

        let results = self
            .dispatcher
            .dispatch_all(&tokens, |class| match class {
                RecipientClass::Courier => &courier_message,
                RecipientClass::Administrator => &admin_message,
            })
            .await;

        let stats = NotificationStats::aggregate(&results, order_number, price);
        tracing::info!(
            "Order {} summary: couriers {}/{} ok, admins {}/{} ok",
            stats.orden,
            stats.repartidores_exitosos,
            stats.total_repartidores,
            stats.administradores_exitosos,
            stats.total_administradores
        );

        Ok(OrderNotification {
            message: SENT_MESSAGE,
            stats,
        })
    }
}
