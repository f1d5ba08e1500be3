// src/services/composer_service.rs
use std::collections::BTreeMap;

use crate::models::{
    notification::{AndroidHints, ApnsHints, NotificationPriority, PushMessage},
    order::OrderEvent,
    user::RecipientClass,
};

pub const COURIER_TITLE: &str = "🚚 Nueva Orden Disponible";
pub const ADMIN_TITLE: &str = "📋 Admin: Nueva Orden";

pub const COURIER_KIND: &str = "new_order";
pub const ADMIN_KIND: &str = "new_order_admin";

pub const COURIER_COLOR: &str = "#4CAF50";
pub const ADMIN_COLOR: &str = "#FF5722";

const CLICK_ACTION: &str = "FLUTTER_NOTIFICATION_CLICK";

/// Builds the push message announcing `order` to one class of recipient.
///
/// `active_courier_count` only appears in administrator messages; `None`
/// renders as 0.
pub fn compose(order: &OrderEvent, class: RecipientClass, active_courier_count: Option<usize>) -> PushMessage {
    let price = order.resolved_price();
    let summary = format!("Orden {} - {} - €{}", order.order_number(), order.client_name(), price);

    let mut data = order_data(order, &price);

    match class {
        RecipientClass::Courier => {
            data.insert("type".to_string(), COURIER_KIND.to_string());

            PushMessage::new(COURIER_TITLE, &summary)
                .with_data(data)
                .with_android(android_hints("orders_channel", COURIER_COLOR))
                .with_apns(apns_hints())
        }
        RecipientClass::Administrator => {
            let active = active_courier_count.unwrap_or(0);
            data.insert("type".to_string(), ADMIN_KIND.to_string());
            data.insert("repartidores_activos".to_string(), active.to_string());

            let body = format!("{} | Repartidores activos: {}", summary, active);
            PushMessage::new(ADMIN_TITLE, &body)
                .with_data(data)
                .with_android(android_hints("admin_channel", ADMIN_COLOR))
                .with_apns(apns_hints())
        }
    }
}

fn order_data(order: &OrderEvent, price: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("orden_id".to_string(), order.order_number()),
        ("cliente_nombre".to_string(), order.client_name()),
        ("precio".to_string(), price.to_string()),
        ("distancia".to_string(), order.distance()),
        ("duracion".to_string(), order.estimated_minutes()),
        ("direccion_calle".to_string(), order.street()),
        ("direccion_numero".to_string(), order.street_number()),
        ("direccion_ciudad".to_string(), order.city()),
        ("click_action".to_string(), CLICK_ACTION.to_string()),
    ])
}

fn android_hints(channel_id: &str, color: &str) -> AndroidHints {
    AndroidHints {
        channel_id: channel_id.to_string(),
        priority: NotificationPriority::High,
        sound: "notification".to_string(),
        icon: Some("ic_notification".to_string()),
        color: Some(color.to_string()),
    }
}

fn apns_hints() -> ApnsHints {
    ApnsHints {
        sound: "notification.wav".to_string(),
        badge: 1,
    }
}
