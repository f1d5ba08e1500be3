// src/models/stats.rs
use serde::{Deserialize, Serialize};

use crate::models::user::RecipientClass;

/// Outcome of one send attempt. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchResult {
    pub class: RecipientClass,
    pub owner_id: String,
    pub outcome: DispatchOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Delivered { message_id: String },
    Failed { code: String, message: String },
}

impl DispatchResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, DispatchOutcome::Delivered { .. })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassTally {
    pub succeeded: usize,
    pub failed: usize,
}

impl ClassTally {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    fn record(mut self, success: bool) -> Self {
        if success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self
    }
}

/// Counters returned to the caller of `/notify-new-order`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationStats {
    pub total_repartidores: usize,
    pub repartidores_exitosos: usize,
    pub repartidores_fallidos: usize,
    pub total_administradores: usize,
    pub administradores_exitosos: usize,
    pub administradores_fallidos: usize,
    pub total_enviados: usize,
    pub exitosos: usize,
    pub fallidos: usize,
    pub orden: String,
    pub precio: String,
}

impl NotificationStats {
    /// Folds dispatch results into per-class counters.
    pub fn aggregate(
        results: &[DispatchResult],
        order_number: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        let (couriers, admins) = results.iter().fold(
            (ClassTally::default(), ClassTally::default()),
            |(couriers, admins), result| match result.class {
                RecipientClass::Courier => (couriers.record(result.is_success()), admins),
                RecipientClass::Administrator => (couriers, admins.record(result.is_success())),
            },
        );

        Self {
            total_repartidores: couriers.total(),
            repartidores_exitosos: couriers.succeeded,
            repartidores_fallidos: couriers.failed,
            total_administradores: admins.total(),
            administradores_exitosos: admins.succeeded,
            administradores_fallidos: admins.failed,
            total_enviados: couriers.total() + admins.total(),
            exitosos: couriers.succeeded + admins.succeeded,
            fallidos: couriers.failed + admins.failed,
            orden: order_number.into(),
            precio: price.into(),
        }
    }
}
