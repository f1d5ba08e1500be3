// src/services/recipient_service.rs
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing;

use crate::{
    errors::RelayError as AppError,
    models::user::{UserRecord, UserRole, UserStatus},
    services::firestore_service::{FIELD_ROLE, FIELD_STATUS, FieldFilter, UserDirectory},
};

pub struct RecipientResolver {
    directory: Arc<dyn UserDirectory>,
}

impl RecipientResolver {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Users whose stored role (and status, when given) equals the literal
    /// exactly. No match is an empty list.
    pub async fn resolve(&self, role: &UserRole, status: Option<&UserStatus>) -> Result<Vec<UserRecord>, AppError> {
        let mut filters = vec![FieldFilter::equals(FIELD_ROLE, role.as_stored())];
        if let Some(status) = status {
            filters.push(FieldFilter::equals(FIELD_STATUS, status.as_stored()));
        }

        let records = self.directory.query_users(&filters).await?;
        tracing::info!(
            "Found {} users with {}=\"{}\"{}",
            records.len(),
            FIELD_ROLE,
            role.as_stored(),
            status.map(|s| format!(" and {}=\"{}\"", FIELD_STATUS, s.as_stored())).unwrap_or_default()
        );

        if records.is_empty() && status.is_some() {
            self.log_status_mismatch(role, status).await;
        }

        Ok(records)
    }

    /// Logs which status values exist for a role when the filtered query came
    /// back empty. Never affects the result.
    async fn log_status_mismatch(&self, role: &UserRole, wanted: Option<&UserStatus>) {
        let filters = [FieldFilter::equals(FIELD_ROLE, role.as_stored())];
        let everyone = match self.directory.query_users(&filters).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Diagnostic query for role {} failed: {}", role.as_stored(), e);
                return;
            }
        };

        if everyone.is_empty() {
            tracing::warn!(
                "No users with {}=\"{}\" at all; check the stored value matches exactly",
                FIELD_ROLE,
                role.as_stored()
            );
            return;
        }

        let mut by_status: BTreeMap<String, usize> = BTreeMap::new();
        for record in &everyone {
            let key = record
                .status
                .as_ref()
                .map(|s| format!("\"{}\"", s.as_stored()))
                .unwrap_or_else(|| "<missing>".to_string());
            *by_status.entry(key).or_default() += 1;
        }

        tracing::warn!(
            "{} users have role \"{}\" but none has {}=\"{}\"; stored values: {:?}",
            everyone.len(),
            role.as_stored(),
            FIELD_STATUS,
            wanted.map(UserStatus::as_stored).unwrap_or_default(),
            by_status
        );
    }
}
