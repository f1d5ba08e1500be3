// src/services/firestore_service.rs
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tracing;

use crate::{
    errors::RelayError as AppError,
    models::user::{UserRecord, UserRole, UserStatus},
    services::auth_service::GoogleAuth,
};

pub const FIELD_NAME: &str = "nombre";
pub const FIELD_ROLE: &str = "rol";
pub const FIELD_STATUS: &str = "estado";
pub const FIELD_TOKEN: &str = "fcmToken";

/// Exact-match predicate on a string field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: String,
    pub value: String,
}

impl FieldFilter {
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Read access to the user collection of the document store.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// All users matching every filter. No match is `Ok(vec![])`.
    async fn query_users(&self, filters: &[FieldFilter]) -> Result<Vec<UserRecord>, AppError>;
}

#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub base_url: String,
    pub collection: String,
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            base_url: "https://firestore.googleapis.com/v1".to_string(),
            collection: "Users".to_string(),
        }
    }
}

pub struct FirestoreUserDirectory {
    config: FirestoreConfig,
    client: reqwest::Client,
    auth: Arc<GoogleAuth>,
}

#[derive(Debug, Deserialize)]
struct RunQueryItem {
    document: Option<FirestoreDocument>,
}

#[derive(Debug, Deserialize)]
pub struct FirestoreDocument {
    pub name: String,
    #[serde(default)]
    pub fields: HashMap<String, Value>,
}

impl FirestoreUserDirectory {
    pub fn new(config: FirestoreConfig, client: reqwest::Client, auth: Arc<GoogleAuth>) -> Self {
        Self { config, client, auth }
    }

    fn run_query_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents:runQuery",
            self.config.base_url,
            self.auth.project_id()
        )
    }
}

fn structured_query(collection: &str, filters: &[FieldFilter]) -> Value {
    let mut field_filters: Vec<Value> = filters
        .iter()
        .map(|f| {
            json!({
                "fieldFilter": {
                    "field": { "fieldPath": f.field },
                    "op": "EQUAL",
                    "value": { "stringValue": f.value }
                }
            })
        })
        .collect();

    let mut query = json!({
        "from": [{ "collectionId": collection }]
    });

    match field_filters.len() {
        0 => {}
        1 => query["where"] = field_filters.remove(0),
        _ => {
            query["where"] = json!({
                "compositeFilter": { "op": "AND", "filters": field_filters }
            })
        }
    }

    json!({ "structuredQuery": query })
}

#[async_trait]
impl UserDirectory for FirestoreUserDirectory {
    async fn query_users(&self, filters: &[FieldFilter]) -> Result<Vec<UserRecord>, AppError> {
        tracing::debug!("Querying {} with {:?}", self.config.collection, filters);

        let access_token = self.auth.access_token().await?;
        let response = self
            .client
            .post(self.run_query_url())
            .bearer_auth(access_token)
            .json(&structured_query(&self.config.collection, filters))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Firestore query failed ({}): {}", status, error_text);
            return Err(AppError::FirestoreQuery(format!("{}: {}", status, error_text)));
        }

        let items: Vec<RunQueryItem> = response
            .json()
            .await
            .map_err(|e| AppError::FirestoreResponse(e.to_string()))?;

        Ok(items
            .into_iter()
            .filter_map(|item| item.document)
            .map(record_from_document)
            .collect())
    }
}

fn string_field(fields: &HashMap<String, Value>, name: &str) -> Option<String> {
    fields
        .get(name)
        .and_then(|v| v.get("stringValue"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Parses a Firestore document into a user record. Role and status are
/// matched against their stored literals here, once.
pub fn record_from_document(doc: FirestoreDocument) -> UserRecord {
    let id = doc.name.rsplit('/').next().unwrap_or_default().to_string();

    UserRecord {
        id,
        name: string_field(&doc.fields, FIELD_NAME),
        role: UserRole::from_stored(&string_field(&doc.fields, FIELD_ROLE).unwrap_or_default()),
        status: string_field(&doc.fields, FIELD_STATUS).map(|s| UserStatus::from_stored(&s)),
        fcm_token: string_field(&doc.fields, FIELD_TOKEN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_filter_is_not_composite() {
        let query = structured_query("Users", &[FieldFilter::equals("rol", "REPARTIDOR")]);
        let filter = &query["structuredQuery"]["where"]["fieldFilter"];
        assert_eq!(filter["field"]["fieldPath"], "rol");
        assert_eq!(filter["op"], "EQUAL");
        assert_eq!(filter["value"]["stringValue"], "REPARTIDOR");
        assert_eq!(query["structuredQuery"]["from"][0]["collectionId"], "Users");
    }

    #[test]
    fn test_multiple_filters_are_and_composed() {
        let query = structured_query(
            "Users",
            &[
                FieldFilter::equals("rol", "REPARTIDOR"),
                FieldFilter::equals("estado", "Activo"),
            ],
        );
        let composite = &query["structuredQuery"]["where"]["compositeFilter"];
        assert_eq!(composite["op"], "AND");
        assert_eq!(composite["filters"].as_array().unwrap().len(), 2);
        assert_eq!(composite["filters"][1]["fieldFilter"]["value"]["stringValue"], "Activo");
    }

    #[test]
    fn test_record_from_document() {
        let doc: FirestoreDocument = serde_json::from_value(json!({
            "name": "projects/p/databases/(default)/documents/Users/abc123",
            "fields": {
                "nombre": { "stringValue": "Carlos" },
                "rol": { "stringValue": "REPARTIDOR" },
                "estado": { "stringValue": "Activo" },
                "fcmToken": { "stringValue": "\"tok-1\"" }
            }
        }))
        .unwrap();

        let record = record_from_document(doc);
        assert_eq!(record.id, "abc123");
        assert_eq!(record.name.as_deref(), Some("Carlos"));
        assert_eq!(record.role, UserRole::Courier);
        assert_eq!(record.status, Some(UserStatus::Active));
        assert_eq!(record.fcm_token.as_deref(), Some("\"tok-1\""));
    }

    #[test]
    fn test_record_with_missing_and_null_fields() {
        let doc: FirestoreDocument = serde_json::from_value(json!({
            "name": "projects/p/databases/(default)/documents/Users/x",
            "fields": {
                "rol": { "stringValue": "ADMINISTRADOR" },
                "fcmToken": { "nullValue": null }
            }
        }))
        .unwrap();

        let record = record_from_document(doc);
        assert_eq!(record.role, UserRole::Administrator);
        assert_eq!(record.name, None);
        assert_eq!(record.status, None);
        assert_eq!(record.fcm_token, None);
    }
}
