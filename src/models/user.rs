// src/models/user.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a user as stored in the `rol` field.
///
/// Matching against the stored literal is exact and case-sensitive:
/// `"Repartidor"` is not a courier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserRole {
    Courier,
    Administrator,
    Other(String),
}

impl UserRole {
    pub const COURIER_LITERAL: &'static str = "REPARTIDOR";
    pub const ADMINISTRATOR_LITERAL: &'static str = "ADMINISTRADOR";

    pub fn from_stored(value: &str) -> Self {
        match value {
            Self::COURIER_LITERAL => UserRole::Courier,
            Self::ADMINISTRATOR_LITERAL => UserRole::Administrator,
            other => UserRole::Other(other.to_string()),
        }
    }

    pub fn as_stored(&self) -> &str {
        match self {
            UserRole::Courier => Self::COURIER_LITERAL,
            UserRole::Administrator => Self::ADMINISTRATOR_LITERAL,
            UserRole::Other(value) => value,
        }
    }
}

/// Status of a user as stored in the `estado` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserStatus {
    Active,
    Other(String),
}

impl UserStatus {
    pub const ACTIVE_LITERAL: &'static str = "Activo";

    pub fn from_stored(value: &str) -> Self {
        match value {
            Self::ACTIVE_LITERAL => UserStatus::Active,
            other => UserStatus::Other(other.to_string()),
        }
    }

    pub fn as_stored(&self) -> &str {
        match self {
            UserStatus::Active => Self::ACTIVE_LITERAL,
            UserStatus::Other(value) => value,
        }
    }
}

/// Who a notification is addressed to. Decides message wording and counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientClass {
    Courier,
    Administrator,
}

impl RecipientClass {
    pub fn role(self) -> UserRole {
        match self {
            RecipientClass::Courier => UserRole::Courier,
            RecipientClass::Administrator => UserRole::Administrator,
        }
    }
}

impl fmt::Display for RecipientClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipientClass::Courier => write!(f, "courier"),
            RecipientClass::Administrator => write!(f, "administrator"),
        }
    }
}

/// A user document read from the `Users` collection. Read-only to the relay.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: String,
    pub name: Option<String>,
    pub role: UserRole,
    pub status: Option<UserStatus>,
    pub fcm_token: Option<String>,
}

impl UserRecord {
    pub const DEFAULT_NAME: &'static str = "Sin nombre";

    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(Self::DEFAULT_NAME)
    }
}

/// A sanitized push token together with its owner.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryToken {
    pub token: String,
    pub owner_id: String,
    pub owner_name: String,
    pub class: RecipientClass,
}

impl DeliveryToken {
    /// Leading characters of the token, for log lines.
    pub fn preview(&self) -> &str {
        token_preview(&self.token, 30)
    }
}

pub fn token_preview(token: &str, max_chars: usize) -> &str {
    match token.char_indices().nth(max_chars) {
        Some((idx, _)) => &token[..idx],
        None => token,
    }
}
