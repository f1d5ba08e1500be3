// src/models/notification.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NotificationPriority {
    Normal,
    High, // Will wake sleeping devices
}

impl Default for NotificationPriority {
    fn default() -> Self {
        Self::High
    }
}

impl NotificationPriority {
    pub fn as_fcm(&self) -> &'static str {
        match self {
            NotificationPriority::High => "high",
            NotificationPriority::Normal => "normal",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AndroidHints {
    pub channel_id: String,
    pub priority: NotificationPriority,
    pub sound: String,
    pub icon: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApnsHints {
    pub sound: String,
    pub badge: u32,
}

/// A push message before it is addressed to a device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    /// FCM only accepts string values in the data payload.
    pub data: BTreeMap<String, String>,
    pub android: Option<AndroidHints>,
    pub apns: Option<ApnsHints>,
}

impl PushMessage {
    pub fn new(title: &str, body: &str) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
            ..Default::default()
        }
    }

    pub fn with_data(mut self, data: BTreeMap<String, String>) -> Self {
        self.data = data;
        self
    }

    pub fn with_android(mut self, android: AndroidHints) -> Self {
        self.android = Some(android);
        self
    }

    pub fn with_apns(mut self, apns: ApnsHints) -> Self {
        self.apns = Some(apns);
        self
    }

    /// The discriminant tag carried in `data.type`, if any.
    pub fn kind(&self) -> Option<&str> {
        self.data.get("type").map(String::as_str)
    }
}
