// src/services/mod.rs
pub mod auth_service;
pub mod composer_service;
pub mod dispatch_service;
pub mod firestore_service;
pub mod messaging_service;
pub mod order_service;
pub mod recipient_service;
pub mod token_service;
