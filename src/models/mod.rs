// src/models/mod.rs
pub mod notification;
pub mod order;
pub mod stats;
pub mod user;

pub use notification::*;
pub use order::*;
pub use stats::*;
pub use user::*;
