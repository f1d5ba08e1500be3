pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;

// Re-export commonly used types
pub use errors::{RelayError, RelayResult};
pub use handlers::create_router;
