// Common module - shared types and utilities across all modules

pub mod config;
pub mod dev_mode;
pub mod error;
pub mod flash;
pub mod helpers;
pub mod i18n;
pub mod migrations;
pub mod state;
pub mod validation;
pub mod view;

// Re-export commonly used types for convenience
pub use error::{ApiError, StoreError};
pub use flash::{Flash, FlashRedirect, IncomingFlash};
pub use helpers::safe_email_log;
pub use i18n::Translator;
pub use state::AppState;
pub use validation::{ValidationResult, Validator};
pub use view::View;

#[cfg(test)]
pub mod test_support;
