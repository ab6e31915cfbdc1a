//! # Auth Module
//!
//! Authentication and authorization for the admin routes:
//! - JWT token validation
//! - AuthedUser extractor for protected routes
//! - Permission checks

pub mod extractors;
pub mod models;
pub mod policy;


pub use extractors::AuthedUser;
pub use models::User;
