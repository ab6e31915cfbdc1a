//! # Companies Module
//!
//! Admin pages for companies: list, create, show, edit, update and delete.
//! Responses are views or redirects carrying a localized flash message.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::companies_routes;
