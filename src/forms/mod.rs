// src/forms/mod.rs
//! Database-driven form configuration and the dynamic applications schema

pub mod defaults;
pub mod handlers;
pub mod models;
pub mod queries;
pub mod routes;
pub mod schema;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::forms_routes;
