//! # Auth Module
//!
//! Email/password sessions for the review dashboard:
//! - Salted password hashing
//! - Session tokens carried as a Bearer header or the `rt_session` cookie
//! - AuthedUser extractor with admin/viewer roles

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod password;
pub mod routes;
pub mod session;

#[cfg(test)]
mod tests;

pub use extractors::AuthedUser;
pub use models::Role;
pub use routes::auth_routes;
