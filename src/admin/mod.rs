//! # Admin Module
//!
//! Review dashboard backend:
//! - Filtered report data and exports
//! - Hiring status updates
//! - Viewer account management
//! - Public statistics and health probe

pub mod handlers;
pub mod models;
pub mod reports;
pub mod routes;
pub mod validators;


pub use routes::admin_routes;
