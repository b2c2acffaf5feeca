// src/admin/handlers/mod.rs

pub mod dashboard;
pub mod exports;
pub mod statuses;
pub mod users;
