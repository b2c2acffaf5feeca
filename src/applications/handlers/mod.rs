// src/applications/handlers/mod.rs

pub mod files;
pub mod records;
pub mod submissions;

pub use records::*;
pub use submissions::*;
