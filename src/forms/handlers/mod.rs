// src/forms/handlers/mod.rs

pub mod fields;
pub mod public;
pub mod sections;

pub use fields::*;
pub use public::*;
pub use sections::*;
