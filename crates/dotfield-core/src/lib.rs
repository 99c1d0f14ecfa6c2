//! Core types, wire events, config, and errors for Dotfield.

pub mod config;
pub mod error;
pub mod protocol;
pub mod types;

pub use error::{DotfieldError, Result};
