//! # Surgilog Common Library
//!
//! Shared code for the Surgilog service including:
//! - Database schema initialization and settings
//! - Data models (areas, residents, teachers, surgeries, records, users)
//! - Authentication primitives (password hashing, session tokens)
//! - Configuration loading

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use error::{Error, Result};
