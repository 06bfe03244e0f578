//! HTTP API handlers for surgilog-web

pub mod areas;
pub mod auth;
pub mod health;
pub mod records;
pub mod residents;
pub mod surgeries;
pub mod teachers;
pub mod ui;
pub mod users;
