//! Storefront Backend Library
//!
//! Session-token auth with a revocation list, role gates, and the product
//! catalogue they protect. The binary in `main.rs` only wires these together.

pub mod api;
pub mod auth;
pub mod config;
pub mod middleware;
pub mod models;
pub mod products;

pub use api::{build_router, AppState};
pub use config::{AppConfig, Cli, Command};
