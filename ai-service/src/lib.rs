pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;

/// Name reported by the health endpoint.
pub const SERVICE_NAME: &str = "AI Service";
/// Name reported by the info endpoints.
pub const SERVICE_DISPLAY_NAME: &str = "CEPEM AI Service";
