//! HTTP handlers for the AI service.

pub mod ai;
pub mod health;
