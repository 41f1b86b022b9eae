//! Modules layer - Infrastructure components for external integrations
//!
//! Contains clients and adapters for external services; currently outbound mail.

pub mod mail;
