//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (HMAC-SHA256, Base64)
//! - Secret handling for gateway keys
//! - Environment configuration helpers
//! - The outbound HTTP client
//! - Client identification for audit logs

pub mod client;
pub mod config;
pub mod crypto;
pub mod http;
pub mod secret;
