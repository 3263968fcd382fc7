//! Application Layer - Use Cases
//!
//! This layer orchestrates domain logic and infrastructure.
//! Contains use case implementations.

pub mod config;
pub mod esewa_callback;
pub mod get_attempt;
pub mod initiate_esewa;
pub mod initiate_khalti;
mod ledger;
pub mod verify_esewa;
pub mod verify_khalti;
