//! Shared Kernel - vocabulary shared by every payment-service crate
//!
//! This crate contains only what has the same meaning everywhere:
//! - The unified error type and its HTTP classification
//! - Typed identifiers
//!
//! Nothing here knows about a specific payment gateway.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
