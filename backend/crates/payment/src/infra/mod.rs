//! Infrastructure Layer
//!
//! Gateway HTTP clients and the attempt store.

pub mod http;
pub mod memory;
