//! Core primitives, traits, and types shared by the watchtower components.
//!
//! This crate holds no I/O: it defines the value types the responder engine
//! operates on and the trait seams to the external collaborators (chain
//! client, fee estimator, durable action store).

#![warn(unused_extern_crates)]
#![forbid(unsafe_code)]

pub mod error;
pub use error::*;

/// Async traits for the external collaborators of the engine
pub mod traits;
pub use traits::*;

/// Core watchtower data structures
pub mod types;
pub use types::*;
