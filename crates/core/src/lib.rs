//! Shared domain types for the Haybi image-edit backend.
//!
//! Everything here is storage- and transport-agnostic: job identifiers,
//! the job status machine, and the domain error type.

pub mod error;
pub mod status;
pub mod types;
