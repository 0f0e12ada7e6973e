//! Shared primitives for the GISA Gauss-integral toolkit.
//!
//! `gisa-core` holds what every GISA crate agrees on:
//!
//! - **Error types** — [`GisaError`] and [`Result`] for structured error handling
//! - **Traits** — [`Summarizable`], [`Annotated`], [`ContentAddressable`]
//! - **Hashing** — SHA-256 content addressing of coordinate data

pub mod error;
pub mod hash;
pub mod traits;

pub use error::{GisaError, Result};
pub use traits::*;
