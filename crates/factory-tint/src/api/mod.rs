//! Public API for the factory-tint crate.
//!
//! This module provides the high-level API: [`Recolorer`] builder,
//! [`PreparedSubject`] and the [`TintError`] unified error type.

mod builder;
mod error;

pub use builder::{PreparedSubject, Recolorer};
pub use error::TintError;
