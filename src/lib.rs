//! Refinish - factory paint for product photos
//!
//! HTTP and CLI front end for the `factory_tint` recoloring pipeline.
//! This library exposes modules for integration testing.

pub mod api;
pub mod assets;
pub mod error;
pub mod models;
pub mod rendering;
pub mod server;
pub mod services;
