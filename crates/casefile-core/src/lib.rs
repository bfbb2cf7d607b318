//! Core types and trait definitions for the casefile lead pipeline.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Every other crate depends on it; scoring logic lives in
//! `casefile-engine`, persistence in `casefile-store-sqlite`.

pub mod artifact;
pub mod canonical;
pub mod case;
pub mod error;
pub mod lead;
pub mod lifecycle;
pub mod policy;
pub mod store;

pub use error::{Error, Result};
