//! Deterministic scoring and routing logic for the casefile pipeline.
//!
//! Everything in this crate is pure and synchronous: no I/O, no clocks, no
//! randomness. Functions take immutable inputs plus a reference to the loaded
//! [`casefile_core::policy::Policy`] and return new values, so they may be
//! called from any number of threads at once.
//!
//! # Stages
//!
//! | Module | Stage |
//! |---|---|
//! | [`incident`], [`hook`], [`prescore`] | discovery: relevance, typing, admission scores |
//! | [`triage`] | hard-kill short-circuit and threshold verdict |
//! | [`forward`] | dedupe and score-gated forwarding to the hunt |
//! | [`hunt`], [`classify`] | query planning, result budget, artifact classification |
//! | [`bundle`] | per-artifact factors and bundle tiering |
//! | [`report`] | missed-opportunity analysis |

pub mod bundle;
pub mod classify;
pub mod entity;
pub mod error;
pub mod forward;
pub mod hook;
pub mod hunt;
pub mod incident;
pub mod jurisdiction;
pub mod prescore;
pub mod report;
pub mod timeline;
pub mod triage;

pub use error::{Error, Result};

/// Round to two decimal places.
pub(crate) fn round2(x: f64) -> f64 { (x * 100.0).round() / 100.0 }
