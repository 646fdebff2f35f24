//! Core types, scoring engine, and trait definitions for bendscore.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; scoring lives here so it can be called
//! from anywhere without a runtime.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod adapter;
pub mod catalog;
pub mod error;
pub mod overlay;
pub mod scoring;
pub mod store;
pub mod version;

pub use error::{Error, Result};
pub use scoring::{ProductScore, score_record};
