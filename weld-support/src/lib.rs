//! # Weld Support
//!
//! Shared helpers for the Weld DI crates.
//!
//! This crate provides:
//! - Text rendering for validation error messages
//! - Type-name shortening and "did you mean?" matching

pub mod rendering;
