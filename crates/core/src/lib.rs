//! Storehouse Core - Shared types library.
//!
//! This crate provides common types used across all Storehouse components:
//! - `api` - The catalog REST API (auth, products, categories, dashboard)
//! - `cli` - Command-line tools for migrations, user management and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and roles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
