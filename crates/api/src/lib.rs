//! Storehouse catalog API library.
//!
//! The binary in `main.rs` wires configuration, logging, and Sentry around
//! [`app::build_router`]; everything else lives here so it can be tested
//! without a running server.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod config;
pub mod db;
pub mod dto;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;
