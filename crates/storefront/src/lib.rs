//! Aiaxcart storefront library.
//!
//! The shop and its back office as a JSON API over `SQLite`, exposed as a
//! library so the CLI and tests can reuse the repositories and services.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
