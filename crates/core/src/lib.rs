//! Aiaxcart Core - shared types and pure business rules.
//!
//! Used by:
//! - `storefront` - the HTTP server (shop and back office)
//! - `cli` - migrations, admin accounts, seeding and export
//!
//! # Architecture
//!
//! No I/O lives here: no database access, no HTTP. Everything is plain data
//! and deterministic functions, so the pricing and expiry rules can be tested
//! in isolation.
//!
//! # Modules
//!
//! - [`types`] - IDs, emails, prices, statuses and purchase options
//! - [`pricing`] - order totals
//! - [`expiry`] - delivery expiry timestamps

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod expiry;
pub mod pricing;
pub mod types;

pub use types::*;
