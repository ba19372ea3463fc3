//! Business logic services for the shop.
//!
//! # Services
//!
//! - `auth` - Registration and password login
//! - `catalog` - Product browsing, quoting and product administration
//! - `inventory` - Credential stock
//! - `orders` - Checkout and delivery
//! - `account` - A buyer's own orders and profile
//! - `feedback` - Customer feedback
//! - `dashboard` - Back-office figures
//! - `notify` - Notification events

pub mod account;
pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod feedback;
pub mod inventory;
pub mod notify;
pub mod orders;

pub use account::{AccountError, AccountService, Profile};
pub use auth::{AuthError, AuthService};
pub use catalog::{CatalogError, CatalogService};
pub use dashboard::DashboardStats;
pub use feedback::{FeedbackError, FeedbackService};
pub use inventory::{InventoryError, InventoryService};
pub use orders::{Checkout, OrderError, OrderService};
