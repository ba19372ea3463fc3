//! Domain models for the store.
//!
//! These are validated domain objects, separate from the database row types
//! in [`crate::db`].

pub mod credential;
pub mod feedback;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use credential::{Credential, CredentialListing};
pub use feedback::Feedback;
pub use order::{NewOrder, Order, OrderWithCustomer};
pub use product::{NewProduct, Product};
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
