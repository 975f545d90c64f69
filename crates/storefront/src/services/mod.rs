//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Registration and password login behind the [`auth::Authenticator`] port
//! - `cart` - Per-user cart lifecycle and line items
//! - `checkout` - Cart to order conversion
//! - `catalog` - Product lookups
//! - `orders` - Order history
//! - `profile` - The logged-in user's profile
//!
//! Services are transport-free: they take ids and plain values and return
//! domain models or a [`ShopError`].

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
mod error;
pub mod orders;
pub mod profile;

pub use cart::CartService;
pub use catalog::CatalogService;
pub use checkout::CheckoutService;
pub use error::ShopError;
pub use orders::OrderService;
pub use profile::ProfileService;
