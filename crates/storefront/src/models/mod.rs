//! Domain models for the storefront.
//!
//! These are validated domain objects, separate from the database row types
//! in [`crate::db`]. All of them serialize to the JSON shapes returned by the
//! API.

pub mod cart;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use cart::{Cart, CartItem, CartLine, CartView};
pub use order::{NewOrder, NewOrderLine, Order, OrderDetail, OrderItem};
pub use product::{NewProduct, Product};
pub use session::{CurrentUser, keys as session_keys};
pub use user::{NewUser, PostalAddress, ProfileUpdate, User, UserProfile};
