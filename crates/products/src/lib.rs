//! Products domain module.
//!
//! Two closed categories (perishable, durable) share identity, pricing and
//! physical size, and differ in storage cost and freshness rules. Pure
//! deterministic domain logic (no IO).

pub mod durable;
pub mod perishable;
pub mod product;

pub use durable::DurableProduct;
pub use perishable::{FreshnessStatus, PerishableProduct};
pub use product::{
    NewProduct, Product, ProductCore, ProductDetails, ProductInfo, ProductType, Storable,
    round_currency,
};
