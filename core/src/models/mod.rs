// storefront/src/models/mod.rs

//! Typed records for the documents the checkout reads and writes.

pub mod cart;
pub mod catalog;
pub mod customer;
pub mod order;

pub use cart::{CardDetails, CartRequest, PostalAddress};
pub use catalog::{PriceRecord, Product, PromotionCode, ShippingCountry};
pub use customer::Customer;
pub use order::{Address, LineAmount, LineItem, Location, Order, ORDER_PLACED};
