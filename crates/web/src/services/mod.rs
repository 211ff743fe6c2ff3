//! Business logic services.

pub mod catalog;

pub use catalog::{CatalogError, CatalogService, CatalogStore, DEFAULT_RESTOCK_AMOUNT};
