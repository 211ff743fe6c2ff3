//! Sweet Shop Core - Shared domain library.
//!
//! This crate provides the types and pure logic used across all Sweet Shop
//! components:
//! - `web` - Server-rendered shop (browsing, purchasing, administration)
//! - `cli` - Command-line tools for seeding and maintenance
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no async. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and emails
//! - [`sweet`] - The catalog record and its create/update payloads
//! - [`filter`] - Pure catalog filtering (search, category, price band)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod filter;
pub mod sweet;
pub mod types;

pub use filter::*;
pub use sweet::*;
pub use types::*;
