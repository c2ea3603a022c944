#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Catalog store implementations.
//!
//! The conversation layer only reads the catalog; writes happen through
//! [`seed_catalog`] and whatever product admin tooling sits outside this
//! workspace.

mod memory;
mod seed;
mod sql;

pub use memory::InMemoryCatalog;
pub use seed::{demo_products, seed_catalog};
pub use solemate_core::CatalogStore;
pub use sql::SqlCatalogStore;
