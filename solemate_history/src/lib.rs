#![deny(
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

//! Session history stores.
//!
//! - [`InMemoryHistoryStore`]: process-local, for tests and ephemeral chats
//! - [`SqlHistoryStore`]: sea-orm backed, one transaction per append
//!
//! Both serialize appends per session so sequence numbers stay contiguous.

mod locks;
mod memory;
mod sql;

pub use locks::SessionLocks;
pub use memory::InMemoryHistoryStore;
pub use solemate_core::HistoryStore;
pub use sql::SqlHistoryStore;
