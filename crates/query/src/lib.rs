//! Query service: read-only derived views over ledger data.
//!
//! Views never mutate state and run outside any transaction; snapshot
//! semantics relative to concurrent writes are whatever the datastore
//! provides.

pub mod views;

pub use views::{ConsumptionStats, ExpiringItem, QueryService};
