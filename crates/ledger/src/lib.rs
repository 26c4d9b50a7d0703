//! Inventory ledger: the component that owns every state change to
//! inventory records and the consumption log.
//!
//! Each operation pairs exactly one record write with exactly one log
//! append inside a single datastore transaction, so callers never observe a
//! quantity change without its audit entry or vice versa.

pub mod ledger;
pub mod users;

pub use ledger::Ledger;
