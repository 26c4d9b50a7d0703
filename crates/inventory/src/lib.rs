//! Inventory domain module.
//!
//! This crate contains the records the ledger operates on — users, inventory
//! lots, and the append-only consumption log — implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod log;
pub mod record;
pub mod user;

pub use log::{ConsumptionLogEntry, LogKind};
pub use record::{InventoryRecord, NewPurchase, ensure_positive_amount};
pub use user::{NewUser, ProfileUpdate, User};
