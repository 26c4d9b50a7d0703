//! Datastore adapter contract.
//!
//! The ledger and query service talk to the document store only through
//! these traits. Real deployments plug in a database-backed implementation;
//! `InMemoryDatastore` covers tests and local development.

use chrono::{DateTime, Utc};

use larder_core::{InventoryId, LedgerResult, UserId};
use larder_inventory::{ConsumptionLogEntry, InventoryRecord, User};

pub mod in_memory;

pub use in_memory::InMemoryDatastore;

/// Transactional view handed to a unit-of-work closure.
///
/// Writes made through this view are buffered; they become visible only if
/// the closure returns `Ok` and the transaction commits. Reads see the
/// transaction's own staged writes first, then committed state.
pub trait TxAccess {
    fn find_inventory(&self, id: InventoryId) -> LedgerResult<Option<InventoryRecord>>;

    /// Stage a create-or-replace of an inventory record.
    fn put_inventory(&mut self, record: InventoryRecord) -> LedgerResult<()>;

    /// Stage an append to the consumption log. The log is append-only;
    /// entries are never updated or deleted.
    fn append_entry(&mut self, entry: ConsumptionLogEntry) -> LedgerResult<()>;
}

/// Document datastore contract.
///
/// Five logical record sets back the system (users, food items, inventory
/// records, log entries, resources); the methods here cover the subsets the
/// core reads and writes. Inventory records are indexed by owner and by
/// expiration timestamp, log entries by owner and timestamp, so the range
/// queries below are cheap for any reasonable backend.
pub trait Datastore: Send + Sync {
    fn find_user(&self, id: UserId) -> LedgerResult<Option<User>>;

    /// Create or replace a user document.
    fn put_user(&self, user: User) -> LedgerResult<()>;

    fn find_inventory(&self, id: InventoryId) -> LedgerResult<Option<InventoryRecord>>;

    /// The user's inventory records with `expires_at` in `[from, to]`,
    /// both bounds inclusive, ordered by ascending expiration with record
    /// id as the stable tie-break. Records without an expiration are never
    /// returned.
    fn inventory_expiring_between(
        &self,
        user_id: UserId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> LedgerResult<Vec<InventoryRecord>>;

    /// The user's log entries with `logged_at` in `[from, to]`, both bounds
    /// inclusive, in append order.
    fn entries_between(
        &self,
        user_id: UserId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> LedgerResult<Vec<ConsumptionLogEntry>>;

    /// Run `body` as one all-or-nothing transaction.
    ///
    /// Any error from `body` aborts the transaction and discards every
    /// staged write. Implementations bound the transaction's total wait and
    /// abort with `LedgerError::Timeout` (again with no partial effect)
    /// when the bound is exceeded. Read-then-write on a record inside one
    /// transaction is serializable with respect to concurrent transactions
    /// touching the same record.
    fn run_transaction(
        &self,
        body: &mut dyn FnMut(&mut dyn TxAccess) -> LedgerResult<()>,
    ) -> LedgerResult<()>;
}
