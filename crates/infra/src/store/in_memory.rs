use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use larder_catalog::{FoodCatalog, FoodItem};
use larder_core::{FoodItemId, InventoryId, LedgerError, LedgerResult, UserId};
use larder_inventory::{ConsumptionLogEntry, InventoryRecord, User};

use super::{Datastore, TxAccess};

const DEFAULT_TX_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    food_items: HashMap<FoodItemId, FoodItem>,
    inventory: HashMap<InventoryId, InventoryRecord>,
    entries: Vec<ConsumptionLogEntry>,
}

/// In-memory datastore.
///
/// Intended for tests/dev. Transactions take the store-wide write lock for
/// their full duration, which gives serializable isolation: two concurrent
/// read-then-write transactions on the same record always run one after the
/// other.
#[derive(Debug)]
pub struct InMemoryDatastore {
    tables: RwLock<Tables>,
    tx_timeout: Duration,
}

impl InMemoryDatastore {
    pub fn new() -> Self {
        Self::with_tx_timeout(DEFAULT_TX_TIMEOUT)
    }

    /// Build a store with a custom transaction wait bound.
    pub fn with_tx_timeout(tx_timeout: Duration) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            tx_timeout,
        }
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Seed a catalog item. Reference data is maintained outside the core,
    /// so this sits next to the store constructor rather than on the
    /// `Datastore` trait.
    pub fn seed_food_item(&self, item: FoodItem) -> LedgerResult<()> {
        let mut tables = self.write_tables()?;
        tables.food_items.insert(item.id, item);
        Ok(())
    }

    fn read_tables(&self) -> LedgerResult<std::sync::RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| LedgerError::unavailable("store lock poisoned"))
    }

    fn write_tables(&self) -> LedgerResult<std::sync::RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| LedgerError::unavailable("store lock poisoned"))
    }
}

impl Default for InMemoryDatastore {
    fn default() -> Self {
        Self::new()
    }
}

/// Staged view over the locked tables; writes land in the buffers and are
/// applied on commit only.
struct MemTx<'a> {
    tables: &'a Tables,
    staged_inventory: HashMap<InventoryId, InventoryRecord>,
    staged_entries: Vec<ConsumptionLogEntry>,
}

impl TxAccess for MemTx<'_> {
    fn find_inventory(&self, id: InventoryId) -> LedgerResult<Option<InventoryRecord>> {
        if let Some(staged) = self.staged_inventory.get(&id) {
            return Ok(Some(staged.clone()));
        }
        Ok(self.tables.inventory.get(&id).cloned())
    }

    fn put_inventory(&mut self, record: InventoryRecord) -> LedgerResult<()> {
        self.staged_inventory.insert(record.id, record);
        Ok(())
    }

    fn append_entry(&mut self, entry: ConsumptionLogEntry) -> LedgerResult<()> {
        self.staged_entries.push(entry);
        Ok(())
    }
}

impl Datastore for InMemoryDatastore {
    fn find_user(&self, id: UserId) -> LedgerResult<Option<User>> {
        Ok(self.read_tables()?.users.get(&id).cloned())
    }

    fn put_user(&self, user: User) -> LedgerResult<()> {
        let mut tables = self.write_tables()?;
        tables.users.insert(user.id, user);
        Ok(())
    }

    fn find_inventory(&self, id: InventoryId) -> LedgerResult<Option<InventoryRecord>> {
        Ok(self.read_tables()?.inventory.get(&id).cloned())
    }

    fn inventory_expiring_between(
        &self,
        user_id: UserId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> LedgerResult<Vec<InventoryRecord>> {
        let tables = self.read_tables()?;
        let mut records: Vec<InventoryRecord> = tables
            .inventory
            .values()
            .filter(|r| r.user_id == user_id)
            .filter(|r| {
                r.expires_at
                    .is_some_and(|exp| exp >= from && exp <= to)
            })
            .cloned()
            .collect();
        records.sort_by_key(|r| (r.expires_at, r.id));
        Ok(records)
    }

    fn entries_between(
        &self,
        user_id: UserId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> LedgerResult<Vec<ConsumptionLogEntry>> {
        let tables = self.read_tables()?;
        Ok(tables
            .entries
            .iter()
            .filter(|e| e.user_id == user_id && e.logged_at >= from && e.logged_at <= to)
            .cloned()
            .collect())
    }

    fn run_transaction(
        &self,
        body: &mut dyn FnMut(&mut dyn TxAccess) -> LedgerResult<()>,
    ) -> LedgerResult<()> {
        let mut tables = self.write_tables()?;
        let started = Instant::now();

        let mut tx = MemTx {
            tables: &*tables,
            staged_inventory: HashMap::new(),
            staged_entries: Vec::new(),
        };
        body(&mut tx)?;

        if started.elapsed() > self.tx_timeout {
            tracing::warn!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                "transaction exceeded its wait bound, discarding staged writes"
            );
            return Err(LedgerError::Timeout);
        }

        let MemTx {
            staged_inventory,
            staged_entries,
            ..
        } = tx;
        for (id, record) in staged_inventory {
            tables.inventory.insert(id, record);
        }
        tables.entries.extend(staged_entries);
        Ok(())
    }
}

impl FoodCatalog for InMemoryDatastore {
    fn find_food_item(&self, id: FoodItemId) -> LedgerResult<Option<FoodItem>> {
        Ok(self.read_tables()?.food_items.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn lot(
        user_id: UserId,
        name: &str,
        quantity: f64,
        expires_at: Option<DateTime<Utc>>,
    ) -> InventoryRecord {
        InventoryRecord {
            id: InventoryId::new(),
            user_id,
            food_item_id: None,
            name: name.to_string(),
            quantity,
            unit: "unit".to_string(),
            purchased_at: None,
            expires_at,
            source_image: None,
            metadata: None,
            created_at: Utc::now(),
        }
    }

    fn entry(user_id: UserId, quantity: f64) -> ConsumptionLogEntry {
        ConsumptionLogEntry::record(
            user_id,
            larder_inventory::LogKind::Purchased,
            "milk",
            quantity,
            None,
            Utc::now(),
        )
    }

    #[test]
    fn committed_transaction_applies_all_staged_writes() {
        let store = InMemoryDatastore::new();
        let user_id = UserId::new();
        let record = lot(user_id, "milk", 2.0, None);
        let record_id = record.id;

        store
            .run_transaction(&mut |tx| {
                tx.put_inventory(record.clone())?;
                tx.append_entry(entry(user_id, 2.0))?;
                Ok(())
            })
            .unwrap();

        assert_eq!(store.find_inventory(record_id).unwrap().unwrap().name, "milk");
        let far_past = Utc::now() - ChronoDuration::days(1);
        let far_future = Utc::now() + ChronoDuration::days(1);
        assert_eq!(
            store.entries_between(user_id, far_past, far_future).unwrap().len(),
            1
        );
    }

    #[test]
    fn failed_transaction_discards_every_staged_write() {
        let store = InMemoryDatastore::new();
        let user_id = UserId::new();
        let record = lot(user_id, "milk", 2.0, None);
        let record_id = record.id;

        let err = store
            .run_transaction(&mut |tx| {
                tx.put_inventory(record.clone())?;
                tx.append_entry(entry(user_id, 2.0))?;
                Err(LedgerError::invalid_argument("boom"))
            })
            .unwrap_err();

        assert!(matches!(err, LedgerError::InvalidArgument(_)));
        assert!(store.find_inventory(record_id).unwrap().is_none());
        let far_past = Utc::now() - ChronoDuration::days(1);
        let far_future = Utc::now() + ChronoDuration::days(1);
        assert!(store.entries_between(user_id, far_past, far_future).unwrap().is_empty());
    }

    #[test]
    fn exceeding_the_wait_bound_aborts_with_timeout_and_no_effect() {
        let store = InMemoryDatastore::with_tx_timeout(Duration::ZERO);
        let user_id = UserId::new();
        let record = lot(user_id, "milk", 2.0, None);
        let record_id = record.id;

        let err = store
            .run_transaction(&mut |tx| {
                tx.put_inventory(record.clone())?;
                std::thread::sleep(Duration::from_millis(2));
                Ok(())
            })
            .unwrap_err();

        assert_eq!(err, LedgerError::Timeout);
        assert!(store.find_inventory(record_id).unwrap().is_none());
    }

    #[test]
    fn transaction_reads_see_its_own_staged_writes() {
        let store = InMemoryDatastore::new();
        let user_id = UserId::new();
        let record = lot(user_id, "milk", 2.0, None);
        let record_id = record.id;

        store
            .run_transaction(&mut |tx| {
                tx.put_inventory(record.clone())?;
                let seen = tx.find_inventory(record_id)?.expect("staged record visible");
                assert_eq!(seen.quantity, 2.0);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn expiration_range_is_inclusive_sorted_and_skips_undated_records() {
        let store = InMemoryDatastore::new();
        let user_id = UserId::new();
        let now = Utc::now();

        let soon = lot(user_id, "yogurt", 1.0, Some(now + ChronoDuration::hours(2)));
        let later = lot(user_id, "cheese", 1.0, Some(now + ChronoDuration::days(3)));
        let boundary = lot(user_id, "eggs", 1.0, Some(now));
        let undated = lot(user_id, "rice", 1.0, None);
        let other_user = lot(UserId::new(), "milk", 1.0, Some(now + ChronoDuration::hours(1)));

        store
            .run_transaction(&mut |tx| {
                for r in [&soon, &later, &boundary, &undated, &other_user] {
                    tx.put_inventory((*r).clone())?;
                }
                Ok(())
            })
            .unwrap();

        let found = store
            .inventory_expiring_between(user_id, now, now + ChronoDuration::days(3))
            .unwrap();
        let names: Vec<&str> = found.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["eggs", "yogurt", "cheese"]);

        // Upper bound is inclusive too.
        let found = store
            .inventory_expiring_between(user_id, now, now + ChronoDuration::hours(2))
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn catalog_lookup_resolves_seeded_items_only() {
        let store = InMemoryDatastore::new();
        let item = FoodItem {
            id: FoodItemId::new(),
            name: "Milk".to_string(),
            category: "dairy".to_string(),
            default_expiration_days: 7,
            avg_unit_cost: 1.2,
            unit: "liter".to_string(),
        };
        store.seed_food_item(item.clone()).unwrap();

        assert_eq!(store.find_food_item(item.id).unwrap(), Some(item));
        assert_eq!(store.find_food_item(FoodItemId::new()).unwrap(), None);
    }
}
