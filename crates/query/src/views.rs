use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use larder_catalog::FoodCatalog;
use larder_core::{LedgerError, LedgerResult, UserId};
use larder_infra::Datastore;
use larder_inventory::{InventoryRecord, LogKind};

/// An inventory record enriched with its catalog item's name/category, when
/// the weak reference still resolves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpiringItem {
    pub record: InventoryRecord,
    pub catalog_name: Option<String>,
    pub category: Option<String>,
}

/// Per-kind consumption-log counts over a date range.
///
/// Every field is present and zero when nothing matched; callers never have
/// to handle absent counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConsumptionStats {
    pub purchased: u64,
    pub consumed: u64,
    pub wasted: u64,
    pub donated: u64,
    pub total: u64,
    pub consumed_quantity: f64,
    pub wasted_quantity: f64,
}

/// Read-only derived views.
pub struct QueryService<S, C> {
    store: Arc<S>,
    catalog: Arc<C>,
}

impl<S, C> QueryService<S, C>
where
    S: Datastore,
    C: FoodCatalog,
{
    pub fn new(store: Arc<S>, catalog: Arc<C>) -> Self {
        Self { store, catalog }
    }

    /// The user's lots expiring within `[now, now + within_days]`, both
    /// bounds inclusive, earliest first with record id as the stable
    /// tie-break. Lots without an expiration are excluded regardless of the
    /// window.
    pub fn expiring_soon(
        &self,
        user_id: UserId,
        within_days: u32,
    ) -> LedgerResult<Vec<ExpiringItem>> {
        let now = Utc::now();
        // Saturate rather than overflow: a huge window means "everything".
        let until = now
            .checked_add_signed(Duration::days(i64::from(within_days)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let records = self.store.inventory_expiring_between(user_id, now, until)?;

        records
            .into_iter()
            .map(|record| {
                let item = match record.food_item_id {
                    Some(id) => self.catalog.find_food_item(id)?,
                    None => None,
                };
                Ok(ExpiringItem {
                    catalog_name: item.as_ref().map(|i| i.name.clone()),
                    category: item.map(|i| i.category),
                    record,
                })
            })
            .collect()
    }

    /// Count log entries by kind over the inclusive range `[start, end]`,
    /// with summed quantities for consumed and wasted entries.
    pub fn consumption_stats(
        &self,
        user_id: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> LedgerResult<ConsumptionStats> {
        if start > end {
            return Err(LedgerError::invalid_argument(
                "start date is after end date",
            ));
        }

        let mut stats = ConsumptionStats::default();
        for entry in self.store.entries_between(user_id, start, end)? {
            stats.total += 1;
            match entry.kind {
                LogKind::Purchased => stats.purchased += 1,
                LogKind::Consumed => {
                    stats.consumed += 1;
                    stats.consumed_quantity += entry.quantity;
                }
                LogKind::Wasted => {
                    stats.wasted += 1;
                    stats.wasted_quantity += entry.quantity;
                }
                LogKind::Donated => stats.donated += 1,
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_core::InventoryId;
    use larder_infra::InMemoryDatastore;
    use larder_inventory::ConsumptionLogEntry;

    fn service() -> (
        Arc<InMemoryDatastore>,
        QueryService<InMemoryDatastore, InMemoryDatastore>,
    ) {
        let store = InMemoryDatastore::arc();
        (store.clone(), QueryService::new(store.clone(), store))
    }

    fn lot(user_id: UserId, name: &str, expires_at: Option<DateTime<Utc>>) -> InventoryRecord {
        InventoryRecord {
            id: InventoryId::new(),
            user_id,
            food_item_id: None,
            name: name.to_string(),
            quantity: 1.0,
            unit: "unit".to_string(),
            purchased_at: None,
            expires_at,
            source_image: None,
            metadata: None,
            created_at: Utc::now(),
        }
    }

    fn seed_lots(store: &InMemoryDatastore, lots: Vec<InventoryRecord>) {
        store
            .run_transaction(&mut |tx| {
                for record in &lots {
                    tx.put_inventory(record.clone())?;
                }
                Ok(())
            })
            .unwrap();
    }

    fn seed_entries(store: &InMemoryDatastore, entries: Vec<ConsumptionLogEntry>) {
        store
            .run_transaction(&mut |tx| {
                for entry in &entries {
                    tx.append_entry(entry.clone())?;
                }
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn zero_day_window_only_returns_lots_expiring_today() {
        let (store, service) = service();
        let user_id = UserId::new();
        seed_lots(
            &store,
            vec![
                lot(user_id, "today", Some(Utc::now() + Duration::hours(1))),
                lot(user_id, "tomorrow", Some(Utc::now() + Duration::days(2))),
                lot(user_id, "undated", None),
            ],
        );

        let found = service.expiring_soon(user_id, 0).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].record.name, "today");
    }

    #[test]
    fn undated_lots_are_excluded_for_any_window() {
        let (store, service) = service();
        let user_id = UserId::new();
        seed_lots(&store, vec![lot(user_id, "undated", None)]);

        assert!(service.expiring_soon(user_id, 0).unwrap().is_empty());
        assert!(service.expiring_soon(user_id, 3650).unwrap().is_empty());
    }

    #[test]
    fn huge_window_saturates_instead_of_overflowing() {
        let (store, service) = service();
        let user_id = UserId::new();
        seed_lots(
            &store,
            vec![lot(user_id, "dated", Some(Utc::now() + Duration::days(30)))],
        );

        let found = service.expiring_soon(user_id, u32::MAX).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].record.name, "dated");
    }

    #[test]
    fn expiring_lots_come_back_earliest_first() {
        let (store, service) = service();
        let user_id = UserId::new();
        let now = Utc::now();
        seed_lots(
            &store,
            vec![
                lot(user_id, "later", Some(now + Duration::days(5))),
                lot(user_id, "soon", Some(now + Duration::days(1))),
                lot(user_id, "middle", Some(now + Duration::days(3))),
            ],
        );

        let names: Vec<String> = service
            .expiring_soon(user_id, 7)
            .unwrap()
            .into_iter()
            .map(|i| i.record.name)
            .collect();
        assert_eq!(names, vec!["soon", "middle", "later"]);
    }

    #[test]
    fn stats_over_an_empty_range_are_all_zero() {
        let (_, service) = service();
        let stats = service
            .consumption_stats(UserId::new(), Utc::now() - Duration::days(7), Utc::now())
            .unwrap();
        assert_eq!(stats, ConsumptionStats::default());
    }

    #[test]
    fn inverted_range_is_invalid() {
        let (_, service) = service();
        let err = service
            .consumption_stats(UserId::new(), Utc::now(), Utc::now() - Duration::days(1))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidArgument(_)));
    }

    #[test]
    fn stats_count_each_kind_and_sum_consumed_and_wasted() {
        let (store, service) = service();
        let user_id = UserId::new();
        let now = Utc::now();
        seed_entries(
            &store,
            vec![
                ConsumptionLogEntry::record(user_id, LogKind::Purchased, "milk", 2.0, None, now),
                ConsumptionLogEntry::record(user_id, LogKind::Consumed, "milk", 0.5, None, now),
                ConsumptionLogEntry::record(user_id, LogKind::Consumed, "milk", 0.25, None, now),
                ConsumptionLogEntry::record(
                    user_id,
                    LogKind::Wasted,
                    "milk",
                    0.1,
                    Some("spoiled".to_string()),
                    now,
                ),
                ConsumptionLogEntry::record(
                    user_id,
                    LogKind::Donated,
                    "beans",
                    1.0,
                    Some("food drive".to_string()),
                    now,
                ),
            ],
        );

        let stats = service
            .consumption_stats(user_id, now - Duration::hours(1), now + Duration::hours(1))
            .unwrap();
        assert_eq!(stats.purchased, 1);
        assert_eq!(stats.consumed, 2);
        assert_eq!(stats.wasted, 1);
        assert_eq!(stats.donated, 1);
        assert_eq!(stats.total, 5);
        assert!((stats.consumed_quantity - 0.75).abs() < 1e-9);
        assert!((stats.wasted_quantity - 0.1).abs() < 1e-9);
    }

    #[test]
    fn stats_range_bounds_are_inclusive() {
        let (store, service) = service();
        let user_id = UserId::new();
        let at = Utc::now();
        seed_entries(
            &store,
            vec![ConsumptionLogEntry::record(
                user_id,
                LogKind::Consumed,
                "milk",
                0.5,
                None,
                at,
            )],
        );

        let stats = service.consumption_stats(user_id, at, at).unwrap();
        assert_eq!(stats.consumed, 1);
        assert_eq!(stats.total, 1);
    }
}
