//! Ledger operations: consume, waste, purchase.
//!
//! ## Execution shape
//!
//! Every operation follows the same pipeline:
//!
//! 1. Validate input (fail fast, before any transaction opens)
//! 2. Resolve reference data through the catalog where needed
//! 3. Run one unit-of-work transaction: read the record, apply the
//!    mutation, stage the record write and the log append
//! 4. Return the updated record and the created entry
//!
//! Errors raised inside the transaction abort it entirely; the store
//! guarantees no partial effect. Nothing is retried here — callers decide
//! what to do with `Timeout` or `Unavailable`.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use larder_catalog::FoodCatalog;
use larder_core::{InventoryId, LedgerError, LedgerResult, UserId};
use larder_infra::Datastore;
use larder_inventory::{
    ConsumptionLogEntry, InventoryRecord, LogKind, NewPurchase, ensure_positive_amount,
};

/// The inventory ledger.
///
/// Composes the datastore and catalog contracts; holds no state of its own
/// and performs no IO outside the injected collaborators, so it is testable
/// against in-memory implementations and safe to share across threads.
pub struct Ledger<S, C> {
    pub(crate) store: Arc<S>,
    catalog: Arc<C>,
}

impl<S, C> Ledger<S, C>
where
    S: Datastore,
    C: FoodCatalog,
{
    pub fn new(store: Arc<S>, catalog: Arc<C>) -> Self {
        Self { store, catalog }
    }

    /// Consume `amount` from a lot.
    ///
    /// Decrements the lot and appends a `CONSUMED` entry atomically. The
    /// entry's name snapshot is taken from the record inside the
    /// transaction, so it reflects the lot at the moment of the call.
    pub fn consume(
        &self,
        inventory_id: InventoryId,
        user_id: UserId,
        amount: f64,
        reason: Option<&str>,
    ) -> LedgerResult<(InventoryRecord, ConsumptionLogEntry)> {
        ensure_positive_amount(amount)?;
        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        let out = self.deduct(inventory_id, user_id, amount, LogKind::Consumed, reason)?;
        tracing::info!(%inventory_id, %user_id, amount, "consumed from lot");
        Ok(out)
    }

    /// Discard `amount` from a lot as waste.
    ///
    /// Same contract as [`Ledger::consume`] except the entry kind is
    /// `WASTED` and a non-empty reason is required.
    pub fn waste(
        &self,
        inventory_id: InventoryId,
        user_id: UserId,
        amount: f64,
        reason: &str,
    ) -> LedgerResult<(InventoryRecord, ConsumptionLogEntry)> {
        ensure_positive_amount(amount)?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(LedgerError::invalid_argument(
                "wasting inventory requires a reason",
            ));
        }
        let out = self.deduct(
            inventory_id,
            user_id,
            amount,
            LogKind::Wasted,
            Some(reason.to_string()),
        )?;
        tracing::info!(%inventory_id, %user_id, amount, reason, "wasted from lot");
        Ok(out)
    }

    /// Record a purchase as a brand-new lot.
    ///
    /// Never merges with an existing lot of the same name: lots track their
    /// own expiration, so each purchase stays independent. When the input
    /// links a catalog item, the item must exist and supplies defaults for
    /// a missing unit and expiration.
    pub fn purchase(
        &self,
        user_id: UserId,
        input: NewPurchase,
    ) -> LedgerResult<(InventoryRecord, ConsumptionLogEntry)> {
        input.validate()?;

        let item = match input.food_item_id {
            Some(id) => Some(self.catalog.find_food_item(id)?.ok_or_else(|| {
                LedgerError::not_found(format!("food item {id}"))
            })?),
            None => None,
        };

        let unit = input
            .unit
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .or_else(|| item.as_ref().map(|i| i.unit.clone()))
            .ok_or_else(|| {
                LedgerError::invalid_argument("unit is required when no catalog item is linked")
            })?;

        let now = Utc::now();
        let purchased_at = input.purchased_at.unwrap_or(now);
        let expires_at = input.expires_at.or_else(|| {
            item.as_ref().map(|i| {
                // Saturate on an absurd catalog offset instead of overflowing.
                purchased_at
                    .checked_add_signed(Duration::days(i64::from(i.default_expiration_days)))
                    .unwrap_or(DateTime::<Utc>::MAX_UTC)
            })
        });

        let record = InventoryRecord {
            id: InventoryId::new(),
            user_id,
            food_item_id: input.food_item_id,
            name: input.name.trim().to_string(),
            quantity: input.quantity,
            unit,
            purchased_at: Some(purchased_at),
            expires_at,
            source_image: input.source_image,
            metadata: input.metadata,
            created_at: now,
        };
        let entry = ConsumptionLogEntry::record(
            user_id,
            LogKind::Purchased,
            record.name.clone(),
            input.quantity,
            None,
            now,
        );

        self.store.run_transaction(&mut |tx| {
            tx.put_inventory(record.clone())?;
            tx.append_entry(entry.clone())?;
            Ok(())
        })?;

        tracing::info!(
            inventory_id = %record.id,
            %user_id,
            quantity = input.quantity,
            "purchased new lot"
        );
        Ok((record, entry))
    }

    /// Shared read-modify-write path for consume and waste.
    fn deduct(
        &self,
        inventory_id: InventoryId,
        user_id: UserId,
        amount: f64,
        kind: LogKind,
        reason: Option<String>,
    ) -> LedgerResult<(InventoryRecord, ConsumptionLogEntry)> {
        let mut out = None;
        self.store.run_transaction(&mut |tx| {
            let mut record = tx.find_inventory(inventory_id)?.ok_or_else(|| {
                LedgerError::not_found(format!("inventory record {inventory_id}"))
            })?;
            if !record.owned_by(user_id) {
                return Err(LedgerError::Forbidden);
            }
            record.deduct(amount)?;

            let entry = ConsumptionLogEntry::record(
                user_id,
                kind,
                record.name.clone(),
                amount,
                reason.clone(),
                Utc::now(),
            );
            tx.put_inventory(record.clone())?;
            tx.append_entry(entry.clone())?;
            out = Some((record, entry));
            Ok(())
        })?;
        out.ok_or_else(|| LedgerError::unavailable("transaction committed without a result"))
    }
}
