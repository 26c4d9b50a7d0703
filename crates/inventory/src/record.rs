use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use larder_core::{Entity, FoodItemId, InventoryId, LedgerError, LedgerResult, UserId};

/// One lot of inventory owned by a single user.
///
/// A lot is one purchase event's worth of stock. Lots with the same display
/// name are never merged, so each can expire on its own schedule. Quantity is
/// never negative; a lot that reaches zero stays queryable until explicitly
/// removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: InventoryId,
    pub user_id: UserId,
    /// Weak reference into the catalog; the lot outlives catalog deletions
    /// because `name` is denormalized here.
    pub food_item_id: Option<FoodItemId>,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub purchased_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    /// Reference to the image the lot was ingested from, if any.
    pub source_image: Option<String>,
    /// Open-ended metadata bag carried through unmodified.
    pub metadata: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
}

impl InventoryRecord {
    /// Deduct `amount` from the lot.
    ///
    /// Callers validate `amount > 0` up front; this enforces the remaining
    /// invariant that quantity never goes negative.
    pub fn deduct(&mut self, amount: f64) -> LedgerResult<()> {
        if amount > self.quantity {
            return Err(LedgerError::insufficient(amount, self.quantity));
        }
        self.quantity -= amount;
        Ok(())
    }

    pub fn owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

impl Entity for InventoryRecord {
    type Id = InventoryId;

    fn id(&self) -> &InventoryId {
        &self.id
    }
}

/// Validated input for creating a new lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPurchase {
    pub name: String,
    pub quantity: f64,
    /// May be omitted when `food_item_id` is set; the catalog item's unit is
    /// used instead.
    pub unit: Option<String>,
    pub food_item_id: Option<FoodItemId>,
    pub purchased_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub source_image: Option<String>,
    pub metadata: Option<JsonValue>,
}

impl NewPurchase {
    /// Fail-fast validation, run before any transaction opens.
    pub fn validate(&self) -> LedgerResult<()> {
        if self.name.trim().is_empty() {
            return Err(LedgerError::invalid_argument("purchase name is required"));
        }
        ensure_positive_amount(self.quantity)?;
        if self.unit.as_ref().is_none_or(|u| u.trim().is_empty()) && self.food_item_id.is_none() {
            return Err(LedgerError::invalid_argument(
                "unit is required when no catalog item is linked",
            ));
        }
        Ok(())
    }
}

/// Shared amount check for consume/waste/purchase quantities.
pub fn ensure_positive_amount(amount: f64) -> LedgerResult<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(LedgerError::invalid_argument(format!(
            "amount must be a positive number, got {amount}"
        )));
    }
    Ok(())
}
