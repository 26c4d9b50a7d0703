use serde::{Deserialize, Serialize};

use larder_core::{Entity, FoodItemId, LedgerResult};

/// A reference-catalog food item.
///
/// Inventory records hold at most a weak reference to a `FoodItem`: the
/// record also stores a denormalized display name, so it survives catalog
/// deletions. The ledger never writes to the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: FoodItemId,
    /// Unique name within the catalog.
    pub name: String,
    pub category: String,
    /// Days from purchase to assumed expiration, used when a lot is created
    /// without an explicit expiration.
    pub default_expiration_days: u32,
    /// Average cost per unit, in the deployment's currency.
    pub avg_unit_cost: f64,
    /// Unit label (e.g. "liter", "kg") applied to lots that omit one.
    pub unit: String,
}

impl Entity for FoodItem {
    type Id = FoodItemId;

    fn id(&self) -> &FoodItemId {
        &self.id
    }
}

/// Lookup contract for the reference catalog.
///
/// Implementations are free to back this with any store; `Ok(None)` means
/// the id is unknown (callers decide whether that is an error).
pub trait FoodCatalog: Send + Sync {
    fn find_food_item(&self, id: FoodItemId) -> LedgerResult<Option<FoodItem>>;
}
