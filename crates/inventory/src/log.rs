use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use larder_core::{Entity, EntryId, UserId};

/// What a consumption-log entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogKind {
    Purchased,
    Consumed,
    Wasted,
    Donated,
}

/// One append-only audit entry.
///
/// Entries are immutable once created and are never updated or deleted by
/// the core. `food_name` is a snapshot taken at write time, so history
/// survives later renames or deletions of the lot or catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionLogEntry {
    pub id: EntryId,
    pub user_id: UserId,
    pub kind: LogKind,
    pub food_name: String,
    pub quantity: f64,
    /// Free-text reason; required for `Wasted`, optional otherwise.
    pub reason: Option<String>,
    pub logged_at: DateTime<Utc>,
}

impl ConsumptionLogEntry {
    pub fn record(
        user_id: UserId,
        kind: LogKind,
        food_name: impl Into<String>,
        quantity: f64,
        reason: Option<String>,
        logged_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EntryId::new(),
            user_id,
            kind,
            food_name: food_name.into(),
            quantity,
            reason,
            logged_at,
        }
    }
}

impl Entity for ConsumptionLogEntry {
    type Id = EntryId;

    fn id(&self) -> &EntryId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_kind_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&LogKind::Purchased).unwrap(),
            "\"PURCHASED\""
        );
        assert_eq!(
            serde_json::from_str::<LogKind>("\"WASTED\"").unwrap(),
            LogKind::Wasted
        );
    }
}
