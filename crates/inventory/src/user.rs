use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use larder_core::{Entity, LedgerError, LedgerResult, UserId};

/// A user account.
///
/// The core only needs identity and profile fields; authentication lives
/// outside. Users are never hard-deleted here — deletion cascades are an
/// external policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Number of people in the household, at least 1.
    pub household_size: u32,
    pub dietary_preferences: Vec<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn validate(&self) -> LedgerResult<()> {
        if self.household_size < 1 {
            return Err(LedgerError::invalid_argument(
                "household size must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &UserId {
        &self.id
    }
}

/// Registration input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub household_size: u32,
    pub dietary_preferences: Vec<String>,
    pub location: Option<String>,
}

impl NewUser {
    pub fn into_user(self, now: DateTime<Utc>) -> LedgerResult<User> {
        let user = User {
            id: UserId::new(),
            household_size: self.household_size,
            dietary_preferences: self.dietary_preferences,
            location: self.location,
            created_at: now,
        };
        user.validate()?;
        Ok(user)
    }
}

/// Partial profile edit; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub household_size: Option<u32>,
    pub dietary_preferences: Option<Vec<String>>,
    pub location: Option<String>,
}

impl ProfileUpdate {
    pub fn apply(self, user: &mut User) -> LedgerResult<()> {
        if let Some(size) = self.household_size {
            user.household_size = size;
        }
        if let Some(prefs) = self.dietary_preferences {
            user.dietary_preferences = prefs;
        }
        if let Some(location) = self.location {
            user.location = Some(location);
        }
        user.validate()
    }
}
