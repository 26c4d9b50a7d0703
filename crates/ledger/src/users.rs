//! User account lifecycle: registration and profile edits.
//!
//! These touch only the users record set — never inventory or the log — so
//! they need no multi-document transaction.

use larder_catalog::FoodCatalog;
use larder_core::{LedgerError, LedgerResult, UserId};
use larder_infra::Datastore;
use larder_inventory::{NewUser, ProfileUpdate, User};

use crate::Ledger;

impl<S, C> Ledger<S, C>
where
    S: Datastore,
    C: FoodCatalog,
{
    /// Register a new user account.
    pub fn register_user(&self, input: NewUser) -> LedgerResult<User> {
        let user = input.into_user(chrono::Utc::now())?;
        self.store.put_user(user.clone())?;
        tracing::info!(user_id = %user.id, "registered user");
        Ok(user)
    }

    /// Apply a partial profile edit to an existing user.
    pub fn update_profile(&self, user_id: UserId, changes: ProfileUpdate) -> LedgerResult<User> {
        let mut user = self
            .store
            .find_user(user_id)?
            .ok_or_else(|| LedgerError::not_found(format!("user {user_id}")))?;
        changes.apply(&mut user)?;
        self.store.put_user(user.clone())?;
        tracing::debug!(%user_id, "updated profile");
        Ok(user)
    }
}
