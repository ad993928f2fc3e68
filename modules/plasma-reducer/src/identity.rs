//! User registry and address bindings.

use anyhow::Result;
use plasma_common::{Address, EntityKind, Handle, Timestamp, User};
use plasma_store::{EntityStore, EntityStoreExt};
use tracing::{debug, warn};

use crate::outcome::Recorded;

pub struct IdentityResolver<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: EntityStore + ?Sized> IdentityResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn ensure_user(
        &self,
        address: &Address,
        timestamp: Timestamp,
    ) -> Result<Recorded<User>> {
        if let Some(existing) = self
            .store
            .load_entity::<User>(EntityKind::User, address.as_str())
            .await?
        {
            return Ok(Recorded::Existing(existing));
        }

        let user = User::new(address, timestamp);
        self.store.save_entity(&user).await?;
        debug!(user = %address, "User created");
        Ok(Recorded::Created(user))
    }

    /// Overwrite the user's handle. Always writes, even when unchanged.
    pub async fn bind_handle(
        &self,
        address: &Address,
        handle: &Handle,
    ) -> Result<Option<User>> {
        let updated = self
            .store
            .apply_delta::<User, _>(EntityKind::User, address.as_str(), |u| {
                u.handle = Some(handle.clone())
            })
            .await?;

        if updated.is_none() {
            warn!(user = %address, "User missing, handle binding ignored");
        }
        Ok(updated)
    }

    /// Overwrite the user's external (Ethereum) address. Last write wins.
    pub async fn bind_external_address(
        &self,
        address: &Address,
        external: &Address,
    ) -> Result<Option<User>> {
        let updated = self
            .store
            .apply_delta::<User, _>(EntityKind::User, address.as_str(), |u| {
                u.bound_address = Some(external.clone())
            })
            .await?;

        if updated.is_none() {
            warn!(user = %address, "User missing, address binding ignored");
        }
        Ok(updated)
    }
}
