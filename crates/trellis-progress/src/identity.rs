//! Current-learner identity: guest default, login/logout, one persisted slot.

use serde::{Deserialize, Serialize};
use trellis_storage::{KeyValueStorage, StorageError};

/// Fixed storage slot for the current identity record.
pub const IDENTITY_STORAGE_KEY: &str = "trellis-current-user";

const GUEST_ID: &str = "guest";

/// A learner identity. Progress snapshots are namespaced by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
}

impl Identity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// The default identity used when nobody is logged in.
    pub fn guest() -> Self {
        Self::new(GUEST_ID, "Guest")
    }

    /// Mint an ad-hoc local identity with a random id.
    pub fn local(name: impl Into<String>) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), name)
    }

    pub fn is_guest(&self) -> bool {
        self.id == GUEST_ID
    }
}

/// Tracks the current identity and its persisted record.
///
/// The record lives under [`IDENTITY_STORAGE_KEY`]: absent means guest, and
/// a record that fails to parse is cleared so the failure does not repeat
/// on the next load.
#[derive(Debug, Clone)]
pub struct IdentityProvider {
    current: Identity,
}

impl IdentityProvider {
    /// Restore the current identity from storage.
    pub fn load(storage: &mut impl KeyValueStorage) -> Result<Self, StorageError> {
        let current = match storage.get(IDENTITY_STORAGE_KEY)? {
            Some(raw) => match serde_json::from_str::<Identity>(&raw) {
                Ok(identity) => identity,
                Err(_) => {
                    storage.remove(IDENTITY_STORAGE_KEY)?;
                    Identity::guest()
                }
            },
            None => Identity::guest(),
        };
        Ok(Self { current })
    }

    pub fn current(&self) -> &Identity {
        &self.current
    }

    /// Make `identity` current and persist it.
    ///
    /// The in-memory identity changes even when the persistence write
    /// fails; the error still propagates.
    pub fn login(
        &mut self,
        identity: Identity,
        storage: &mut impl KeyValueStorage,
    ) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&identity).expect("identity record must serialize");
        self.current = identity;
        storage.set(IDENTITY_STORAGE_KEY, &raw)
    }

    /// Clear the persisted record and return to guest.
    pub fn logout(&mut self, storage: &mut impl KeyValueStorage) -> Result<(), StorageError> {
        self.current = Identity::guest();
        storage.remove(IDENTITY_STORAGE_KEY)
    }
}
