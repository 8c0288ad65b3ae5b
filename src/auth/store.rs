// Credential storage

use anyhow::{anyhow, Result};
use std::sync::RwLock;

use super::types::{CredentialPair, StoredCredentials};

/// Shared slot holding the credential pair
///
/// Implementations must make `set` and `clear` affect both tokens together.
pub trait CredentialStore: Send + Sync {
    /// Read both slots
    fn get(&self) -> Result<StoredCredentials>;

    /// Overwrite both slots
    fn set(&self, pair: &CredentialPair) -> Result<()>;

    /// Remove both slots
    fn clear(&self) -> Result<()>;
}

/// Process-local credential store
#[derive(Default)]
pub struct MemoryCredentialStore {
    slot: RwLock<StoredCredentials>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding a pair
    pub fn with_pair(pair: CredentialPair) -> Self {
        Self {
            slot: RwLock::new(pair.into()),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Result<StoredCredentials> {
        let slot = self
            .slot
            .read()
            .map_err(|_| anyhow!("Credential store lock poisoned"))?;
        Ok(slot.clone())
    }

    fn set(&self, pair: &CredentialPair) -> Result<()> {
        let mut slot = self
            .slot
            .write()
            .map_err(|_| anyhow!("Credential store lock poisoned"))?;
        *slot = pair.clone().into();
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self
            .slot
            .write()
            .map_err(|_| anyhow!("Credential store lock poisoned"))?;
        *slot = StoredCredentials::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_store() {
        let store = MemoryCredentialStore::new();
        assert!(store.get().unwrap().is_empty());
    }

    #[test]
    fn test_set_then_clear() {
        let store = MemoryCredentialStore::new();
        store.set(&CredentialPair::new("A1", "R1")).unwrap();
        assert_eq!(
            store.get().unwrap(),
            StoredCredentials {
                access_token: Some("A1".to_string()),
                refresh_token: Some("R1".to_string()),
            }
        );

        store.clear().unwrap();
        assert!(store.get().unwrap().is_empty());
    }

    proptest! {
        // Last writer wins and the two slots never mix pairs
        #[test]
        fn test_last_pair_wins(pairs in proptest::collection::vec(("[a-z0-9]{1,12}", "[a-z0-9]{1,12}"), 1..8)) {
            let store = MemoryCredentialStore::new();
            for (access, refresh) in &pairs {
                store.set(&CredentialPair::new(access.clone(), refresh.clone())).unwrap();
            }
            let (access, refresh) = pairs.last().unwrap();
            let stored = store.get().unwrap();
            prop_assert_eq!(stored.access_token.as_deref(), Some(access.as_str()));
            prop_assert_eq!(stored.refresh_token.as_deref(), Some(refresh.as_str()));
        }
    }
}
