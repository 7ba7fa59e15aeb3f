//! In-memory storage implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use ignews_core::{CustomerId, Email, UserData, UserRecord, UserRef};

use crate::error::{Result, StoreError};
use crate::UserStore;

/// Map-backed user store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<UserRef, UserData>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if another record already uses the same
    /// case-folded email.
    pub fn insert_user(&self, reference: UserRef, data: UserData) -> Result<()> {
        let mut users = self.write()?;

        if let Some(key) = data.email.as_deref().map(str::to_lowercase) {
            let taken = users.iter().any(|(other, existing)| {
                *other != reference
                    && existing.email.as_deref().map(str::to_lowercase).as_deref() == Some(&key)
            });
            if taken {
                return Err(StoreError::Conflict(format!("email already indexed: {key}")));
            }
        }

        users.insert(reference, data);
        Ok(())
    }

    /// Get a user record by reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn get_user(&self, reference: &UserRef) -> Result<Option<UserRecord>> {
        Ok(self
            .read()?
            .get(reference)
            .map(|data| UserRecord::new(reference.clone(), data.clone())))
    }

    /// Number of stored users.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    /// Whether the store is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<UserRef, UserData>>> {
        self.users
            .read()
            .map_err(|_| StoreError::Database("user map lock poisoned".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<UserRef, UserData>>> {
        self.users
            .write()
            .map_err(|_| StoreError::Database("user map lock poisoned".into()))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &Email) -> Result<UserRecord> {
        let key = email.casefolded();
        let users = self.read()?;

        let mut matches = users
            .iter()
            .filter(|(_, data)| data.email.as_deref().map(str::to_lowercase).as_deref() == Some(&key))
            .map(|(reference, data)| UserRecord::new(reference.clone(), data.clone()));

        match (matches.next(), matches.next()) {
            (Some(user), None) => Ok(user),
            (None, _) => Err(StoreError::user_not_found(key)),
            (Some(_), Some(_)) => Err(StoreError::Ambiguous {
                count: 2 + matches.count(),
                key,
            }),
        }
    }

    async fn set_stripe_customer_id(
        &self,
        user: &UserRef,
        customer_id: &CustomerId,
    ) -> Result<()> {
        let mut users = self.write()?;
        let data = users
            .get_mut(user)
            .ok_or_else(|| StoreError::user_not_found(user.as_str()))?;

        data.stripe_customer_id = Some(customer_id.as_str().to_string());
        Ok(())
    }
}
