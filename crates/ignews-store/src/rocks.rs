//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `UserStore` trait.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use rocksdb::{BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, MultiThreaded, Options, WriteBatch};

use ignews_core::{CustomerId, Email, UserData, UserRecord, UserRef};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::UserStore;

/// RocksDB-backed user store.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Insert or replace a user record, maintaining the email index.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if another record already uses the same
    /// case-folded email.
    pub fn insert_user(&self, reference: &UserRef, data: &UserData) -> Result<()> {
        let cf_users = self.cf(cf::USERS)?;
        let cf_index = self.cf(cf::USERS_BY_EMAIL)?;

        let new_key = data.email.as_deref().map(str::to_lowercase);

        if let Some(key) = &new_key {
            if let Some(owner) = self.index_lookup(key)? {
                if owner != *reference {
                    return Err(StoreError::Conflict(format!("email already indexed: {key}")));
                }
            }
        }

        let mut batch = WriteBatch::default();

        // Drop the old index entry when the email changed.
        if let Some(previous) = self.get_user(reference)? {
            if let Some(old_key) = previous.index_key() {
                if new_key.as_deref() != Some(old_key.as_str()) {
                    batch.delete_cf(&cf_index, keys::email_index_key(&old_key));
                }
            }
        }

        if let Some(key) = &new_key {
            batch.put_cf(&cf_index, keys::email_index_key(key), keys::user_key(reference));
        }
        batch.put_cf(&cf_users, keys::user_key(reference), Self::serialize(data)?);

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    /// Get a user record by reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_user(&self, reference: &UserRef) -> Result<Option<UserRecord>> {
        let cf = self.cf(cf::USERS)?;

        self.db
            .get_cf(&cf, keys::user_key(reference))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|bytes| Self::deserialize(&bytes).map(|data| UserRecord::new(reference.clone(), data)))
            .transpose()
    }

    fn index_lookup(&self, casefolded: &str) -> Result<Option<UserRef>> {
        let cf = self.cf(cf::USERS_BY_EMAIL)?;

        let Some(value) = self
            .db
            .get_cf(&cf, keys::email_index_key(casefolded))
            .map_err(|e| StoreError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        keys::decode_user_ref(&value)
            .map(Some)
            .ok_or_else(|| StoreError::Serialization("corrupt email index entry".into()))
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl UserStore for RocksStore {
    async fn find_by_email(&self, email: &Email) -> Result<UserRecord> {
        let key = email.casefolded();

        let reference = self
            .index_lookup(&key)?
            .ok_or_else(|| StoreError::user_not_found(key.as_str()))?;

        self.get_user(&reference)?.ok_or_else(|| {
            tracing::warn!(user_ref = %reference, "Email index points at a missing user");
            StoreError::user_not_found(key)
        })
    }

    async fn set_stripe_customer_id(
        &self,
        user: &UserRef,
        customer_id: &CustomerId,
    ) -> Result<()> {
        let cf = self.cf(cf::USERS)?;

        let mut record = self
            .get_user(user)?
            .ok_or_else(|| StoreError::user_not_found(user.as_str()))?;
        record.data.stripe_customer_id = Some(customer_id.as_str().to_string());

        self.db
            .put_cf(&cf, keys::user_key(user), Self::serialize(&record.data)?)
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}
