//! User record types.
//!
//! User records are owned by the document store. This service only ever reads
//! them and fills in `stripe_customer_id` when it is missing.

use serde::{Deserialize, Serialize};

use crate::{CustomerId, Email, UserRef};

/// The `data` document of a user record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    /// Email the user signed in with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Billing-customer id at the payments provider, once provisioned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stripe_customer_id: Option<String>,

    /// Any other fields the store keeps on the document.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserData {
    /// Create the data document for a freshly signed-up user.
    #[must_use]
    pub fn for_email(email: &Email) -> Self {
        Self {
            email: Some(email.as_str().to_string()),
            ..Self::default()
        }
    }
}

/// A user record: reference id plus data document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Reference id of the record.
    #[serde(rename = "ref")]
    pub reference: UserRef,

    /// The record's data document.
    pub data: UserData,
}

impl UserRecord {
    /// Create a user record.
    #[must_use]
    pub fn new(reference: UserRef, data: UserData) -> Self {
        Self { reference, data }
    }

    /// The stored billing-customer id, if any.
    ///
    /// An empty string counts as absent.
    #[must_use]
    pub fn stripe_customer_id(&self) -> Option<CustomerId> {
        self.data
            .stripe_customer_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .and_then(|id| CustomerId::new(id).ok())
    }

    /// The case-folded email this record is indexed under, if it has one.
    #[must_use]
    pub fn index_key(&self) -> Option<String> {
        self.data.email.as_deref().map(str::to_lowercase)
    }
}
