//! Identifier types for ig.news.
//!
//! This module provides strongly-typed identifiers for users, their email
//! addresses and their billing customers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

use crate::error::CoreError;

/// A validated email address.
///
/// The original spelling is preserved (it is what the payments provider sees);
/// user lookups go through [`Email::casefolded`].
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Parse and validate an email address.
    ///
    /// Surrounding whitespace is trimmed. The address must have a non-empty
    /// local part and a non-empty domain separated by a single `@`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidEmail` if the address is malformed.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        let trimmed = value.trim();
        let mut parts = trimmed.split('@');

        match (parts.next(), parts.next(), parts.next()) {
            (Some(local), Some(domain), None)
                if !local.is_empty()
                    && !domain.is_empty()
                    && !trimmed.chars().any(char::is_whitespace) =>
            {
                Ok(Self(trimmed.to_string()))
            }
            _ => Err(CoreError::InvalidEmail(value.to_string())),
        }
    }

    /// The address as given.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The case-folded address used as the user index key.
    #[must_use]
    pub fn casefolded(&self) -> String {
        self.0.to_lowercase()
    }
}

impl FromStr for Email {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Email({})", self.0)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

/// Opaque reference id of a user record in the document store.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserRef(String);

impl UserRef {
    /// Wrap an existing reference id.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::EmptyId` if the id is empty.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.is_empty() {
            return Err(CoreError::EmptyId { kind: "user ref" });
        }
        Ok(Self(id))
    }

    /// Generate a fresh reference id (for embedded backends).
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    /// The raw reference id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UserRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserRef({})", self.0)
    }
}

impl fmt::Display for UserRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserRef {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserRef> for String {
    fn from(id: UserRef) -> Self {
        id.0
    }
}

/// Billing-customer identifier issued by the payments provider (`cus_...`).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CustomerId(String);

impl CustomerId {
    /// Wrap a customer id returned by the payments provider.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::EmptyId` if the id is empty.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.is_empty() {
            return Err(CoreError::EmptyId { kind: "customer" });
        }
        Ok(Self(id))
    }

    /// The raw customer id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CustomerId({})", self.0)
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CustomerId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CustomerId> for String {
    fn from(id: CustomerId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_parse_trims_and_keeps_case() {
        let email = Email::parse("  Alice@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "Alice@Example.COM");
        assert_eq!(email.casefolded(), "alice@example.com");
    }

    #[test]
    fn email_parse_rejects_malformed() {
        for bad in ["", "   ", "alice", "@example.com", "alice@", "a@b@c", "a b@c.com"] {
            assert!(Email::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn email_serde_validates() {
        let email: Email = serde_json::from_str("\"b@x.com\"").unwrap();
        assert_eq!(email.as_str(), "b@x.com");
        assert!(serde_json::from_str::<Email>("\"nope\"").is_err());
    }

    #[test]
    fn user_ref_rejects_empty() {
        assert_eq!(
            UserRef::new(""),
            Err(CoreError::EmptyId { kind: "user ref" })
        );
        assert_eq!(UserRef::new("u1").unwrap().as_str(), "u1");
    }

    #[test]
    fn generated_user_refs_are_unique() {
        assert_ne!(UserRef::generate(), UserRef::generate());
    }

    #[test]
    fn customer_id_display() {
        let id = CustomerId::new("cus_1").unwrap();
        assert_eq!(id.to_string(), "cus_1");
        assert_eq!(format!("{id:?}"), "CustomerId(cus_1)");
        assert!(CustomerId::new(String::new()).is_err());
    }
}
