//! Key encoding utilities for `RocksDB`.

use ignews_core::{Email, UserRef};

/// Create a user key from a reference id.
#[must_use]
pub fn user_key(reference: &UserRef) -> Vec<u8> {
    reference.as_str().as_bytes().to_vec()
}

/// Create an email index key from an already case-folded email.
#[must_use]
pub fn email_index_key(casefolded: &str) -> Vec<u8> {
    casefolded.as_bytes().to_vec()
}

/// Create the email index key for a lookup.
#[must_use]
pub fn email_lookup_key(email: &Email) -> Vec<u8> {
    email_index_key(&email.casefolded())
}

/// Decode a reference id stored as an index value.
#[must_use]
pub fn decode_user_ref(value: &[u8]) -> Option<UserRef> {
    std::str::from_utf8(value)
        .ok()
        .and_then(|s| UserRef::new(s).ok())
}
