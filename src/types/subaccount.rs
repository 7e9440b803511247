//! Subaccount identity.
//!
//! A subaccount is the unit of margining and settlement: every order, fill,
//! and balance update is attributed to exactly one `(owner, number)` pair.
//! Owners are account address strings; numbers select one of the owner's
//! isolated subaccounts.
//!
//! `SubaccountId` implements `Ord` over `(owner, number)` so that any
//! collection keyed or sorted by subaccount iterates in the same order on
//! every node.

use ssz_rs::prelude::*;

use crate::types::error::ClobError;

/// Maximum byte length of a subaccount owner address.
pub const MAX_OWNER_LENGTH: usize = 90;

/// Maximum valid subaccount number (exclusive).
pub const MAX_SUBACCOUNT_NUMBER: u32 = 128_000;

/// Identity of a subaccount: an owner address plus a subaccount number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubaccountId {
    /// Owner account address.
    pub owner: String,

    /// Subaccount number under the owner.
    pub number: u32,
}

/// Canonical SSZ form of a `SubaccountId`.
///
/// The owner string is carried as a variable-length byte list so the
/// encoding is independent of in-memory representation.
#[derive(Debug, Default, SimpleSerialize)]
pub(crate) struct SubaccountIdCanonical {
    pub owner: List<u8, MAX_OWNER_LENGTH>,
    pub number: u32,
}

impl SubaccountId {
    /// Create a new subaccount id.
    pub fn new(owner: impl Into<String>, number: u32) -> Self {
        Self {
            owner: owner.into(),
            number,
        }
    }

    /// Validate the subaccount id.
    ///
    /// The owner must be a non-empty address of at most [`MAX_OWNER_LENGTH`]
    /// bytes and the number must be below [`MAX_SUBACCOUNT_NUMBER`].
    pub fn validate(&self) -> Result<(), ClobError> {
        if self.owner.is_empty() || self.owner.len() > MAX_OWNER_LENGTH {
            return Err(ClobError::InvalidSubaccountIdOwner {
                owner: self.owner.clone(),
            });
        }
        if self.number >= MAX_SUBACCOUNT_NUMBER {
            return Err(ClobError::InvalidSubaccountIdNumber {
                number: self.number,
            });
        }
        Ok(())
    }

    /// Build the canonical SSZ form.
    ///
    /// # Panics
    ///
    /// Panics if the owner exceeds [`MAX_OWNER_LENGTH`] bytes. Callers are
    /// responsible for validating the id before hashing it.
    pub(crate) fn must_canonical(&self) -> SubaccountIdCanonical {
        let owner = List::<u8, MAX_OWNER_LENGTH>::try_from(self.owner.as_bytes().to_vec())
            .unwrap_or_else(|_| {
                panic!(
                    "must_canonical: owner {:?} exceeds {} bytes",
                    self.owner, MAX_OWNER_LENGTH
                )
            });
        SubaccountIdCanonical {
            owner,
            number: self.number,
        }
    }
}

impl std::fmt::Display for SubaccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.number)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
