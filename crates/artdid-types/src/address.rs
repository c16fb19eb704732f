use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Number of hex digits in a ledger account address (20 bytes).
const ADDRESS_HEX_LEN: usize = 40;

/// Prefix used for content addresses derived locally with BLAKE3.
const BLAKE3_PREFIX: &str = "b3";

/// Content-addressed identifier for a stored metadata blob.
///
/// Content addresses are assigned by the content store and treated as
/// opaque strings everywhere else. Identical bytes always map to the same
/// address, which is what makes stored metadata immutable.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentAddress(String);

impl ContentAddress {
    /// Wrap an address reported by a content store.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Derive an address from raw bytes using BLAKE3.
    pub fn derive(data: &[u8]) -> Self {
        Self(format!("{BLAKE3_PREFIX}{}", blake3::hash(data).to_hex()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentAddress({})", self.0)
    }
}

impl fmt::Display for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentAddress {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Ledger account address.
///
/// Addresses reported by the ledger are kept verbatim. Addresses supplied
/// by users go through [`Address::parse`], which enforces the `0x` + 40 hex
/// digit shape. Ledger accounts are case-insensitive, so comparisons
/// between addresses should use [`Address::same_as`].
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wrap an address reported by the ledger without validation.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// The empty address, reported when a record has no owner.
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Parse a user-supplied address, enforcing `0x` followed by 40 hex digits.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let digits = s
            .strip_prefix("0x")
            .ok_or_else(|| TypeError::InvalidAddress(format!("missing 0x prefix: {s}")))?;
        if digits.len() != ADDRESS_HEX_LEN {
            return Err(TypeError::InvalidAddress(format!(
                "expected {ADDRESS_HEX_LEN} hex digits, got {}",
                digits.len()
            )));
        }
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidAddress(format!("non-hex digit in {s}")));
        }
        Ok(Self(s.to_string()))
    }

    /// Returns `true` if `s` is a well-formed user-supplied address.
    pub fn is_valid(s: &str) -> bool {
        Self::parse(s).is_ok()
    }

    /// Case-insensitive comparison.
    pub fn same_as(&self, other: &Address) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ledger-assigned record identifier. Opaque to everything but the ledger.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive a `0x`-prefixed 32-byte record id from a seed.
    ///
    /// Ledgers that assign ids from a hash of the registration inputs use
    /// this shape; callers must still take the id from the ledger's
    /// confirmation rather than recomputing it.
    pub fn derive(seed: &[u8]) -> Self {
        Self(format!("0x{}", hex::encode(blake3::hash(seed).as_bytes())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ledger transaction identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(String);

impl TxId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
