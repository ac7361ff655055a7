//! Unique identifier types for exchange entities
//!
//! Participants use UUID v7 for time-sortable ordering; markets use the
//! engine's monotone counter; orders are addressed by a digest of their
//! stable book position so the same `(market, tick, index)` triple always
//! yields the same id.

use crate::numeric::Price;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a participant account
///
/// Uses UUID v7 for time-based sorting.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ParticipantId(Uuid);

impl ParticipantId {
    /// Create a new ParticipantId with current timestamp
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create from existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Market identifier
///
/// Markets are numbered monotonically from 0 in creation order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MarketId(u64);

impl MarketId {
    /// Create a MarketId from its index
    pub fn new(index: u64) -> Self {
        Self(index)
    }

    /// Get the market index
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a resting order
///
/// SHA-256 digest over the `(market, tick, index)` triple, where `tick` is
/// the internal storage tick (asks are stored at the complement of their
/// quoted price) and `index` is the order's position in the level's FIFO.
/// The triple is stable for the lifetime of the book, so the id can be
/// recomputed at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderId([u8; 32]);

impl OrderId {
    /// Domain tag mixed into every digest
    const DOMAIN: &'static [u8] = b"exchange.order-id.v1";

    /// Derive the id for the order at `(market, tick, index)`
    pub fn derive(market: MarketId, tick: Price, index: usize) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(Self::DOMAIN);
        hasher.update(market.get().to_le_bytes());
        hasher.update(tick.get().to_le_bytes());
        hasher.update((index as u64).to_le_bytes());
        Self(hasher.finalize().into())
    }

    /// Get the raw digest bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

// Custom serialization as a hex string
impl Serialize for OrderId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for OrderId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s.len() != 64 {
            return Err(serde::de::Error::custom("order id must be 64 hex chars"));
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            let hi = (chunk[0] as char)
                .to_digit(16)
                .ok_or_else(|| serde::de::Error::custom("invalid hex in order id"))?;
            let lo = (chunk[1] as char)
                .to_digit(16)
                .ok_or_else(|| serde::de::Error::custom("invalid hex in order id"))?;
            bytes[i] = ((hi << 4) | lo) as u8;
        }
        Ok(Self(bytes))
    }
}
