//! Affinity collaborator
//!
//! Maps a key of a table to the partition that owns it. Used identically for
//! literal keys at compile time and bound arguments at execution time.

use std::num::NonZeroU32;

use serde_json::Value;

use crate::errors::AffinityError;
use crate::partition::{PartitionId, PartitionTableDescriptor};

/// Key to partition mapping.
///
/// Implementations must be pure for a given topology and safe to call from
/// many threads at once.
pub trait AffinityFunction: Send + Sync {
    /// Partition owning `key` in `table`
    fn partition(
        &self,
        table: &PartitionTableDescriptor,
        key: &Value,
    ) -> Result<PartitionId, AffinityError>;

    /// Total partition count of `table`, when known
    fn partitions(&self, _table: &PartitionTableDescriptor) -> Option<u32> {
        None
    }
}

/// CRC32 of a canonical key encoding, modulo a fixed partition count
#[derive(Debug, Clone, Copy)]
pub struct HashAffinity {
    partitions: NonZeroU32,
}

impl HashAffinity {
    /// Creates an affinity function over `partitions` partitions
    pub fn new(partitions: NonZeroU32) -> Self {
        Self { partitions }
    }

    fn encode(key: &Value) -> Result<Vec<u8>, AffinityError> {
        let mut buf = Vec::with_capacity(16);
        match key {
            Value::Bool(b) => {
                buf.push(1);
                buf.push(u8::from(*b));
            }
            Value::Number(n) => {
                if let Some(v) = n.as_i64() {
                    buf.push(2);
                    buf.extend_from_slice(&v.to_le_bytes());
                } else if let Some(v) = n.as_u64() {
                    buf.push(3);
                    buf.extend_from_slice(&v.to_le_bytes());
                } else {
                    let v = n
                        .as_f64()
                        .ok_or_else(|| AffinityError::UnsupportedKey(n.to_string()))?;
                    buf.push(4);
                    buf.extend_from_slice(&v.to_bits().to_le_bytes());
                }
            }
            Value::String(s) => {
                buf.push(5);
                buf.extend_from_slice(s.as_bytes());
            }
            Value::Null | Value::Array(_) | Value::Object(_) => {
                return Err(AffinityError::UnsupportedKey(key.to_string()));
            }
        }
        Ok(buf)
    }
}

impl AffinityFunction for HashAffinity {
    fn partition(
        &self,
        _table: &PartitionTableDescriptor,
        key: &Value,
    ) -> Result<PartitionId, AffinityError> {
        let bytes = Self::encode(key)?;
        Ok(crc32fast::hash(&bytes) % self.partitions.get())
    }

    fn partitions(&self, _table: &PartitionTableDescriptor) -> Option<u32> {
        Some(self.partitions.get())
    }
}
