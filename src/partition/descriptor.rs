//! Table descriptor identifying a partition space

use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical identity of the partitioned data set a tree refers to.
///
/// Two trees can only be combined when their descriptors are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartitionTableDescriptor {
    pub cache_name: String,
    pub table_name: String,
}

impl PartitionTableDescriptor {
    /// Creates a descriptor
    pub fn new(cache_name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            cache_name: cache_name.into(),
            table_name: table_name.into(),
        }
    }
}

impl fmt::Display for PartitionTableDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.cache_name, self.table_name)
    }
}
