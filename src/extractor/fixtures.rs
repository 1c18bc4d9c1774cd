//! Test affinity with predictable placement

use std::collections::HashMap;

use serde_json::Value;

use crate::errors::AffinityError;
use crate::metadata::AffinityFunction;
use crate::partition::{PartitionId, PartitionTableDescriptor};

/// Integer keys land on `key mod n` unless pinned explicitly.
pub(crate) struct TestAffinity {
    modulo: u32,
    pinned: HashMap<i64, PartitionId>,
    report_total: bool,
}

impl TestAffinity {
    pub(crate) fn modulo(modulo: u32) -> Self {
        Self {
            modulo,
            pinned: HashMap::new(),
            report_total: false,
        }
    }

    pub(crate) fn pin(mut self, key: i64, partition: PartitionId) -> Self {
        self.pinned.insert(key, partition);
        self
    }

    pub(crate) fn reporting_total(mut self) -> Self {
        self.report_total = true;
        self
    }
}

impl AffinityFunction for TestAffinity {
    fn partition(
        &self,
        _table: &PartitionTableDescriptor,
        key: &Value,
    ) -> Result<PartitionId, AffinityError> {
        let v = key
            .as_i64()
            .ok_or_else(|| AffinityError::UnsupportedKey(key.to_string()))?;

        Ok(self
            .pinned
            .get(&v)
            .copied()
            .unwrap_or_else(|| v.rem_euclid(i64::from(self.modulo)) as PartitionId))
    }

    fn partitions(&self, _table: &PartitionTableDescriptor) -> Option<u32> {
        self.report_total.then_some(self.modulo)
    }
}
