//! Partition result attached to a compiled query

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::descriptor::PartitionTableDescriptor;
use super::node::PartitionNode;
use super::resolve::ResolvedPartitions;
use crate::errors::PruningResult;
use crate::metadata::AffinityFunction;

/// Pruned partition tree of a single-table query.
///
/// Built once per compiled statement and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionResult {
    descriptor: PartitionTableDescriptor,
    tree: PartitionNode,
}

impl PartitionResult {
    pub fn new(descriptor: PartitionTableDescriptor, tree: PartitionNode) -> Self {
        Self { descriptor, tree }
    }

    /// Partition space of the query's table
    pub fn descriptor(&self) -> &PartitionTableDescriptor {
        &self.descriptor
    }

    /// Optimized partition tree
    pub fn tree(&self) -> &PartitionNode {
        &self.tree
    }

    /// Returns true if execution needs bound arguments to pick partitions
    pub fn needs_arguments(&self) -> bool {
        self.tree.contains_parameter()
    }

    /// Partitions one invocation must visit
    pub fn resolve(
        &self,
        args: &[Value],
        affinity: &dyn AffinityFunction,
    ) -> PruningResult<ResolvedPartitions> {
        self.tree.resolve(args, affinity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::HashAffinity;
    use crate::sql::ColumnType;
    use serde_json::json;
    use std::num::NonZeroU32;

    #[test]
    fn test_resolve_through_result() {
        let desc = PartitionTableDescriptor::new("orders", "ORDERS");
        let affinity = HashAffinity::new(NonZeroU32::new(16).unwrap());
        let result = PartitionResult::new(
            desc.clone(),
            PartitionNode::parameter(desc.clone(), 0, ColumnType::Long),
        );

        assert!(result.needs_arguments());

        let expected = affinity.partition(&desc, &json!(42)).unwrap();
        assert_eq!(
            result.resolve(&[json!(42)], &affinity).unwrap(),
            ResolvedPartitions::single(expected)
        );
    }

    #[test]
    fn test_serializes_for_clients() {
        let desc = PartitionTableDescriptor::new("orders", "ORDERS");
        let result = PartitionResult::new(desc.clone(), PartitionNode::constant(desc, 7));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["descriptor"]["cache_name"], "orders");
        assert_eq!(json["tree"]["node"], "constant");
        assert_eq!(json["tree"]["partition"], 7);

        let back: PartitionResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }
}
