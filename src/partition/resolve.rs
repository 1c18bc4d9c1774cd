//! Execution-time resolution
//!
//! Turns a compiled tree plus one invocation's bound arguments into the
//! partitions to visit. Reads the tree only; any number of executions may
//! resolve the same tree concurrently.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use super::node::{
    PartitionCompositeOperator, PartitionId, PartitionNode, PartitionParameterNode,
    PartitionSingleNode,
};
use crate::errors::{PruningError, PruningResult};
use crate::metadata::AffinityFunction;

/// Partitions an invocation must visit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "partitions", rename_all = "lowercase")]
pub enum ResolvedPartitions {
    /// Broadcast
    All,
    /// Only these partitions (possibly none)
    Subset(BTreeSet<PartitionId>),
}

impl ResolvedPartitions {
    /// Empty subset
    pub fn empty() -> Self {
        ResolvedPartitions::Subset(BTreeSet::new())
    }

    /// Single partition
    pub fn single(partition: PartitionId) -> Self {
        ResolvedPartitions::Subset(BTreeSet::from([partition]))
    }

    pub fn is_all(&self) -> bool {
        matches!(self, ResolvedPartitions::All)
    }

    /// Partition ids, or `None` when every partition must be visited
    pub fn partitions(&self) -> Option<&BTreeSet<PartitionId>> {
        match self {
            ResolvedPartitions::All => None,
            ResolvedPartitions::Subset(parts) => Some(parts),
        }
    }

    /// Set union; `All` absorbs
    pub fn union(self, other: ResolvedPartitions) -> ResolvedPartitions {
        match (self, other) {
            (ResolvedPartitions::All, _) | (_, ResolvedPartitions::All) => ResolvedPartitions::All,
            (ResolvedPartitions::Subset(mut a), ResolvedPartitions::Subset(b)) => {
                a.extend(b);
                ResolvedPartitions::Subset(a)
            }
        }
    }

    /// Set intersection; `All` is the identity
    pub fn intersect(self, other: ResolvedPartitions) -> ResolvedPartitions {
        match (self, other) {
            (ResolvedPartitions::All, x) | (x, ResolvedPartitions::All) => x,
            (ResolvedPartitions::Subset(a), ResolvedPartitions::Subset(b)) => {
                ResolvedPartitions::Subset(a.intersection(&b).copied().collect())
            }
        }
    }
}

impl PartitionNode {
    /// Resolves the tree against one invocation's arguments.
    ///
    /// Affinity failures propagate unchanged.
    pub fn resolve(
        &self,
        args: &[Value],
        affinity: &dyn AffinityFunction,
    ) -> PruningResult<ResolvedPartitions> {
        match self {
            PartitionNode::All => Ok(ResolvedPartitions::All),
            PartitionNode::None => Ok(ResolvedPartitions::empty()),
            PartitionNode::Constant(c) => Ok(ResolvedPartitions::single(c.partition)),
            PartitionNode::Parameter(p) => p.resolve(args, affinity),
            PartitionNode::Group(group) => {
                let mut acc = ResolvedPartitions::empty();
                for member in group.members() {
                    let resolved = match member {
                        PartitionSingleNode::Constant(c) => ResolvedPartitions::single(c.partition),
                        PartitionSingleNode::Parameter(p) => p.resolve(args, affinity)?,
                    };
                    acc = acc.union(resolved);
                }
                Ok(acc)
            }
            PartitionNode::Composite(composite) => {
                let left = composite.left.resolve(args, affinity)?;
                let right = composite.right.resolve(args, affinity)?;
                Ok(match composite.op {
                    PartitionCompositeOperator::And => left.intersect(right),
                    PartitionCompositeOperator::Or => left.union(right),
                })
            }
        }
    }
}

impl PartitionParameterNode {
    /// Partition of the bound argument.
    ///
    /// A NULL argument matches no row. An argument that does not convert to
    /// the declared type cannot be placed, so every partition is visited.
    pub fn resolve(
        &self,
        args: &[Value],
        affinity: &dyn AffinityFunction,
    ) -> PruningResult<ResolvedPartitions> {
        let arg = args.get(self.index).ok_or(PruningError::ParameterOutOfRange {
            index: self.index,
            count: args.len(),
        })?;

        if arg.is_null() {
            return Ok(ResolvedPartitions::empty());
        }

        match self.column_type.convert(arg) {
            Some(key) => Ok(ResolvedPartitions::single(affinity.partition(&self.table, &key)?)),
            None => Ok(ResolvedPartitions::All),
        }
    }
}
