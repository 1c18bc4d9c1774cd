//! Structural tree optimizer
//!
//! Single bottom-up pass, no affinity or runtime information:
//! - `AND(None, x) = None`, `AND(All, x) = x`
//! - `OR(All, x) = All`, `OR(None, x) = x`
//! - two concrete operands of one table are intersected (AND) or united (OR)
//! - anything involving a parameter stays a composite
//!
//! `optimize` is idempotent.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::node::{
    PartitionCompositeNode, PartitionCompositeOperator, PartitionConstantNode, PartitionNode,
};

impl PartitionNode {
    /// Returns the reduced form of this tree
    pub fn optimize(&self) -> PartitionNode {
        match self {
            PartitionNode::All
            | PartitionNode::None
            | PartitionNode::Constant(_)
            | PartitionNode::Parameter(_) => self.clone(),
            PartitionNode::Group(group) => match group.len() {
                0 | 1 => PartitionNode::group(group.members().iter().cloned()),
                _ => self.clone(),
            },
            PartitionNode::Composite(composite) => optimize_composite(composite),
        }
    }
}

fn optimize_composite(composite: &PartitionCompositeNode) -> PartitionNode {
    let left = composite.left.optimize();
    let right = composite.right.optimize();

    match composite.op {
        PartitionCompositeOperator::And => {
            if left.is_none() || right.is_none() {
                return PartitionNode::None;
            }
            if left.is_all() {
                return right;
            }
            if right.is_all() {
                return left;
            }
        }
        PartitionCompositeOperator::Or => {
            if left.is_all() || right.is_all() {
                return PartitionNode::All;
            }
            if left.is_none() {
                return right;
            }
            if right.is_none() {
                return left;
            }
        }
    }

    if let Some(reduced) = reduce_concrete(&left, &right, composite.op) {
        return reduced;
    }

    // Reuse the original subtree when the pass left it untouched.
    let left = reuse_or_wrap(&composite.left, left);
    let right = reuse_or_wrap(&composite.right, right);

    PartitionNode::Composite(PartitionCompositeNode {
        left,
        right,
        op: composite.op,
    })
}

/// Eagerly combines two compile-time resolvable operands of the same table.
fn reduce_concrete(
    left: &PartitionNode,
    right: &PartitionNode,
    op: PartitionCompositeOperator,
) -> Option<PartitionNode> {
    let (left_table, left_parts) = left.concrete_partitions()?;
    let (right_table, right_parts) = right.concrete_partitions()?;

    if left_table != right_table {
        return None;
    }

    let parts: BTreeSet<_> = match op {
        PartitionCompositeOperator::And => left_parts.intersection(&right_parts).copied().collect(),
        PartitionCompositeOperator::Or => left_parts.union(&right_parts).copied().collect(),
    };

    Some(PartitionNode::group(parts.into_iter().map(|part| {
        PartitionConstantNode::new(left_table.clone(), part).into()
    })))
}

fn reuse_or_wrap(original: &Arc<PartitionNode>, optimized: PartitionNode) -> Arc<PartitionNode> {
    if **original == optimized {
        Arc::clone(original)
    } else {
        Arc::new(optimized)
    }
}
