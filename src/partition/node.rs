//! Partition tree nodes
//!
//! A tree is immutable once built. Composite children are `Arc`-shared so
//! optimized trees reuse the subtrees they do not change and a compiled tree
//! can be read by any number of executing threads.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::descriptor::PartitionTableDescriptor;
use crate::sql::ColumnType;

/// Partition number inside a table's partition space
pub type PartitionId = u32;

/// Partition resolved at compile time from a literal key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartitionConstantNode {
    pub table: PartitionTableDescriptor,
    pub partition: PartitionId,
}

impl PartitionConstantNode {
    pub fn new(table: PartitionTableDescriptor, partition: PartitionId) -> Self {
        Self { table, partition }
    }
}

/// Partition that depends on bound argument `index` at execution time
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartitionParameterNode {
    pub table: PartitionTableDescriptor,
    pub index: usize,
    /// Declared type the argument is converted to before hashing
    pub column_type: ColumnType,
}

impl PartitionParameterNode {
    pub fn new(table: PartitionTableDescriptor, index: usize, column_type: ColumnType) -> Self {
        Self {
            table,
            index,
            column_type,
        }
    }
}

/// A single partition, known now or at execution time
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PartitionSingleNode {
    Constant(PartitionConstantNode),
    Parameter(PartitionParameterNode),
}

impl PartitionSingleNode {
    /// Table the partition belongs to
    pub fn table(&self) -> &PartitionTableDescriptor {
        match self {
            PartitionSingleNode::Constant(c) => &c.table,
            PartitionSingleNode::Parameter(p) => &p.table,
        }
    }

    /// Returns true for a deferred partition
    pub fn is_parameter(&self) -> bool {
        matches!(self, PartitionSingleNode::Parameter(_))
    }
}

/// Logical OR over unique single partitions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartitionGroupNode {
    members: BTreeSet<PartitionSingleNode>,
}

impl PartitionGroupNode {
    /// Creates a group, deduplicating members
    pub fn new(members: impl IntoIterator<Item = PartitionSingleNode>) -> Self {
        Self {
            members: members.into_iter().collect(),
        }
    }

    /// Members in deterministic order
    pub fn members(&self) -> &BTreeSet<PartitionSingleNode> {
        &self.members
    }

    /// Number of unique members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the group has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns true if any member is deferred
    pub fn contains_parameter(&self) -> bool {
        self.members.iter().any(PartitionSingleNode::is_parameter)
    }
}

/// Boolean connective of a composite node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartitionCompositeOperator {
    And,
    Or,
}

impl PartitionCompositeOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartitionCompositeOperator::And => "AND",
            PartitionCompositeOperator::Or => "OR",
        }
    }
}

/// Lazy AND/OR of two subtrees
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartitionCompositeNode {
    pub left: Arc<PartitionNode>,
    pub right: Arc<PartitionNode>,
    pub op: PartitionCompositeOperator,
}

/// Partition tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "lowercase")]
pub enum PartitionNode {
    /// Every partition may match
    All,
    /// No partition can match
    None,
    Constant(PartitionConstantNode),
    Parameter(PartitionParameterNode),
    Group(PartitionGroupNode),
    Composite(PartitionCompositeNode),
}

impl PartitionNode {
    /// Builds the smallest node over `members`: `None` when empty, the lone
    /// member when single, a group otherwise.
    pub fn group(members: impl IntoIterator<Item = PartitionSingleNode>) -> Self {
        let mut members: BTreeSet<PartitionSingleNode> = members.into_iter().collect();
        match members.len() {
            0 => PartitionNode::None,
            1 => match members.pop_first() {
                Some(single) => single.into(),
                None => PartitionNode::None,
            },
            _ => PartitionNode::Group(PartitionGroupNode { members }),
        }
    }

    /// `left AND right`, unoptimized
    pub fn and(left: PartitionNode, right: PartitionNode) -> Self {
        Self::composite(left, right, PartitionCompositeOperator::And)
    }

    /// `left OR right`, unoptimized
    pub fn or(left: PartitionNode, right: PartitionNode) -> Self {
        Self::composite(left, right, PartitionCompositeOperator::Or)
    }

    /// Composite of two subtrees, unoptimized
    pub fn composite(
        left: PartitionNode,
        right: PartitionNode,
        op: PartitionCompositeOperator,
    ) -> Self {
        PartitionNode::Composite(PartitionCompositeNode {
            left: Arc::new(left),
            right: Arc::new(right),
            op,
        })
    }

    /// Constant partition node
    pub fn constant(table: PartitionTableDescriptor, partition: PartitionId) -> Self {
        PartitionNode::Constant(PartitionConstantNode::new(table, partition))
    }

    /// Deferred partition node
    pub fn parameter(
        table: PartitionTableDescriptor,
        index: usize,
        column_type: ColumnType,
    ) -> Self {
        PartitionNode::Parameter(PartitionParameterNode::new(table, index, column_type))
    }

    pub fn is_all(&self) -> bool {
        matches!(self, PartitionNode::All)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, PartitionNode::None)
    }

    /// Returns true if resolving the tree needs bound arguments
    pub fn contains_parameter(&self) -> bool {
        match self {
            PartitionNode::All | PartitionNode::None | PartitionNode::Constant(_) => false,
            PartitionNode::Parameter(_) => true,
            PartitionNode::Group(g) => g.contains_parameter(),
            PartitionNode::Composite(c) => {
                c.left.contains_parameter() || c.right.contains_parameter()
            }
        }
    }

    /// Partition ids of a compile-time resolvable leaf.
    ///
    /// `Some` only for a Constant, or a Group of Constants sharing one table.
    pub fn concrete_partitions(
        &self,
    ) -> Option<(&PartitionTableDescriptor, BTreeSet<PartitionId>)> {
        match self {
            PartitionNode::Constant(c) => Some((&c.table, BTreeSet::from([c.partition]))),
            PartitionNode::Group(g) => {
                let mut table = None;
                let mut parts = BTreeSet::new();
                for member in g.members() {
                    let PartitionSingleNode::Constant(c) = member else {
                        return None;
                    };
                    match table {
                        None => table = Some(&c.table),
                        Some(t) if t != &c.table => return None,
                        Some(_) => {}
                    }
                    parts.insert(c.partition);
                }
                table.map(|t| (t, parts))
            }
            _ => None,
        }
    }
}

impl From<PartitionSingleNode> for PartitionNode {
    fn from(single: PartitionSingleNode) -> Self {
        match single {
            PartitionSingleNode::Constant(c) => PartitionNode::Constant(c),
            PartitionSingleNode::Parameter(p) => PartitionNode::Parameter(p),
        }
    }
}

impl From<PartitionConstantNode> for PartitionSingleNode {
    fn from(node: PartitionConstantNode) -> Self {
        PartitionSingleNode::Constant(node)
    }
}

impl From<PartitionParameterNode> for PartitionSingleNode {
    fn from(node: PartitionParameterNode) -> Self {
        PartitionSingleNode::Parameter(node)
    }
}
