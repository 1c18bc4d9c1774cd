//! Explain output for partition trees
//!
//! Rendering is deterministic: group members print in their set order.

use std::fmt;

use super::node::{PartitionNode, PartitionSingleNode};
use super::result::PartitionResult;

impl fmt::Display for PartitionSingleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionSingleNode::Constant(c) => write!(f, "P{}", c.partition),
            PartitionSingleNode::Parameter(p) => write!(f, "?{}:{}", p.index, p.column_type),
        }
    }
}

impl fmt::Display for PartitionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionNode::All => write!(f, "ALL"),
            PartitionNode::None => write!(f, "NONE"),
            PartitionNode::Constant(c) => write!(f, "P{}", c.partition),
            PartitionNode::Parameter(p) => write!(f, "?{}:{}", p.index, p.column_type),
            PartitionNode::Group(group) => {
                write!(f, "[")?;
                for (i, member) in group.members().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", member)?;
                }
                write!(f, "]")
            }
            PartitionNode::Composite(c) => {
                write!(f, "({} {} {})", c.left, c.op.as_str(), c.right)
            }
        }
    }
}

/// Human-readable pruning report for one compiled query
#[derive(Debug, Clone)]
pub struct PartitionExplain {
    /// Whether the query was narrowed to a partition subset
    pub pruned: bool,
    /// `cache.table` of the pruned query
    pub table: Option<String>,
    /// Rendered tree
    pub tree: Option<String>,
    /// Whether bound arguments are needed at execution
    pub deferred: bool,
}

impl PartitionExplain {
    /// Explains an extraction outcome; `None` means broadcast
    pub fn new(result: Option<&PartitionResult>) -> Self {
        match result {
            Some(res) => Self {
                pruned: true,
                table: Some(res.descriptor().to_string()),
                tree: Some(res.tree().to_string()),
                deferred: res.needs_arguments(),
            },
            None => Self {
                pruned: false,
                table: None,
                tree: None,
                deferred: false,
            },
        }
    }
}

impl fmt::Display for PartitionExplain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== PARTITION PRUNING ===")?;

        if self.pruned {
            writeln!(f, "Status: PRUNED")?;
            if let Some(table) = &self.table {
                writeln!(f, "Table: {}", table)?;
            }
            if let Some(tree) = &self.tree {
                writeln!(f, "Partitions: {}", tree)?;
            }
            writeln!(
                f,
                "Resolution: {}",
                if self.deferred { "EXECUTION" } else { "COMPILE" }
            )?;
        } else {
            writeln!(f, "Status: BROADCAST")?;
        }

        Ok(())
    }
}
