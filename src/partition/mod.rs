//! Partition-tree algebra
//!
//! A closed set of node kinds describing which partitions a query can touch:
//!
//! | Node | Meaning |
//! |---|---|
//! | `All` | no information, every partition |
//! | `None` | contradiction, no partition |
//! | `Constant` | partition known at compile time |
//! | `Parameter` | partition of a bound argument, known at execution |
//! | `Group` | OR over unique constants/parameters |
//! | `Composite` | lazy AND/OR kept while a parameter is involved |
//!
//! Trees are built by the extractor, reduced by [`PartitionNode::optimize`]
//! and resolved per invocation by [`PartitionNode::resolve`].

mod descriptor;
mod explain;
mod node;
mod optimize;
mod resolve;
mod result;

pub use descriptor::PartitionTableDescriptor;
pub use explain::PartitionExplain;
pub use node::{
    PartitionCompositeNode, PartitionCompositeOperator, PartitionConstantNode, PartitionGroupNode,
    PartitionId, PartitionNode, PartitionParameterNode, PartitionSingleNode,
};
pub use resolve::ResolvedPartitions;
pub use result::PartitionResult;
