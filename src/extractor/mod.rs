//! Partition extraction
//!
//! Walks a compiled query's predicate and builds the partition tree that
//! bounds the partitions it can touch:
//!
//! - `=` and `IN` on a key column resolve through the affinity function
//! - integer ranges expand into partitions up to a ceiling
//! - AND/OR become composites, reduced by the optimizer
//! - anything else contributes no information (`All`)
//!
//! Sibling results are combined by the merger.

mod between;
mod extractor;
mod merger;

#[cfg(test)]
pub(crate) mod fixtures;

pub use between::{try_extract_between, BetweenOutcome};
pub use extractor::PartitionExtractor;
pub use merger::{merge, try_merge, MergeRejection};
