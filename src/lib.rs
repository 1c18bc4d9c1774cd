//! partition-pruner - Compile-time partition pruning for distributed SQL
//!
//! Given an already-parsed single-table query, computes the smallest set of
//! partitions the query can touch, so it is sent only to the nodes owning
//! them:
//!
//! - `sql`: input AST and declared column types
//! - `metadata`: table metadata and affinity collaborators
//! - `partition`: partition-tree algebra, optimizer, execution-time resolution
//! - `extractor`: predicate walk, range recognition, sibling merge
//!
//! # Usage
//!
//! ```ignore
//! let extractor = PartitionExtractor::new(Arc::new(HashAffinity::new(parts)));
//!
//! if let Some(result) = extractor.extract(&query)? {
//!     let targets = extractor.resolve(&result, &args)?;
//! }
//! ```

pub mod config;
pub mod errors;
pub mod extractor;
pub mod metadata;
pub mod observability;
pub mod partition;
pub mod sql;

pub use config::PruningConfig;
pub use errors::{AffinityError, PruningError, PruningResult};
pub use extractor::PartitionExtractor;
pub use partition::{PartitionNode, PartitionResult, ResolvedPartitions};
