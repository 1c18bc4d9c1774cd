//! External collaborators of the pruning engine
//!
//! - `TableMetadata`: table kind, pruning-eligible columns, column types
//! - `AffinityFunction`: key to partition mapping
//!
//! Both are read-only and must be safe to share across threads.

mod affinity;
mod table;

pub use affinity::{AffinityFunction, HashAffinity};
pub use table::{TableInfo, TableInfoBuilder, TableKind, TableMetadata, TableRef};
