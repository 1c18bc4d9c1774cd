//! Table metadata collaborator
//!
//! The extractor asks three questions of a table: is it the partitioned kind,
//! may a column drive partition pruning, and what is a column's declared type.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::partition::PartitionTableDescriptor;
use crate::sql::ColumnType;

/// Read-only table metadata
pub trait TableMetadata: fmt::Debug + Send + Sync {
    /// Cache the table's rows live in
    fn cache_name(&self) -> &str;

    /// SQL table name
    fn table_name(&self) -> &str;

    /// True if rows are spread over partitions by the affinity function
    fn is_partitioned(&self) -> bool;

    /// True if an equality on `column` pins rows to a single partition
    fn is_column_for_partition_pruning(&self, column: &str) -> bool;

    /// Declared type of `column`
    fn column_type(&self, column: &str) -> Option<ColumnType>;

    /// Partition space the table belongs to
    fn descriptor(&self) -> PartitionTableDescriptor {
        PartitionTableDescriptor::new(self.cache_name(), self.table_name())
    }
}

/// Shared table handle
pub type TableRef = Arc<dyn TableMetadata>;

/// How a table's rows are distributed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// Spread over partitions by key
    Partitioned,
    /// Full copy on every node
    Replicated,
    /// Not backed by a distributed cache (system views, temp tables)
    Local,
}

/// In-memory table metadata
#[derive(Debug, Clone)]
pub struct TableInfo {
    cache_name: String,
    table_name: String,
    kind: TableKind,
    columns: HashMap<String, ColumnType>,
    pruning_columns: HashSet<String>,
}

impl TableInfo {
    /// Starts a builder for a partitioned table
    pub fn builder(
        cache_name: impl Into<String>,
        table_name: impl Into<String>,
    ) -> TableInfoBuilder {
        TableInfoBuilder {
            info: TableInfo {
                cache_name: cache_name.into(),
                table_name: table_name.into(),
                kind: TableKind::Partitioned,
                columns: HashMap::new(),
                pruning_columns: HashSet::new(),
            },
        }
    }

    /// Distribution kind
    pub fn kind(&self) -> TableKind {
        self.kind
    }
}

impl TableMetadata for TableInfo {
    fn cache_name(&self) -> &str {
        &self.cache_name
    }

    fn table_name(&self) -> &str {
        &self.table_name
    }

    fn is_partitioned(&self) -> bool {
        self.kind == TableKind::Partitioned
    }

    fn is_column_for_partition_pruning(&self, column: &str) -> bool {
        self.pruning_columns.contains(column)
    }

    fn column_type(&self, column: &str) -> Option<ColumnType> {
        self.columns.get(column).copied()
    }
}

/// Builder for [`TableInfo`]
#[derive(Debug)]
pub struct TableInfoBuilder {
    info: TableInfo,
}

impl TableInfoBuilder {
    /// Sets the distribution kind
    pub fn kind(mut self, kind: TableKind) -> Self {
        self.info.kind = kind;
        self
    }

    /// Adds a regular column
    pub fn column(mut self, name: impl Into<String>, ty: ColumnType) -> Self {
        self.info.columns.insert(name.into(), ty);
        self
    }

    /// Adds a column that routes rows (affinity key or primary key)
    pub fn key_column(mut self, name: impl Into<String>, ty: ColumnType) -> Self {
        let name = name.into();
        self.info.pruning_columns.insert(name.clone());
        self.info.columns.insert(name, ty);
        self
    }

    /// Finishes the builder
    pub fn build(self) -> TableInfo {
        self.info
    }

    /// Finishes the builder into a shared handle
    pub fn build_ref(self) -> TableRef {
        Arc::new(self.info)
    }
}
