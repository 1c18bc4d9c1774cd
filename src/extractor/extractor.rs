//! Partition extractor
//!
//! Produces a partition result per compiled query:
//! 1. Only a plain SELECT over a single table is pruned
//! 2. The WHERE predicate is walked into a partition tree
//! 3. The tree is optimized; `All` means broadcast
//!
//! Losing precision never fails extraction. Only affinity errors propagate.

use std::sync::Arc;

use serde_json::Value;

use super::between::{try_extract_between, BetweenOutcome};
use super::merger::try_merge;
use crate::config::PruningConfig;
use crate::errors::PruningResult;
use crate::metadata::{AffinityFunction, TableRef};
use crate::observability::{log_event_with_fields, Event, Logger, MetricsRegistry, Severity};
use crate::partition::{
    PartitionConstantNode, PartitionNode, PartitionParameterNode, PartitionResult,
    PartitionSingleNode, ResolvedPartitions,
};
use crate::sql::{OperationType, SqlAst, SqlColumn, SqlOperation, SqlQuery, SqlSelect};

/// Builds partition results for compiled queries
pub struct PartitionExtractor {
    affinity: Arc<dyn AffinityFunction>,
    max_parts_between: usize,
    metrics: Arc<MetricsRegistry>,
}

impl PartitionExtractor {
    /// Creates an extractor using the process-wide configuration
    pub fn new(affinity: Arc<dyn AffinityFunction>) -> Self {
        Self::with_config(affinity, PruningConfig::global())
    }

    /// Creates an extractor with explicit configuration
    pub fn with_config(affinity: Arc<dyn AffinityFunction>, config: &PruningConfig) -> Self {
        Self {
            affinity,
            max_parts_between: config.max_extracted_parts_from_between,
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    /// Shares a metrics registry with other components
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Ceiling on distinct partitions a range may expand to
    pub fn max_parts_between(&self) -> usize {
        self.max_parts_between
    }

    /// Extracts partitions of a single-table SELECT.
    ///
    /// `None` means the query must be broadcast.
    pub fn extract(&self, query: &SqlQuery) -> PruningResult<Option<PartitionResult>> {
        let SqlQuery::Select(select) = query else {
            self.broadcast("not_select");
            return Ok(None);
        };

        self.extract_select(select)
    }

    /// Extracts every arm of a (possibly nested) UNION and merges them.
    ///
    /// A plain SELECT is extracted as is.
    pub fn extract_union(&self, query: &SqlQuery) -> PruningResult<Option<PartitionResult>> {
        let mut arms = Vec::new();
        collect_union_arms(query, &mut arms);

        if arms.len() == 1 {
            return self.extract_select(arms[0]);
        }

        let results = arms
            .into_iter()
            .map(|select| self.extract_select(select))
            .collect::<PruningResult<Vec<_>>>()?;

        Ok(self.merge(&results))
    }

    /// Merges sibling results; `None` means broadcast
    pub fn merge(&self, results: &[Option<PartitionResult>]) -> Option<PartitionResult> {
        match try_merge(results) {
            Ok(merged) => {
                self.metrics.record_merge(true);
                if Logger::enabled(Severity::Trace) {
                    let siblings = results.len().to_string();
                    let tree = merged.tree().to_string();
                    log_event_with_fields(
                        Severity::Trace,
                        Event::MergeComplete,
                        &[
                            ("siblings", siblings.as_str()),
                            ("table", merged.descriptor().to_string().as_str()),
                            ("tree", tree.as_str()),
                        ],
                    );
                }
                Some(merged)
            }
            Err(rejection) => {
                self.metrics.record_merge(false);
                log_event_with_fields(
                    Severity::Trace,
                    Event::MergeFailed,
                    &[("reason", rejection.as_str())],
                );
                None
            }
        }
    }

    /// Partitions one invocation of a compiled query must visit
    pub fn resolve(
        &self,
        result: &PartitionResult,
        args: &[Value],
    ) -> PruningResult<ResolvedPartitions> {
        self.metrics.increment_resolutions();
        result.resolve(args, self.affinity.as_ref())
    }

    fn extract_select(&self, select: &SqlSelect) -> PruningResult<Option<PartitionResult>> {
        let Some(table) = select.from.as_ref().and_then(unwrap_table) else {
            self.broadcast("not_single_table");
            return Ok(None);
        };

        let tree = match &select.where_clause {
            Some(predicate) => self.extract_from_expression(predicate)?,
            None => PartitionNode::All,
        };

        let tree = tree.optimize();

        if tree.is_all() {
            self.broadcast("all_partitions");
            return Ok(None);
        }

        let result = PartitionResult::new(table.descriptor(), tree);

        self.metrics.record_extraction(true);
        if Logger::enabled(Severity::Trace) {
            let tree = result.tree().to_string();
            log_event_with_fields(
                Severity::Trace,
                Event::ExtractPruned,
                &[
                    ("table", result.descriptor().to_string().as_str()),
                    ("tree", tree.as_str()),
                ],
            );
        }

        Ok(Some(result))
    }

    fn broadcast(&self, reason: &str) {
        self.metrics.record_extraction(false);
        log_event_with_fields(Severity::Trace, Event::ExtractBroadcast, &[("reason", reason)]);
    }

    /// Partition tree of a predicate; unhandled kinds give `All`
    pub fn extract_from_expression(&self, expr: &SqlAst) -> PruningResult<PartitionNode> {
        let SqlAst::Operation(op) = expr else {
            return Ok(PartitionNode::All);
        };

        match op.op_type {
            OperationType::And => self.extract_from_and(op),
            OperationType::Or => self.extract_from_or(op),
            OperationType::In => self.extract_from_in(op),
            OperationType::Equal => self.extract_from_equal(op),
            _ => Ok(PartitionNode::All),
        }
    }

    fn extract_from_and(&self, op: &SqlOperation) -> PruningResult<PartitionNode> {
        assert_eq!(op.size(), 2, "AND must have exactly two operands");

        match try_extract_between(op, self.affinity.as_ref(), self.max_parts_between)? {
            BetweenOutcome::Resolved(node) => {
                self.metrics.increment_between_ranges();
                return Ok(node);
            }
            BetweenOutcome::Overflow => {
                self.metrics.increment_between_overflows();
                let max = self.max_parts_between.to_string();
                log_event_with_fields(
                    Severity::Trace,
                    Event::BetweenOverflow,
                    &[("max_parts", max.as_str())],
                );
                return Ok(PartitionNode::All);
            }
            BetweenOutcome::NotRange => {}
        }

        let left = self.extract_from_expression(&op.children[0])?;
        let right = self.extract_from_expression(&op.children[1])?;

        Ok(PartitionNode::and(left, right))
    }

    fn extract_from_or(&self, op: &SqlOperation) -> PruningResult<PartitionNode> {
        assert_eq!(op.size(), 2, "OR must have exactly two operands");

        let left = self.extract_from_expression(&op.children[0])?;
        let right = self.extract_from_expression(&op.children[1])?;

        Ok(PartitionNode::or(left, right))
    }

    /// `col IN (v1, ..., vn)`: one unknown element makes the whole list unknown
    fn extract_from_in(&self, op: &SqlOperation) -> PruningResult<PartitionNode> {
        if op.size() < 2 {
            return Ok(PartitionNode::All);
        }

        let Some(column) = op.children[0].as_column() else {
            return Ok(PartitionNode::All);
        };

        let mut parts = Vec::with_capacity(op.size() - 1);

        for value in &op.children[1..] {
            match self.extract_single(column, value)? {
                Some(part) => parts.push(part),
                None => return Ok(PartitionNode::All),
            }
        }

        Ok(PartitionNode::group(parts))
    }

    /// `col = v`, or `v = col`
    fn extract_from_equal(&self, op: &SqlOperation) -> PruningResult<PartitionNode> {
        let (Some(left), Some(right)) = (op.child(0), op.child(1)) else {
            return Ok(PartitionNode::All);
        };

        let (column, value) = match (left, right) {
            (SqlAst::Column(column), value) => (column, value),
            (value, SqlAst::Column(column)) => (column, value),
            _ => return Ok(PartitionNode::All),
        };

        Ok(self
            .extract_single(column, value)?
            .map(PartitionNode::from)
            .unwrap_or(PartitionNode::All))
    }

    /// Partition of one key value, if it can be determined
    fn extract_single(
        &self,
        column: &SqlColumn,
        value: &SqlAst,
    ) -> PruningResult<Option<PartitionSingleNode>> {
        let table = &column.table;
        let name = column.column_name.as_str();

        if !table.is_partitioned() || !table.is_column_for_partition_pruning(name) {
            return Ok(None);
        }

        let Some(column_type) = table.column_type(name) else {
            return Ok(None);
        };

        let desc = table.descriptor();

        match value {
            SqlAst::Constant(literal) => {
                let Some(key) = column_type.convert(&literal.value) else {
                    return Ok(None);
                };
                let partition = self.affinity.partition(&desc, &key)?;
                Ok(Some(PartitionConstantNode::new(desc, partition).into()))
            }
            SqlAst::Parameter(param) => Ok(Some(
                PartitionParameterNode::new(desc, param.index, column_type).into(),
            )),
            _ => Ok(None),
        }
    }
}

/// Table behind a FROM clause, looking through one alias
fn unwrap_table(from: &SqlAst) -> Option<&TableRef> {
    let from = match from {
        SqlAst::Alias(alias) => alias.child.as_ref(),
        other => other,
    };

    match from {
        SqlAst::Table(table) => Some(&table.table),
        _ => None,
    }
}

fn collect_union_arms<'a>(query: &'a SqlQuery, arms: &mut Vec<&'a SqlSelect>) {
    match query {
        SqlQuery::Select(select) => arms.push(select),
        SqlQuery::Union(union) => {
            collect_union_arms(&union.left, arms);
            collect_union_arms(&union.right, arms);
        }
    }
}
