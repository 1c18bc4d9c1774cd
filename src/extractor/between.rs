//! Range recognition
//!
//! `col >[=] a AND col <[=] b` over an integer key column expands into the
//! partitions owning every value of `[a, b]`, as long as the range touches no
//! more distinct partitions than the configured ceiling. A range covering every
//! partition of the table is `All`.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::errors::PruningResult;
use crate::metadata::AffinityFunction;
use crate::partition::{PartitionConstantNode, PartitionId, PartitionNode, PartitionTableDescriptor};
use crate::sql::{to_i64, OperationType, SqlAst, SqlColumn, SqlOperation};

/// Outcome of range recognition on an AND
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BetweenOutcome {
    /// Operands are not a range over one key column
    NotRange,
    /// Range touches more partitions than the ceiling allows
    Overflow,
    /// Partitions of the range (`None` when the range is empty)
    Resolved(PartitionNode),
}

/// Values walked per allowed partition before a range is given up on
const MAX_VALUES_PER_PART: usize = 64;

/// State of the accumulator after one insert
enum Accumulated {
    Open,
    /// Every partition of the table has been seen
    Saturated,
    Overflow,
}

/// Distinct partitions of a range, capped at `max_parts`.
///
/// The number of values walked is capped too, so a wide range over an
/// affinity that cannot report its partition count still terminates.
struct PartitionAccumulator {
    parts: BTreeSet<PartitionId>,
    max_parts: usize,
    total: Option<usize>,
    values: usize,
    max_values: usize,
}

impl PartitionAccumulator {
    fn new(max_parts: usize, total: Option<u32>) -> Self {
        Self {
            parts: BTreeSet::new(),
            max_parts,
            total: total.map(|t| t as usize),
            values: 0,
            max_values: max_parts.saturating_mul(MAX_VALUES_PER_PART),
        }
    }

    fn add(&mut self, part: PartitionId) -> Accumulated {
        self.parts.insert(part);
        self.values += 1;

        if self.parts.len() > self.max_parts {
            Accumulated::Overflow
        } else if self.total.is_some_and(|total| self.parts.len() >= total) {
            Accumulated::Saturated
        } else if self.values >= self.max_values {
            Accumulated::Overflow
        } else {
            Accumulated::Open
        }
    }

    fn finish(self, table: &PartitionTableDescriptor) -> PartitionNode {
        PartitionNode::group(
            self.parts
                .into_iter()
                .map(|part| PartitionConstantNode::new(table.clone(), part).into()),
        )
    }
}

/// One side of a range: `column <op> literal`
struct RangeSide<'a> {
    op_type: OperationType,
    column: &'a SqlColumn,
    bound: &'a Value,
}

impl<'a> RangeSide<'a> {
    fn parse(ast: &'a SqlAst) -> Option<Self> {
        let SqlAst::Operation(op) = ast else {
            return None;
        };
        let column = op.child(0)?.as_column()?;
        let SqlAst::Constant(bound) = op.child(1)? else {
            return None;
        };

        Some(Self {
            op_type: op.op_type,
            column,
            bound: &bound.value,
        })
    }
}

/// Tries to read a two-operand AND as a bounded integer range.
///
/// # Panics
///
/// If `op` does not have exactly two operands.
pub fn try_extract_between(
    op: &SqlOperation,
    affinity: &dyn AffinityFunction,
    max_parts: usize,
) -> PruningResult<BetweenOutcome> {
    assert_eq!(op.size(), 2, "range candidate must have exactly two operands");

    let (left, right) = (&op.children[0], &op.children[1]);

    let (lower, upper) = match (left.operation_type(), right.operation_type()) {
        (Some(l), Some(r)) if l.is_lower_bound() && r.is_upper_bound() => (left, right),
        (Some(l), Some(r)) if l.is_upper_bound() && r.is_lower_bound() => (right, left),
        _ => return Ok(BetweenOutcome::NotRange),
    };

    let (Some(lower), Some(upper)) = (RangeSide::parse(lower), RangeSide::parse(upper)) else {
        return Ok(BetweenOutcome::NotRange);
    };

    if !lower.column.same_reference(upper.column) {
        return Ok(BetweenOutcome::NotRange);
    }

    let table = &lower.column.table;
    let column = lower.column.column_name.as_str();

    if !table.is_partitioned() || !table.is_column_for_partition_pruning(column) {
        return Ok(BetweenOutcome::NotRange);
    }

    let Some((type_min, type_max)) = table.column_type(column).and_then(|t| t.integer_range())
    else {
        return Ok(BetweenOutcome::NotRange);
    };

    let (Some(lo), Some(hi)) = (to_i64(lower.bound), to_i64(upper.bound)) else {
        return Ok(BetweenOutcome::NotRange);
    };

    // Strict bounds step inwards; stepping past an i64 extreme leaves nothing.
    let lo = match lower.op_type {
        OperationType::Bigger => lo.checked_add(1),
        _ => Some(lo),
    };
    let hi = match upper.op_type {
        OperationType::Smaller => hi.checked_sub(1),
        _ => Some(hi),
    };
    let (Some(lo), Some(hi)) = (lo, hi) else {
        return Ok(BetweenOutcome::Resolved(PartitionNode::None));
    };

    let lo = lo.max(type_min);
    let hi = hi.min(type_max);

    if lo > hi {
        return Ok(BetweenOutcome::Resolved(PartitionNode::None));
    }

    let desc = table.descriptor();
    let mut acc = PartitionAccumulator::new(max_parts, affinity.partitions(&desc));

    for value in lo..=hi {
        match acc.add(affinity.partition(&desc, &Value::from(value))?) {
            Accumulated::Open => {}
            Accumulated::Saturated => return Ok(BetweenOutcome::Resolved(PartitionNode::All)),
            Accumulated::Overflow => return Ok(BetweenOutcome::Overflow),
        }
    }

    Ok(BetweenOutcome::Resolved(acc.finish(&desc)))
}
