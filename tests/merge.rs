//! Merge Tests
//!
//! Tests for combining sibling query results:
//! - Compatible siblings are united
//! - Any missing sibling or mismatched table broadcasts
//! - Deferred parameters survive the merge

use std::num::NonZeroU32;
use std::sync::Arc;

use partition_pruner::extractor::{merge, try_merge, MergeRejection};
use partition_pruner::metadata::HashAffinity;
use partition_pruner::partition::{
    PartitionConstantNode, PartitionNode, PartitionResult, PartitionTableDescriptor,
};
use partition_pruner::sql::ColumnType;
use partition_pruner::{PartitionExtractor, PruningConfig};

// =============================================================================
// Helper Functions
// =============================================================================

fn orders() -> PartitionTableDescriptor {
    PartitionTableDescriptor::new("orders", "ORDERS")
}

fn result(desc: PartitionTableDescriptor, tree: PartitionNode) -> Option<PartitionResult> {
    Some(PartitionResult::new(desc, tree))
}

fn constant(part: u32) -> Option<PartitionResult> {
    result(orders(), PartitionNode::constant(orders(), part))
}

// =============================================================================
// Merge Tests
// =============================================================================

/// Differing descriptors cannot be merged.
#[test]
fn test_differing_descriptors() {
    let lines = PartitionTableDescriptor::new("orders", "ORDER_LINES");

    let merged = merge(&[constant(1), result(lines.clone(), PartitionNode::constant(lines, 1))]);
    assert_eq!(merged, None);
}

/// Same table name in another cache is a different partition space.
#[test]
fn test_differing_caches() {
    let other = PartitionTableDescriptor::new("orders_eu", "ORDERS");

    assert_eq!(
        try_merge(&[constant(1), result(other.clone(), PartitionNode::constant(other, 1))]),
        Err(MergeRejection::DescriptorMismatch)
    );
}

/// An absent sibling broadcasts the whole statement.
#[test]
fn test_absent_sibling() {
    assert_eq!(merge(&[constant(1), None, constant(2)]), None);
    assert_eq!(merge(&[None]), None);
}

/// No siblings, nothing merged.
#[test]
fn test_no_siblings() {
    assert_eq!(merge(&[]), None);
}

/// Compatible siblings unite their partitions.
#[test]
fn test_siblings_unite() {
    let merged = merge(&[constant(3), constant(1), constant(3)]).unwrap();

    assert_eq!(merged.descriptor(), &orders());
    assert_eq!(
        merged.tree(),
        &PartitionNode::group([
            PartitionConstantNode::new(orders(), 1).into(),
            PartitionConstantNode::new(orders(), 3).into(),
        ])
    );
}

/// A contradictory sibling contributes nothing.
#[test]
fn test_none_sibling_is_identity() {
    let merged = merge(&[result(orders(), PartitionNode::None), constant(4)]).unwrap();
    assert_eq!(merged.tree(), &PartitionNode::constant(orders(), 4));
}

/// Parameters keep the merged tree deferred.
#[test]
fn test_parameter_sibling() {
    let param = result(orders(), PartitionNode::parameter(orders(), 0, ColumnType::Long));

    let merged = merge(&[constant(1), param]).unwrap();
    assert!(merged.needs_arguments());
    assert!(matches!(merged.tree(), PartitionNode::Composite(_)));
}

/// The extractor's merge records outcomes.
#[test]
fn test_extractor_merge_metrics() {
    let ext = PartitionExtractor::with_config(
        Arc::new(HashAffinity::new(NonZeroU32::new(8).unwrap())),
        &PruningConfig::default(),
    );

    assert!(ext.merge(&[constant(1), constant(2)]).is_some());
    assert!(ext.merge(&[constant(1), None]).is_none());

    let snapshot = ext.metrics().snapshot();
    assert_eq!(snapshot.merges, 1);
    assert_eq!(snapshot.merge_failures, 1);
}
