//! Optimizer Invariant Tests
//!
//! Tests for partition-tree optimization:
//! - Idempotence on arbitrary trees
//! - Absorption and identity of All/None in both operand orders
//! - Eager reduction of concrete operands
//! - Parameters keep composites lazy

use partition_pruner::partition::{
    PartitionConstantNode, PartitionGroupNode, PartitionNode, PartitionParameterNode,
    PartitionSingleNode, PartitionTableDescriptor,
};
use partition_pruner::sql::ColumnType;
use proptest::prelude::*;

// =============================================================================
// Helper Functions
// =============================================================================

fn orders() -> PartitionTableDescriptor {
    PartitionTableDescriptor::new("orders", "ORDERS")
}

fn archive() -> PartitionTableDescriptor {
    PartitionTableDescriptor::new("orders", "ORDERS_ARCHIVE")
}

fn constant(part: u32) -> PartitionNode {
    PartitionNode::constant(orders(), part)
}

fn param(index: usize) -> PartitionNode {
    PartitionNode::parameter(orders(), index, ColumnType::Int)
}

fn group(parts: &[u32]) -> PartitionNode {
    PartitionNode::group(
        parts
            .iter()
            .map(|p| PartitionConstantNode::new(orders(), *p).into()),
    )
}

fn single_strategy() -> impl Strategy<Value = PartitionSingleNode> {
    prop_oneof![
        (0u32..6).prop_map(|p| PartitionSingleNode::from(PartitionConstantNode::new(orders(), p))),
        (0u32..3).prop_map(|p| PartitionSingleNode::from(PartitionConstantNode::new(archive(), p))),
        (0usize..3).prop_map(|i| {
            PartitionSingleNode::from(PartitionParameterNode::new(orders(), i, ColumnType::Int))
        }),
    ]
}

fn leaf_strategy() -> impl Strategy<Value = PartitionNode> {
    prop_oneof![
        Just(PartitionNode::All),
        Just(PartitionNode::None),
        (0u32..6).prop_map(constant),
        (0usize..3).prop_map(param),
        // Raw groups, including degenerate ones the optimizer must collapse
        prop::collection::vec(single_strategy(), 0..5)
            .prop_map(|members| PartitionNode::Group(PartitionGroupNode::new(members))),
    ]
}

fn tree_strategy() -> impl Strategy<Value = PartitionNode> {
    leaf_strategy().prop_recursive(5, 48, 2, |inner| {
        (inner.clone(), inner, any::<bool>()).prop_map(|(left, right, is_and)| {
            if is_and {
                PartitionNode::and(left, right)
            } else {
                PartitionNode::or(left, right)
            }
        })
    })
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    /// optimize(optimize(t)) == optimize(t)
    #[test]
    fn prop_optimize_idempotent(tree in tree_strategy()) {
        let once = tree.optimize();
        let twice = once.optimize();
        prop_assert_eq!(once, twice);
    }

    /// A parameter-free tree stays parameter-free.
    #[test]
    fn prop_optimize_keeps_constant_trees_constant(tree in tree_strategy()) {
        if !tree.contains_parameter() {
            prop_assert!(!tree.optimize().contains_parameter());
        }
    }
}

// =============================================================================
// Absorption Table
// =============================================================================

/// AND/OR with All/None, every operand order.
#[test]
fn test_absorption_and_identity() {
    let x = || param(0);

    let cases = [
        (PartitionNode::and(PartitionNode::None, x()), PartitionNode::None),
        (PartitionNode::and(x(), PartitionNode::None), PartitionNode::None),
        (PartitionNode::and(PartitionNode::All, x()), x()),
        (PartitionNode::and(x(), PartitionNode::All), x()),
        (PartitionNode::or(PartitionNode::All, x()), PartitionNode::All),
        (PartitionNode::or(x(), PartitionNode::All), PartitionNode::All),
        (PartitionNode::or(PartitionNode::None, x()), x()),
        (PartitionNode::or(x(), PartitionNode::None), x()),
        (
            PartitionNode::and(PartitionNode::All, PartitionNode::None),
            PartitionNode::None,
        ),
        (
            PartitionNode::or(PartitionNode::All, PartitionNode::None),
            PartitionNode::All,
        ),
    ];

    for (tree, expected) in cases {
        assert_eq!(tree.optimize(), expected, "optimizing {}", tree);
    }
}

// =============================================================================
// Concrete Reduction Tests
// =============================================================================

/// Two concrete operands of one table reduce to a set operation.
#[test]
fn test_concrete_operands_reduce() {
    let and = PartitionNode::and(group(&[1, 2, 3]), group(&[2, 3, 4]));
    assert_eq!(and.optimize(), group(&[2, 3]));

    let or = PartitionNode::or(constant(1), group(&[1, 5]));
    assert_eq!(or.optimize(), group(&[1, 5]));

    let disjoint = PartitionNode::and(constant(1), constant(2));
    assert_eq!(disjoint.optimize(), PartitionNode::None);
}

/// Operands of different tables are not combined.
#[test]
fn test_different_tables_stay_composite() {
    let tree = PartitionNode::or(constant(1), PartitionNode::constant(archive(), 1));
    assert_eq!(tree.optimize(), tree);
}

/// A parameter keeps the composite lazy.
#[test]
fn test_parameter_keeps_composite() {
    let tree = PartitionNode::and(param(0), group(&[1, 2]));
    let optimized = tree.optimize();

    assert!(matches!(optimized, PartitionNode::Composite(_)));
    assert!(optimized.contains_parameter());
}

/// Reduction works bottom-up through nested composites.
#[test]
fn test_nested_reduction() {
    let tree = PartitionNode::and(
        PartitionNode::or(constant(1), constant(2)),
        PartitionNode::or(PartitionNode::None, PartitionNode::or(constant(2), constant(3))),
    );

    assert_eq!(tree.optimize(), constant(2));
}
