//! Merging of sibling query results
//!
//! Sibling queries (UNION arms, map queries of one statement) are combined
//! with OR. Any incompatibility falls back to "no information".

use crate::partition::{PartitionNode, PartitionResult};

/// Why a merge produced no result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeRejection {
    /// Nothing to merge
    Empty,
    /// A sibling could not be pruned
    MissingSibling,
    /// Siblings read different partition spaces
    DescriptorMismatch,
    /// Union of siblings covers every partition
    AllPartitions,
}

impl MergeRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeRejection::Empty => "empty",
            MergeRejection::MissingSibling => "missing_sibling",
            MergeRejection::DescriptorMismatch => "descriptor_mismatch",
            MergeRejection::AllPartitions => "all_partitions",
        }
    }
}

/// Merges sibling results, explaining a rejection
pub fn try_merge(results: &[Option<PartitionResult>]) -> Result<PartitionResult, MergeRejection> {
    let mut iter = results.iter();

    let first = match iter.next() {
        None => return Err(MergeRejection::Empty),
        Some(None) => return Err(MergeRejection::MissingSibling),
        Some(Some(first)) => first,
    };

    let mut tree = first.tree().clone();

    for sibling in iter {
        let sibling = sibling.as_ref().ok_or(MergeRejection::MissingSibling)?;

        if sibling.descriptor() != first.descriptor() {
            return Err(MergeRejection::DescriptorMismatch);
        }

        tree = PartitionNode::or(tree, sibling.tree().clone());
    }

    let tree = tree.optimize();

    if tree.is_all() {
        return Err(MergeRejection::AllPartitions);
    }

    Ok(PartitionResult::new(first.descriptor().clone(), tree))
}

/// Merges sibling results; `None` means broadcast
pub fn merge(results: &[Option<PartitionResult>]) -> Option<PartitionResult> {
    try_merge(results).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::{PartitionConstantNode, PartitionTableDescriptor};
    use crate::sql::ColumnType;

    fn desc() -> PartitionTableDescriptor {
        PartitionTableDescriptor::new("orders", "ORDERS")
    }

    fn constant(part: u32) -> Option<PartitionResult> {
        Some(PartitionResult::new(desc(), PartitionNode::constant(desc(), part)))
    }

    #[test]
    fn test_merge_unions_constants() {
        let merged = merge(&[constant(1), constant(2), constant(1)]).unwrap();

        assert_eq!(merged.descriptor(), &desc());
        assert_eq!(
            merged.tree(),
            &PartitionNode::group([
                PartitionConstantNode::new(desc(), 1).into(),
                PartitionConstantNode::new(desc(), 2).into(),
            ])
        );
    }

    #[test]
    fn test_single_sibling_passes_through() {
        assert_eq!(merge(&[constant(4)]), constant(4));
    }

    #[test]
    fn test_missing_sibling() {
        assert_eq!(
            try_merge(&[constant(1), None]),
            Err(MergeRejection::MissingSibling)
        );
        assert_eq!(try_merge(&[None]), Err(MergeRejection::MissingSibling));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(try_merge(&[]), Err(MergeRejection::Empty));
    }

    #[test]
    fn test_descriptor_mismatch() {
        let other = PartitionTableDescriptor::new("orders", "ORDERS_ARCHIVE");
        let archive = Some(PartitionResult::new(
            other.clone(),
            PartitionNode::constant(other, 1),
        ));

        assert_eq!(
            try_merge(&[constant(1), archive]),
            Err(MergeRejection::DescriptorMismatch)
        );
    }

    #[test]
    fn test_parameters_stay_deferred() {
        let param = Some(PartitionResult::new(
            desc(),
            PartitionNode::parameter(desc(), 0, ColumnType::Long),
        ));

        let merged = merge(&[constant(1), param]).unwrap();
        assert!(merged.needs_arguments());
    }

    #[test]
    fn test_none_siblings_merge_to_none() {
        let none = || Some(PartitionResult::new(desc(), PartitionNode::None));

        let merged = merge(&[none(), none()]).unwrap();
        assert!(merged.tree().is_none());
    }

    #[test]
    fn test_all_after_merge_is_rejected() {
        let all = Some(PartitionResult::new(desc(), PartitionNode::All));

        assert_eq!(
            try_merge(&[constant(1), all]),
            Err(MergeRejection::AllPartitions)
        );
    }
}
