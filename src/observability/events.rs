//! Observable events of the pruning engine
//!
//! Events are explicit and typed. Every log line carries exactly one.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration file loaded
    ConfigLoaded,
    /// Process-wide setting overridden from the environment
    ConfigOverride,
    /// Environment override could not be parsed, default kept
    ConfigInvalid,

    // Extraction
    /// Extraction produced a pruned partition tree
    ExtractPruned,
    /// Extraction learned nothing, query must broadcast
    ExtractBroadcast,
    /// Between range expanded past the partition ceiling
    BetweenOverflow,

    // Merge
    /// Sibling results merged into one
    MergeComplete,
    /// Sibling results could not be merged
    MergeFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "PRUNE_CONFIG_LOADED",
            Event::ConfigOverride => "PRUNE_CONFIG_OVERRIDE",
            Event::ConfigInvalid => "PRUNE_CONFIG_INVALID",

            Event::ExtractPruned => "PARTITIONS_EXTRACTED",
            Event::ExtractBroadcast => "PARTITIONS_BROADCAST",
            Event::BetweenOverflow => "BETWEEN_RANGE_OVERFLOW",

            Event::MergeComplete => "PARTITIONS_MERGED",
            Event::MergeFailed => "PARTITIONS_MERGE_FAILED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
