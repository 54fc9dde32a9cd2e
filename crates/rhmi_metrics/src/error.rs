// SPDX-License-Identifier: AGPL-3.0-only
// Copyright Authors of rhmi-exporter

use thiserror::Error;

/// Mismatches between how a family was registered and how it is used. These indicate a bug in
/// the bootstrap code rather than a transient condition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    #[error("metric family {0} is already registered")]
    DuplicateName(String),
    #[error("metric family {family} declares the dimension {dimension} more than once")]
    DuplicateDimension {
        family: String,
        dimension: &'static str,
    },
    #[error("metric family {family} has no dimension named {dimension}")]
    UnknownDimension {
        family: String,
        dimension: &'static str,
    },
    #[error("metric family {family} expects {expected} label values, got {actual}")]
    DimensionMismatch {
        family: String,
        expected: usize,
        actual: usize,
    },
}
