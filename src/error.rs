use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::Section;

#[derive(Error, Debug)]
pub enum TreasuryError {
    #[error("Malformed line {line_number}: {reason}")]
    MalformedLine { line_number: usize, reason: String },

    #[error("Duplicate canonical id '{canonical_id}': labels '{first_label}' and '{second_label}' both resolve to it")]
    DuplicateItem {
        canonical_id: String,
        first_label: String,
        second_label: String,
    },

    #[error("Statement for {period} failed hierarchy validation and cannot be compared")]
    StatementInvalid { period: String },

    #[error("Invalid period '{0}': expected a statement id of the form mtsMMYY")]
    PeriodFormat(String),

    #[error("Invalid month {0}: must be between 1 and 12")]
    InvalidMonth(u32),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TreasuryError>;

/// Recoverable condition accumulated during parsing and statement building.
///
/// Diagnostics never abort the pipeline; they travel alongside the built
/// statement so the caller can render a best-effort result with visible
/// caveats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Line did not fit the label + four-value shape and was skipped.
    MalformedLine {
        line_number: usize,
        content: String,
        reason: String,
    },
    /// No alias matched; the normalized label itself became the canonical id.
    UnknownLabel {
        raw_label: String,
        fallback_id: String,
    },
    /// A declared total disagrees with its summed items beyond tolerance.
    HierarchyViolation {
        section: Section,
        column: String,
        declared: i64,
        computed: i64,
    },
    /// The surplus/deficit row disagrees with total receipts minus total
    /// outlays beyond tolerance.
    DeficitMismatch {
        column: String,
        declared: i64,
        computed: i64,
    },
}
