use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::aliases::{SURPLUS_OR_DEFICIT, TOTAL_OUTLAYS, TOTAL_RECEIPTS};
use crate::period::Period;

/// The four value columns of the source report, in order.
pub const VALUE_COLUMNS: [&str; 4] = [
    "this_month",
    "fiscal_year_to_date",
    "prior_period_ytd",
    "budget_estimate_full_year",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Section {
    #[schemars(description = "Budget receipts: taxes and other collections")]
    Receipts,
    #[schemars(description = "Budget outlays: spending by department and program")]
    Outlays,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// A terminal category or department row.
    Item,
    /// A non-terminal aggregation row such as the on-/off-budget splits.
    Subtotal,
    /// A section grand total, or the surplus/deficit row.
    Total,
}

/// One normalized report line. All monetary values are in millions of
/// dollars, as printed in the source report. `None` means the report showed
/// the no-transaction placeholder, which is distinct from an explicit zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LineItem {
    pub canonical_id: String,
    pub raw_label: String,
    pub section: Section,
    pub level: Level,
    pub this_month: Option<i64>,
    pub fiscal_year_to_date: Option<i64>,
    pub prior_period_ytd: Option<i64>,
    pub budget_estimate_full_year: Option<i64>,
}

impl LineItem {
    /// The four value columns in report order.
    pub fn values(&self) -> [Option<i64>; 4] {
        [
            self.this_month,
            self.fiscal_year_to_date,
            self.prior_period_ytd,
            self.budget_estimate_full_year,
        ]
    }
}

/// One parsed Monthly Treasury Statement. Immutable once built; comparison
/// never mutates a statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Statement {
    pub period: Period,
    pub line_items: Vec<LineItem>,
    /// False when hierarchy validation found a total diverging from its
    /// summed items. An invalid statement is refused by the comparison
    /// engine rather than producing misleading deltas.
    pub is_valid: bool,
}

impl Statement {
    pub fn get(&self, canonical_id: &str) -> Option<&LineItem> {
        self.line_items
            .iter()
            .find(|item| item.canonical_id == canonical_id)
    }

    pub fn section_items(&self, section: Section) -> impl Iterator<Item = &LineItem> {
        self.line_items
            .iter()
            .filter(move |item| item.section == section && item.level == Level::Item)
    }

    /// The grand-total row for a section, excluding the surplus/deficit row.
    pub fn section_total(&self, section: Section) -> Option<&LineItem> {
        let id = match section {
            Section::Receipts => TOTAL_RECEIPTS,
            Section::Outlays => TOTAL_OUTLAYS,
        };
        self.get(id)
    }

    pub fn surplus_or_deficit(&self) -> Option<&LineItem> {
        self.get(SURPLUS_OR_DEFICIT)
    }
}

// ---------------------------------------------------------------------------
// Comparison contract shapes returned to the presentation layer.
// ---------------------------------------------------------------------------

/// A summary figure with its prior-period counterpart. `change_percent` is
/// absent when the previous value is absent or zero; it is never coerced to
/// zero or infinity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SummaryItem {
    pub current: Option<i64>,
    pub previous: Option<i64>,
    pub change_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Summary {
    pub receipts: SummaryItem,
    pub outlays: SummaryItem,
    /// Positive when outlays exceed receipts.
    pub deficit: SummaryItem,
    /// Total federal debt outstanding, supplied externally per period. The
    /// statement text itself does not carry a cumulative debt figure.
    pub debt: SummaryItem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BudgetDetailItem {
    pub category: String,
    pub canonical_id: String,
    pub section: Section,
    pub current: Option<i64>,
    pub previous: Option<i64>,
    pub change_percent: Option<f64>,
    pub budget_estimate: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DetailedChanges {
    pub receipts: Vec<BudgetDetailItem>,
    pub outlays: Vec<BudgetDetailItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub message: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ComparisonResult {
    pub primary_period: Period,
    pub comparison_period: Option<Period>,
    pub summary: Summary,
    pub detailed: DetailedChanges,
    /// Detailed items whose absolute change met the significance threshold,
    /// ordered by descending magnitude.
    pub significant_changes: Vec<BudgetDetailItem>,
    pub insights: Vec<Insight>,
}

impl ComparisonResult {
    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&schemars::schema_for!(ComparisonResult))
    }
}

/// Outlays restricted to department granularity, with the current month
/// expressed as a share of the full-year budget estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DepartmentBudgetItem {
    pub department: String,
    pub canonical_id: String,
    pub this_month: Option<i64>,
    pub fiscal_year_to_date: Option<i64>,
    pub prior_period: Option<i64>,
    pub budget_estimate: Option<i64>,
    /// `this_month / budget_estimate * 100`; absent when the estimate is
    /// zero or absent.
    pub ratio_percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DepartmentComparisonResult {
    pub primary_period: Period,
    pub comparison_period: Option<Period>,
    /// All departments, sorted by descending `ratio_percentage`.
    pub departments: Vec<DepartmentBudgetItem>,
    /// First five of `departments`. With fewer than ten departments this
    /// slice overlaps `bottom_departments`; consumers must not assume the
    /// two are disjoint.
    pub top_departments: Vec<DepartmentBudgetItem>,
    /// Last five of `departments`.
    pub bottom_departments: Vec<DepartmentBudgetItem>,
    pub comparison_departments: Option<Vec<DepartmentBudgetItem>>,
}

impl DepartmentComparisonResult {
    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&schemars::schema_for!(DepartmentComparisonResult))
    }
}
