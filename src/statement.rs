use std::collections::HashMap;

use log::{info, warn};

use crate::aliases::{SURPLUS_OR_DEFICIT, TOTAL_OUTLAYS, TOTAL_RECEIPTS};
use crate::error::{Diagnostic, Result, TreasuryError};
use crate::period::Period;
use crate::schema::{Level, LineItem, Section, Statement, VALUE_COLUMNS};

/// A built statement together with every recoverable condition met on the
/// way. The statement may be flagged invalid; it is still returned so the
/// caller can render it with caveats.
#[derive(Debug, Clone)]
pub struct StatementBuild {
    pub statement: Statement,
    pub diagnostics: Vec<Diagnostic>,
}

/// Assembles normalized line items into an immutable `Statement`, enforcing
/// canonical-id uniqueness and validating declared totals against their
/// summed items.
pub struct StatementBuilder {
    /// Relative tolerance for total validation. Reports note that details
    /// may not add to totals due to rounding.
    tolerance: f64,
}

impl StatementBuilder {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn build(
        &self,
        period: Period,
        items: Vec<LineItem>,
        mut diagnostics: Vec<Diagnostic>,
    ) -> Result<StatementBuild> {
        let mut seen: HashMap<&str, &str> = HashMap::new();
        for item in &items {
            if let Some(first_label) = seen.insert(&item.canonical_id, &item.raw_label) {
                // A collision means two labels normalized to one id. That is
                // an alias-table defect to fix, not something to merge over.
                return Err(TreasuryError::DuplicateItem {
                    canonical_id: item.canonical_id.clone(),
                    first_label: first_label.to_string(),
                    second_label: item.raw_label.clone(),
                });
            }
        }

        let mut valid = true;
        for section in [Section::Receipts, Section::Outlays] {
            valid &= self.validate_section(section, &items, &mut diagnostics);
        }
        valid &= self.validate_deficit_row(&items, &mut diagnostics);

        let statement = Statement {
            period,
            line_items: items,
            is_valid: valid,
        };
        info!(
            "built statement for {}: {} items, {} diagnostics, valid={}",
            statement.period,
            statement.line_items.len(),
            diagnostics.len(),
            statement.is_valid
        );

        Ok(StatementBuild {
            statement,
            diagnostics,
        })
    }

    /// Checks each declared section-total column against the sum of the
    /// section's item-level values. Subtotal rows (on-/off-budget splits)
    /// are excluded from the sum to avoid double counting.
    fn validate_section(
        &self,
        section: Section,
        items: &[LineItem],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> bool {
        let total = match items.iter().find(|i| {
            i.section == section && i.level == Level::Total && i.canonical_id != SURPLUS_OR_DEFICIT
        }) {
            Some(total) => total,
            None => return true,
        };

        let mut valid = true;
        for (column_index, column) in VALUE_COLUMNS.iter().enumerate() {
            let declared = match total.values()[column_index] {
                Some(declared) => declared,
                None => continue,
            };

            let computed: i64 = items
                .iter()
                .filter(|i| i.section == section && i.level == Level::Item)
                .filter_map(|i| i.values()[column_index])
                .sum();

            if !self.within_tolerance(declared, computed) {
                warn!(
                    "{:?} {} total {} diverges from summed items {}",
                    section, column, declared, computed
                );
                diagnostics.push(Diagnostic::HierarchyViolation {
                    section,
                    column: column.to_string(),
                    declared,
                    computed,
                });
                valid = false;
            }
        }
        valid
    }

    /// The surplus/deficit row is the report's own receipts-minus-outlays
    /// figure; it is the source of truth the derived deficit must agree
    /// with. Signs are compared by magnitude since report vintages differ in
    /// how they print the deficit sign.
    fn validate_deficit_row(&self, items: &[LineItem], diagnostics: &mut Vec<Diagnostic>) -> bool {
        let deficit_row = match items.iter().find(|i| i.canonical_id == SURPLUS_OR_DEFICIT) {
            Some(row) => row,
            None => return true,
        };
        let receipts = items.iter().find(|i| i.canonical_id == TOTAL_RECEIPTS);
        let outlays = items.iter().find(|i| i.canonical_id == TOTAL_OUTLAYS);
        let (receipts, outlays) = match (receipts, outlays) {
            (Some(r), Some(o)) => (r, o),
            _ => return true,
        };

        let mut valid = true;
        for (column_index, column) in VALUE_COLUMNS.iter().enumerate() {
            let declared = deficit_row.values()[column_index];
            let receipts_value = receipts.values()[column_index];
            let outlays_value = outlays.values()[column_index];
            let (declared, receipts_value, outlays_value) =
                match (declared, receipts_value, outlays_value) {
                    (Some(d), Some(r), Some(o)) => (d, r, o),
                    _ => continue,
                };

            let computed = receipts_value - outlays_value;
            if !self.within_tolerance(declared.abs(), computed.abs()) {
                warn!(
                    "surplus/deficit row {} {} disagrees with receipts - outlays = {}",
                    column, declared, computed
                );
                diagnostics.push(Diagnostic::DeficitMismatch {
                    column: column.to_string(),
                    declared,
                    computed,
                });
                valid = false;
            }
        }
        valid
    }

    fn within_tolerance(&self, declared: i64, computed: i64) -> bool {
        let denominator = declared.abs().max(1) as f64;
        (declared - computed).abs() as f64 / denominator <= self.tolerance
    }
}
