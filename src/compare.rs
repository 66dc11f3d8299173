use std::cmp::Ordering;

use log::info;

use crate::aliases::AliasTable;
use crate::error::{Result, TreasuryError};
use crate::insight::InsightGenerator;
use crate::schema::{
    BudgetDetailItem, ComparisonResult, DepartmentBudgetItem, DepartmentComparisonResult,
    DetailedChanges, Section, Statement, Summary, SummaryItem,
};
use crate::AnalyzerConfig;

/// Total federal debt outstanding for the periods under comparison, in
/// millions. The statement text does not carry a cumulative debt figure, so
/// it is injected by the caller rather than derived.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebtFigures {
    pub current: Option<i64>,
    pub previous: Option<i64>,
}

/// Period-over-period change in percent. Absent when either value is absent
/// or the previous value is zero; a genuinely new category is not a 0%
/// change from a value that did not exist.
pub fn change_percent(current: Option<i64>, previous: Option<i64>) -> Option<f64> {
    let current = current?;
    let previous = previous?;
    if previous == 0 {
        return None;
    }
    Some((current - previous) as f64 / previous.abs() as f64 * 100.0)
}

/// Aligns two statements by canonical id and derives deltas, rankings and
/// significant changes. Pure: statements are never mutated, results are
/// computed fresh per call.
pub struct ComparisonEngine<'a> {
    aliases: &'a AliasTable,
    insights: &'a InsightGenerator,
    config: &'a AnalyzerConfig,
}

impl<'a> ComparisonEngine<'a> {
    pub fn new(
        aliases: &'a AliasTable,
        insights: &'a InsightGenerator,
        config: &'a AnalyzerConfig,
    ) -> Self {
        Self {
            aliases,
            insights,
            config,
        }
    }

    pub fn compare(
        &self,
        primary: &Statement,
        comparison: Option<&Statement>,
        debt: DebtFigures,
    ) -> Result<ComparisonResult> {
        self.check_valid(primary)?;
        if let Some(comparison) = comparison {
            self.check_valid(comparison)?;
        }

        let receipts = self.detail_section(primary, comparison, Section::Receipts);
        let outlays = self.detail_section(primary, comparison, Section::Outlays);

        let mut significant_changes: Vec<BudgetDetailItem> = receipts
            .iter()
            .chain(outlays.iter())
            .filter(|item| {
                item.change_percent
                    .map(|cp| cp.abs() >= self.config.significance_threshold)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        significant_changes.sort_by(|a, b| {
            magnitude(b)
                .partial_cmp(&magnitude(a))
                .unwrap_or(Ordering::Equal)
        });

        let insights = self.insights.generate(&significant_changes, self.config);

        let result = ComparisonResult {
            primary_period: primary.period,
            comparison_period: comparison.map(|c| c.period),
            summary: self.summarize(primary, comparison, debt),
            detailed: DetailedChanges { receipts, outlays },
            significant_changes,
            insights,
        };
        info!(
            "compared {} against {:?}: {} significant changes, {} insights",
            result.primary_period,
            result.comparison_period.map(|p| p.label()),
            result.significant_changes.len(),
            result.insights.len()
        );
        Ok(result)
    }

    pub fn compare_departments(
        &self,
        primary: &Statement,
        comparison: Option<&Statement>,
    ) -> Result<DepartmentComparisonResult> {
        self.check_valid(primary)?;
        if let Some(comparison) = comparison {
            self.check_valid(comparison)?;
        }

        let departments = self.ranked_departments(primary);
        let n = self.config.ranking_size.min(departments.len());
        let top_departments = departments[..n].to_vec();
        let bottom_departments = departments[departments.len() - n..].to_vec();

        Ok(DepartmentComparisonResult {
            primary_period: primary.period,
            comparison_period: comparison.map(|c| c.period),
            top_departments,
            bottom_departments,
            comparison_departments: comparison.map(|c| self.ranked_departments(c)),
            departments,
        })
    }

    fn check_valid(&self, statement: &Statement) -> Result<()> {
        if !statement.is_valid {
            return Err(TreasuryError::StatementInvalid {
                period: statement.period.label(),
            });
        }
        Ok(())
    }

    fn detail_section(
        &self,
        primary: &Statement,
        comparison: Option<&Statement>,
        section: Section,
    ) -> Vec<BudgetDetailItem> {
        primary
            .section_items(section)
            .map(|item| {
                let previous = comparison
                    .and_then(|c| c.get(&item.canonical_id))
                    .and_then(|prev| prev.this_month);
                BudgetDetailItem {
                    category: self.display_name(&item.canonical_id, &item.raw_label),
                    canonical_id: item.canonical_id.clone(),
                    section,
                    current: item.this_month,
                    previous,
                    change_percent: change_percent(item.this_month, previous),
                    budget_estimate: item.budget_estimate_full_year,
                }
            })
            .collect()
    }

    fn summarize(
        &self,
        primary: &Statement,
        comparison: Option<&Statement>,
        debt: DebtFigures,
    ) -> Summary {
        let totals = |statement: &Statement, section: Section| {
            statement
                .section_total(section)
                .and_then(|total| total.this_month)
        };

        let receipts_current = totals(primary, Section::Receipts);
        let outlays_current = totals(primary, Section::Outlays);
        let receipts_previous = comparison.and_then(|c| totals(c, Section::Receipts));
        let outlays_previous = comparison.and_then(|c| totals(c, Section::Outlays));

        // Positive deficit means outlays exceeded receipts. The figure was
        // cross-checked against the report's own surplus/deficit row when
        // the statement was built.
        let deficit = |receipts: Option<i64>, outlays: Option<i64>| {
            Some(outlays? - receipts?)
        };
        let deficit_current = deficit(receipts_current, outlays_current);
        let deficit_previous = deficit(receipts_previous, outlays_previous);

        Summary {
            receipts: summary_item(receipts_current, receipts_previous),
            outlays: summary_item(outlays_current, outlays_previous),
            deficit: summary_item(deficit_current, deficit_previous),
            debt: summary_item(debt.current, debt.previous),
        }
    }

    /// Every Outlays item-level row at department granularity, sorted by
    /// descending budget-burn ratio. Rows without a defined ratio rank below
    /// every defined one.
    fn ranked_departments(&self, statement: &Statement) -> Vec<DepartmentBudgetItem> {
        let mut departments: Vec<DepartmentBudgetItem> = statement
            .section_items(Section::Outlays)
            .map(|item| {
                let ratio_percentage = match (item.this_month, item.budget_estimate_full_year) {
                    (Some(this_month), Some(estimate)) if estimate != 0 => {
                        Some(this_month as f64 / estimate as f64 * 100.0)
                    }
                    _ => None,
                };
                DepartmentBudgetItem {
                    department: self.display_name(&item.canonical_id, &item.raw_label),
                    canonical_id: item.canonical_id.clone(),
                    this_month: item.this_month,
                    fiscal_year_to_date: item.fiscal_year_to_date,
                    prior_period: item.prior_period_ytd,
                    budget_estimate: item.budget_estimate_full_year,
                    ratio_percentage,
                }
            })
            .collect();

        departments.sort_by(|a, b| {
            descending(a.ratio_percentage, b.ratio_percentage)
                .then_with(|| descending(a.this_month, b.this_month))
        });
        departments
    }

    fn display_name(&self, canonical_id: &str, raw_label: &str) -> String {
        self.aliases
            .display_name(canonical_id)
            .map(str::to_string)
            .unwrap_or_else(|| raw_label.to_string())
    }
}

fn summary_item(current: Option<i64>, previous: Option<i64>) -> SummaryItem {
    SummaryItem {
        current,
        previous,
        change_percent: change_percent(current, previous),
    }
}

fn magnitude(item: &BudgetDetailItem) -> f64 {
    item.change_percent.map(f64::abs).unwrap_or(0.0)
}

/// Descending order with absent values last.
fn descending<T: PartialOrd>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_percent_boundaries() {
        assert_eq!(change_percent(Some(100), Some(80)), Some(25.0));
        assert_eq!(change_percent(Some(80), Some(100)), Some(-20.0));
        // previous of zero or absent is undefined, never infinity or zero
        assert_eq!(change_percent(Some(100), Some(0)), None);
        assert_eq!(change_percent(Some(100), None), None);
        assert_eq!(change_percent(None, Some(100)), None);
    }

    #[test]
    fn test_change_percent_with_negative_previous() {
        // magnitude is relative to |previous|
        assert_eq!(change_percent(Some(-50), Some(-100)), Some(50.0));
        assert_eq!(change_percent(Some(-150), Some(-100)), Some(-50.0));
    }

    #[test]
    fn test_descending_puts_absent_last() {
        let mut values = vec![None, Some(10.0), Some(90.0), None, Some(55.0)];
        values.sort_by(|a, b| descending(*a, *b));
        assert_eq!(
            values,
            vec![Some(90.0), Some(55.0), Some(10.0), None, None]
        );
    }
}
