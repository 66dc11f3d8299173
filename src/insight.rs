use log::debug;

use crate::schema::{BudgetDetailItem, Insight, InsightKind, Section};
use crate::AnalyzerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increase,
    Decrease,
}

struct InsightRule {
    canonical_id: &'static str,
    direction: Direction,
    description: &'static str,
}

/// Explanatory text keyed by canonical category and direction. Extending
/// coverage means adding rows here, not generating free text.
const RULES: &[InsightRule] = &[
    InsightRule {
        canonical_id: "interest_on_treasury_debt",
        direction: Direction::Increase,
        description:
            "Rising interest rates and increased federal debt are driving higher interest expenses.",
    },
    InsightRule {
        canonical_id: "individual_income_taxes",
        direction: Direction::Increase,
        description:
            "Strong labor market and wage growth are contributing to higher income tax receipts.",
    },
    InsightRule {
        canonical_id: "social_insurance_taxes",
        direction: Direction::Increase,
        description:
            "Employment growth and wage increases are driving higher payroll tax collections.",
    },
];

/// Turns the significant-changes set into ordered, severity-tagged insight
/// records. Stateless; the rule table is read-only after construction.
pub struct InsightGenerator {
    rules: &'static [InsightRule],
}

impl InsightGenerator {
    pub fn builtin() -> Self {
        Self { rules: RULES }
    }

    /// `significant_changes` must already be ordered by descending change
    /// magnitude; the cap truncates that ordering before rule evaluation.
    pub fn generate(
        &self,
        significant_changes: &[BudgetDetailItem],
        config: &AnalyzerConfig,
    ) -> Vec<Insight> {
        significant_changes
            .iter()
            .take(config.max_insights)
            .filter_map(|item| self.evaluate(item, config))
            .collect()
    }

    fn evaluate(&self, item: &BudgetDetailItem, config: &AnalyzerConfig) -> Option<Insight> {
        let change = item.change_percent?;
        let direction = if change >= 0.0 {
            Direction::Increase
        } else {
            Direction::Decrease
        };

        // Cost growth is risk-flagged more aggressively than receipts growth.
        let kind = if item.section == Section::Outlays
            && direction == Direction::Increase
            && change >= config.warning_threshold
        {
            InsightKind::Warning
        } else {
            InsightKind::Info
        };

        let noun = match item.section {
            Section::Receipts => "receipts",
            Section::Outlays => "outlays",
        };
        let verb = match direction {
            Direction::Increase => "increased",
            Direction::Decrease => "decreased",
        };
        let message = format!(
            "{} {} have {} by {:.1}% compared to the prior period",
            item.category,
            noun,
            verb,
            change.abs()
        );

        let description = self
            .rules
            .iter()
            .find(|rule| rule.canonical_id == item.canonical_id && rule.direction == direction)
            .map(|rule| rule.description.to_string());

        debug!("insight for {}: {:?}", item.canonical_id, kind);
        Some(Insight {
            kind,
            message,
            description,
        })
    }
}
