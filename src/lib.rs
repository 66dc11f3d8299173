//! # Treasury Statement Core
//!
//! A library for turning Monthly Treasury Statements (fixed-format
//! government financial reports) into structured data and computing rigorous
//! period-over-period comparisons.
//!
//! ## Core Concepts
//!
//! - **Statement**: one parsed report for a single period, an immutable
//!   sequence of canonical line items
//! - **Canonical id**: normalized, alias-resolved identifier for a report
//!   category, stable across periods and label variants
//! - **Absent values**: the report's no-transaction placeholder is kept as an
//!   explicit absent value, never conflated with zero
//! - **Diagnostics**: recoverable parse conditions are accumulated and
//!   returned alongside the data, so callers render best-effort results with
//!   visible caveats
//!
//! ## Example
//!
//! ```rust,ignore
//! use treasury_statement_core::{DebtFigures, Period, StatementAnalyzer};
//!
//! let analyzer = StatementAnalyzer::new();
//!
//! let february = analyzer
//!     .build_statement(Period::new(2024, 2)?, report_text.lines())?;
//! let january = analyzer
//!     .build_statement(Period::new(2024, 1)?, prior_text.lines())?;
//!
//! let result = analyzer.compare(
//!     &february.statement,
//!     Some(&january.statement),
//!     DebtFigures { current: Some(34_471_000), previous: Some(34_001_000) },
//! )?;
//! ```

pub mod aliases;
pub mod compare;
pub mod error;
pub mod insight;
pub mod normalizer;
pub mod parser;
pub mod period;
pub mod schema;
pub mod statement;

pub use aliases::{AliasTable, CanonicalEntry, REGISTRY_VERSION};
pub use compare::{change_percent, ComparisonEngine, DebtFigures};
pub use error::{Diagnostic, Result, TreasuryError};
pub use insight::{Direction, InsightGenerator};
pub use normalizer::{fallback_id, normalize_label, SchemaNormalizer};
pub use parser::{LineParser, ParsedLine};
pub use period::Period;
pub use schema::*;
pub use statement::{StatementBuild, StatementBuilder};

use log::{debug, info, warn};

/// Tunable thresholds for statement validation and comparison. The defaults
/// match the source reports' conventions.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Relative tolerance for total-vs-items validation. Reports note that
    /// details may not add to totals due to rounding.
    pub total_tolerance: f64,
    /// Minimum absolute change percent for a detail item to count as a
    /// significant change.
    pub significance_threshold: f64,
    /// Outlay increases at or above this percent are emitted as warnings.
    pub warning_threshold: f64,
    /// Maximum number of insights returned per comparison.
    pub max_insights: usize,
    /// Size of the top/bottom department ranking slices.
    pub ranking_size: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            total_tolerance: 0.005,
            significance_threshold: 5.0,
            warning_threshold: 20.0,
            max_insights: 8,
            ranking_size: 5,
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.total_tolerance > 0.0 && self.total_tolerance < 1.0) {
            return Err(TreasuryError::InvalidConfig(format!(
                "total_tolerance {} must be between 0 and 1",
                self.total_tolerance
            )));
        }
        if self.significance_threshold < 0.0 || self.warning_threshold < 0.0 {
            return Err(TreasuryError::InvalidConfig(
                "thresholds must be non-negative".to_string(),
            ));
        }
        if self.ranking_size == 0 {
            return Err(TreasuryError::InvalidConfig(
                "ranking_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// The full pipeline: line grammar, alias table and insight rules compiled
/// once, then reused across statements and comparisons. All methods are pure
/// transformations, so one analyzer can serve concurrent callers.
pub struct StatementAnalyzer {
    parser: LineParser,
    normalizer: SchemaNormalizer,
    builder: StatementBuilder,
    insights: InsightGenerator,
    config: AnalyzerConfig,
}

impl StatementAnalyzer {
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::default())
            .expect("default configuration is valid")
    }

    pub fn with_config(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            parser: LineParser::new(),
            normalizer: SchemaNormalizer::new(AliasTable::builtin()),
            builder: StatementBuilder::new(config.total_tolerance),
            insights: InsightGenerator::builtin(),
            config,
        })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn aliases(&self) -> &AliasTable {
        self.normalizer.aliases()
    }

    /// Parses the raw lines of one report into a `Statement`. Section
    /// context is established by the report's own header lines; anything
    /// before the first header is preamble and is skipped. Malformed lines
    /// are recorded and skipped, never fatal to the rest of the statement.
    pub fn build_statement<'a, I>(&self, period: Period, lines: I) -> Result<StatementBuild>
    where
        I: IntoIterator<Item = &'a str>,
    {
        info!("building statement for {}", period);
        let mut diagnostics = Vec::new();
        let mut items = Vec::new();
        let mut section: Option<Section> = None;

        for (index, line) in lines.into_iter().enumerate() {
            let line_number = index + 1;
            if line.trim().is_empty() {
                continue;
            }
            if let Some(next) = self.parser.section_header(line) {
                debug!("line {}: entering {:?} section", line_number, next);
                section = Some(next);
                continue;
            }
            let Some(current_section) = section else {
                debug!("line {}: preamble, skipped", line_number);
                continue;
            };

            match self.parser.parse_line(line, line_number) {
                Ok(parsed) => {
                    if let Some(item) =
                        self.normalizer
                            .normalize(&parsed, current_section, &mut diagnostics)
                    {
                        items.push(item);
                    }
                }
                Err(TreasuryError::MalformedLine { line_number, reason }) => {
                    warn!("line {}: {} (skipped)", line_number, reason);
                    diagnostics.push(Diagnostic::MalformedLine {
                        line_number,
                        content: line.to_string(),
                        reason,
                    });
                }
                Err(other) => return Err(other),
            }
        }

        self.builder.build(period, items, diagnostics)
    }

    /// Compares a primary statement against an optional comparison
    /// statement. With no comparison, every `previous`/`change_percent`
    /// field is absent and `significant_changes`/`insights` are empty.
    pub fn compare(
        &self,
        primary: &Statement,
        comparison: Option<&Statement>,
        debt: DebtFigures,
    ) -> Result<ComparisonResult> {
        self.engine().compare(primary, comparison, debt)
    }

    /// Department-level budget-burn ranking across one or two statements.
    pub fn compare_departments(
        &self,
        primary: &Statement,
        comparison: Option<&Statement>,
    ) -> Result<DepartmentComparisonResult> {
        self.engine().compare_departments(primary, comparison)
    }

    fn engine(&self) -> ComparisonEngine<'_> {
        ComparisonEngine::new(self.normalizer.aliases(), &self.insights, &self.config)
    }
}

impl Default for StatementAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot convenience over [`StatementAnalyzer::build_statement`].
pub fn build_statement<'a, I>(period: Period, lines: I) -> Result<StatementBuild>
where
    I: IntoIterator<Item = &'a str>,
{
    StatementAnalyzer::new().build_statement(period, lines)
}

/// One-shot convenience over [`StatementAnalyzer::compare`].
pub fn compare_statements(
    primary: &Statement,
    comparison: Option<&Statement>,
    debt: DebtFigures,
) -> Result<ComparisonResult> {
    StatementAnalyzer::new().compare(primary, comparison, debt)
}
