use anyhow::Result;
use treasury_statement_core::{
    AnalyzerConfig, DebtFigures, Diagnostic, InsightKind, Level, Period, Section, Statement,
    StatementAnalyzer, TreasuryError,
};

/// February 2024 statement. Every column sums exactly to its declared total
/// and the surplus/deficit row equals receipts minus outlays.
const FEBRUARY: &str = "\
MONTHLY TREASURY STATEMENT
Summary of Receipts and Outlays of the U.S. Government
February 2024

Table 1 -- Budget Receipts
  Individual Income Taxes 198,779 926,432 876,120 2,355,223
  Corporation Income Taxes 7,929 87,562 82,110 382,000
  Social Insurance Taxes 111,825 512,340 489,200 1,720,812
  Excise Taxes 4,777 29,815 31,112 95,000
  Miscellaneous Receipts 7,988 41,020 38,650 101,000
  (On-Budget) 265,000 1,277,735 1,213,754 3,723,228
  (Off-Budget) 66,298 319,434 303,438 930,807
  Total Receipts 331,298 1,597,169 1,517,192 4,654,035

Table 2 -- Budget Outlays
  Department of Agriculture 19,140 98,200 95,300 242,000
  Department of Defense--Military Programs 61,355 280,312 261,000 841,000
  Department of Education 13,630 80,100 84,200 184,000
  Department of Health and Human Services 145,068 682,511 640,219 1,650,000
  Department of Transportation 54,000 261,700 249,300 620,000
  Social Security Administration 116,721 489,217 461,900 1,320,000
  Department of the Treasury 88,341 361,100 300,100 438,826
  Interest on Treasury Debt 77,029 357,219 289,200 1,002,503
  Department of Veterans Affairs 25,200 121,400 115,600 301,000
  Other Independent Agencies 2,957 14,800 ..... 35,000
  Total Outlays 603,441 2,746,559 2,496,819 6,634,329
  Surplus or Deficit (-) (272,143) (1,149,390) (979,627) (1,980,294)";

/// January 2024 statement. Department of Defense is written under its short
/// historical label and Other Independent Agencies is absent entirely.
const JANUARY: &str = "\
Table 1 -- Budget Receipts
  Individual Income Taxes 176,370 727,653 690,800 2,355,223
  Corporation Income Taxes 5,918 79,633 75,100 382,000
  Social Insurance Taxes 102,843 400,515 380,100 1,720,812
  Excise Taxes 5,142 25,038 26,200 95,000
  Miscellaneous Receipts 3,677 33,032 31,100 101,000
  Total Receipts 293,950 1,265,871 1,203,300 4,654,035

Table 2 -- Budget Outlays
  Department of Agriculture 18,700 79,060 76,500 242,000
  Defense 61,335 218,957 199,800 841,000
  Department of Education 14,279 66,470 69,100 184,000
  Department of Health and Human Services 140,219 537,443 500,219 1,650,000
  Department of Transportation 52,500 207,700 195,900 620,000
  Social Security Administration 107,682 372,496 354,700 1,320,000
  Department of the Treasury 84,000 272,759 228,900 438,826
  Interest on Treasury Debt 61,720 280,190 227,400 1,002,503
  Department of Veterans Affairs 23,942 96,200 91,100 301,000
  Total Outlays 564,377 2,131,275 1,943,619 6,599,329
  Surplus or Deficit (-) (270,427) (865,404) (740,319) (1,945,294)";

fn build(period: Period, text: &str) -> Statement {
    let analyzer = StatementAnalyzer::new();
    let build = analyzer.build_statement(period, text.lines()).unwrap();
    assert!(
        build.diagnostics.is_empty(),
        "unexpected diagnostics: {:?}",
        build.diagnostics
    );
    assert!(build.statement.is_valid);
    build.statement
}

fn february() -> Statement {
    build(Period::new(2024, 2).unwrap(), FEBRUARY)
}

fn january() -> Statement {
    build(Period::new(2024, 1).unwrap(), JANUARY)
}

#[test]
fn test_full_comparison_pipeline() -> Result<()> {
    let analyzer = StatementAnalyzer::new();
    let feb = february();
    let jan = january();

    let result = analyzer.compare(
        &feb,
        Some(&jan),
        DebtFigures {
            current: Some(34_471_000),
            previous: Some(34_001_000),
        },
    )?;

    assert_eq!(result.primary_period, Period::new(2024, 2)?);
    assert_eq!(result.comparison_period, Some(Period::new(2024, 1)?));

    // Summary rolls up from the total rows, not from re-summed items.
    assert_eq!(result.summary.receipts.current, Some(331_298));
    assert_eq!(result.summary.receipts.previous, Some(293_950));
    let receipts_change = result.summary.receipts.change_percent.unwrap();
    assert!((receipts_change - 12.70).abs() < 0.01);

    assert_eq!(result.summary.outlays.current, Some(603_441));
    assert_eq!(result.summary.outlays.previous, Some(564_377));

    // Positive deficit: outlays exceeded receipts.
    assert_eq!(result.summary.deficit.current, Some(272_143));
    assert_eq!(result.summary.deficit.previous, Some(270_427));

    // Debt is injected, never derived from the statement text.
    assert_eq!(result.summary.debt.current, Some(34_471_000));
    let debt_change = result.summary.debt.change_percent.unwrap();
    assert!((debt_change - 1.38).abs() < 0.01);

    assert_eq!(result.detailed.receipts.len(), 5);
    assert_eq!(result.detailed.outlays.len(), 10);
    Ok(())
}

#[test]
fn test_significant_changes_ordering_and_threshold() -> Result<()> {
    let analyzer = StatementAnalyzer::new();
    let result = analyzer.compare(&february(), Some(&january()), DebtFigures::default())?;

    let ids: Vec<&str> = result
        .significant_changes
        .iter()
        .map(|item| item.canonical_id.as_str())
        .collect();
    assert_eq!(
        ids,
        vec![
            "miscellaneous_receipts",          // +117.2%
            "corporation_income_taxes",        // +34.0%
            "interest_on_treasury_debt",       // +24.8%
            "individual_income_taxes",         // +12.7%
            "social_insurance_taxes",          // +8.7%
            "social_security_administration",  // +8.4%
            "excise_taxes",                    // -7.1%
            "department_of_veterans_affairs",  // +5.3%
            "department_of_the_treasury",      // +5.2%
        ]
    );

    // Defense moved 61,335 -> 61,355, about +0.03%: below the threshold.
    assert!(!ids.contains(&"department_of_defense"));
    Ok(())
}

#[test]
fn test_new_category_has_undefined_change_and_is_not_significant() -> Result<()> {
    let analyzer = StatementAnalyzer::new();
    let result = analyzer.compare(&february(), Some(&january()), DebtFigures::default())?;

    let independent = result
        .detailed
        .outlays
        .iter()
        .find(|item| item.canonical_id == "other_independent_agencies")
        .unwrap();

    assert_eq!(independent.current, Some(2_957));
    assert_eq!(independent.previous, None);
    assert_eq!(independent.change_percent, None);
    assert!(!result
        .significant_changes
        .iter()
        .any(|item| item.canonical_id == "other_independent_agencies"));
    Ok(())
}

#[test]
fn test_exactly_one_warning_for_interest_cost_growth() -> Result<()> {
    let analyzer = StatementAnalyzer::new();
    let result = analyzer.compare(&february(), Some(&january()), DebtFigures::default())?;

    // Nine significant changes against a default cap of eight.
    assert_eq!(result.insights.len(), 8);

    let warnings: Vec<_> = result
        .insights
        .iter()
        .filter(|insight| insight.kind == InsightKind::Warning)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("Interest on Treasury Debt"));
    assert!(warnings[0].message.contains("24.8%"));
    assert!(warnings[0]
        .description
        .as_deref()
        .unwrap()
        .contains("interest expenses"));
    Ok(())
}

#[test]
fn test_department_ranking_is_disjoint_with_ten_departments() -> Result<()> {
    let analyzer = StatementAnalyzer::new();
    let result = analyzer.compare_departments(&february(), Some(&january()))?;

    assert_eq!(result.departments.len(), 10);
    assert_eq!(result.top_departments.len(), 5);
    assert_eq!(result.bottom_departments.len(), 5);

    // Treasury spent 88,341 of a 438,826 estimate, about 20%: the clear top.
    assert_eq!(
        result.top_departments[0].canonical_id,
        "department_of_the_treasury"
    );
    let top_ratio = result.top_departments[0].ratio_percentage.unwrap();
    assert!((top_ratio - 20.13).abs() < 0.01);

    // Defense has the lowest budget-burn ratio of the ten.
    assert_eq!(
        result.bottom_departments.last().unwrap().canonical_id,
        "department_of_defense"
    );

    let top_ids: Vec<&str> = result
        .top_departments
        .iter()
        .map(|d| d.canonical_id.as_str())
        .collect();
    for bottom in &result.bottom_departments {
        assert!(!top_ids.contains(&bottom.canonical_id.as_str()));
    }

    let comparison = result.comparison_departments.unwrap();
    assert_eq!(comparison.len(), 9);
    Ok(())
}

#[test]
fn test_department_ranking_overlaps_below_ten() {
    let analyzer = StatementAnalyzer::new();
    let report = "\
Budget Outlays
  Department of Defense 10 40 35 120
  Department of Education 20 80 70 120
  Department of Labor 30 120 105 120";

    let build = analyzer
        .build_statement(Period::new(2024, 5).unwrap(), report.lines())
        .unwrap();
    let result = analyzer
        .compare_departments(&build.statement, None)
        .unwrap();

    // Three departments: both slices hold all three, overlapping by design.
    assert_eq!(result.top_departments.len(), 3);
    assert_eq!(result.bottom_departments.len(), 3);
    assert_eq!(
        result.top_departments[0].canonical_id,
        "department_of_labor"
    );
    assert_eq!(
        result.bottom_departments[0].canonical_id,
        "department_of_labor"
    );
}

#[test]
fn test_departments_without_estimate_rank_last() {
    let analyzer = StatementAnalyzer::new();
    let report = "\
Budget Outlays
  Department of Defense 10 40 35 100
  Department of Education 500 2,000 1,800 .....
  Department of Labor 30 120 105 100";

    let build = analyzer
        .build_statement(Period::new(2024, 5).unwrap(), report.lines())
        .unwrap();
    let result = analyzer
        .compare_departments(&build.statement, None)
        .unwrap();

    // Education spent the most but has no estimate, so its ratio is
    // undefined and it cannot claim a budget-burn rank.
    let last = result.departments.last().unwrap();
    assert_eq!(last.canonical_id, "department_of_education");
    assert_eq!(last.ratio_percentage, None);
}

#[test]
fn test_round_trip_through_rendered_report() {
    fn group(value: i64) -> String {
        let digits: Vec<u8> = value.abs().to_string().into_bytes();
        let mut grouped = String::new();
        for (i, b) in digits.iter().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(*b as char);
        }
        grouped
    }

    fn render_value(value: Option<i64>) -> String {
        match value {
            Some(v) if v < 0 => format!("({})", group(v)),
            Some(v) => group(v),
            None => ".....".to_string(),
        }
    }

    fn render(statement: &Statement) -> String {
        let mut text = String::new();
        for section in [Section::Receipts, Section::Outlays] {
            text.push_str(match section {
                Section::Receipts => "Budget Receipts\n",
                Section::Outlays => "Budget Outlays\n",
            });
            for item in statement
                .line_items
                .iter()
                .filter(|item| item.section == section)
            {
                let values: Vec<String> =
                    item.values().iter().copied().map(render_value).collect();
                text.push_str(&format!("  {} {}\n", item.raw_label, values.join(" ")));
            }
        }
        text
    }

    let analyzer = StatementAnalyzer::new();
    let original = february();

    let rendered = render(&original);
    let rebuilt = analyzer
        .build_statement(original.period, rendered.lines())
        .unwrap();

    assert!(rebuilt.diagnostics.is_empty());
    assert_eq!(rebuilt.statement, original);
}

#[test]
fn test_comparison_against_invalid_statement_is_refused() {
    let analyzer = StatementAnalyzer::new();
    let feb = february();

    let broken = "\
Budget Receipts
  Individual Income Taxes 100,000 ..... ..... .....
  Total Receipts 250,000 ..... ..... .....";
    let build = analyzer
        .build_statement(Period::new(2024, 1).unwrap(), broken.lines())
        .unwrap();
    assert!(!build.statement.is_valid);
    assert!(build
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::HierarchyViolation { .. })));

    let err = analyzer
        .compare(&feb, Some(&build.statement), DebtFigures::default())
        .unwrap_err();
    assert!(matches!(err, TreasuryError::StatementInvalid { .. }));
}

#[test]
fn test_unknown_label_is_kept_with_warning_diagnostic() {
    let analyzer = StatementAnalyzer::new();
    let report = "\
Budget Outlays
  National Cheese Reserve 12 48 44 150";

    let build = analyzer
        .build_statement(Period::new(2024, 6).unwrap(), report.lines())
        .unwrap();

    let item = build.statement.get("national_cheese_reserve").unwrap();
    assert_eq!(item.this_month, Some(12));
    assert_eq!(item.level, Level::Item);
    assert_eq!(
        build.diagnostics,
        vec![Diagnostic::UnknownLabel {
            raw_label: "National Cheese Reserve".to_string(),
            fallback_id: "national_cheese_reserve".to_string(),
        }]
    );
}

#[test]
fn test_raised_significance_threshold_filters_more() -> Result<()> {
    let analyzer = StatementAnalyzer::with_config(AnalyzerConfig {
        significance_threshold: 30.0,
        ..AnalyzerConfig::default()
    })?;

    let feb = build_with(&analyzer, Period::new(2024, 2)?, FEBRUARY);
    let jan = build_with(&analyzer, Period::new(2024, 1)?, JANUARY);
    let result = analyzer.compare(&feb, Some(&jan), DebtFigures::default())?;

    let ids: Vec<&str> = result
        .significant_changes
        .iter()
        .map(|item| item.canonical_id.as_str())
        .collect();
    assert_eq!(ids, vec!["miscellaneous_receipts", "corporation_income_taxes"]);
    Ok(())
}

fn build_with(analyzer: &StatementAnalyzer, period: Period, text: &str) -> Statement {
    let build = analyzer.build_statement(period, text.lines()).unwrap();
    assert!(build.statement.is_valid);
    build.statement
}
