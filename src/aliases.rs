use std::collections::HashMap;

use log::warn;

use crate::normalizer::normalize_label;
use crate::schema::{Level, Section};

pub const TOTAL_RECEIPTS: &str = "total_receipts";
pub const TOTAL_OUTLAYS: &str = "total_outlays";
pub const SURPLUS_OR_DEFICIT: &str = "surplus_or_deficit";
pub const INTEREST_ON_TREASURY_DEBT: &str = "interest_on_treasury_debt";

/// Bumped whenever the seeded registry below changes shape or content.
pub const REGISTRY_VERSION: u32 = 1;

#[derive(Debug, Clone)]
pub struct CanonicalEntry {
    pub id: &'static str,
    pub display_name: &'static str,
    pub section: Section,
    pub level: Level,
}

struct Seed {
    id: &'static str,
    display_name: &'static str,
    section: Section,
    level: Level,
    aliases: &'static [&'static str],
}

const fn seed(
    id: &'static str,
    display_name: &'static str,
    section: Section,
    level: Level,
    aliases: &'static [&'static str],
) -> Seed {
    Seed {
        id,
        display_name,
        section,
        level,
        aliases,
    }
}

/// Canonical categories of the Monthly Treasury Statement budget table,
/// with the historical label variants observed across report vintages.
const REGISTRY: &[Seed] = &[
    // Receipts
    seed(
        "individual_income_taxes",
        "Individual Income Taxes",
        Section::Receipts,
        Level::Item,
        &["individual income tax"],
    ),
    seed(
        "corporation_income_taxes",
        "Corporation Income Taxes",
        Section::Receipts,
        Level::Item,
        &["corporate income taxes"],
    ),
    seed(
        "social_insurance_taxes",
        "Social Insurance and Retirement Receipts",
        Section::Receipts,
        Level::Item,
        &["social insurance taxes", "social insurance and retirement"],
    ),
    seed(
        "excise_taxes",
        "Excise Taxes",
        Section::Receipts,
        Level::Item,
        &[],
    ),
    seed(
        "estate_and_gift_taxes",
        "Estate and Gift Taxes",
        Section::Receipts,
        Level::Item,
        &[],
    ),
    seed(
        "customs_duties",
        "Customs Duties",
        Section::Receipts,
        Level::Item,
        &[],
    ),
    seed(
        "miscellaneous_receipts",
        "Miscellaneous Receipts",
        Section::Receipts,
        Level::Item,
        &["other", "other receipts"],
    ),
    seed(
        "receipts_on_budget",
        "(On-Budget)",
        Section::Receipts,
        Level::Subtotal,
        &["on-budget"],
    ),
    seed(
        "receipts_off_budget",
        "(Off-Budget)",
        Section::Receipts,
        Level::Subtotal,
        &["off-budget"],
    ),
    seed(
        TOTAL_RECEIPTS,
        "Total Receipts",
        Section::Receipts,
        Level::Total,
        &["total--budget receipts", "total budget receipts"],
    ),
    // Outlays
    seed(
        "legislative_branch",
        "Legislative Branch",
        Section::Outlays,
        Level::Item,
        &[],
    ),
    seed(
        "judicial_branch",
        "Judicial Branch",
        Section::Outlays,
        Level::Item,
        &[],
    ),
    seed(
        "department_of_agriculture",
        "Department of Agriculture",
        Section::Outlays,
        Level::Item,
        &["agriculture"],
    ),
    seed(
        "department_of_commerce",
        "Department of Commerce",
        Section::Outlays,
        Level::Item,
        &["commerce"],
    ),
    seed(
        "department_of_defense",
        "Department of Defense",
        Section::Outlays,
        Level::Item,
        &[
            "defense",
            "department of defense--military programs",
            "department of defense military programs",
        ],
    ),
    seed(
        "department_of_education",
        "Department of Education",
        Section::Outlays,
        Level::Item,
        &["education"],
    ),
    seed(
        "department_of_energy",
        "Department of Energy",
        Section::Outlays,
        Level::Item,
        &["energy"],
    ),
    seed(
        "department_of_health_and_human_services",
        "Department of Health and Human Services",
        Section::Outlays,
        Level::Item,
        &["health and human services", "hhs"],
    ),
    seed(
        "department_of_homeland_security",
        "Department of Homeland Security",
        Section::Outlays,
        Level::Item,
        &["homeland security"],
    ),
    seed(
        "department_of_housing_and_urban_development",
        "Department of Housing and Urban Development",
        Section::Outlays,
        Level::Item,
        &["housing and urban development", "hud"],
    ),
    seed(
        "department_of_the_interior",
        "Department of the Interior",
        Section::Outlays,
        Level::Item,
        &["interior", "department of interior"],
    ),
    seed(
        "department_of_justice",
        "Department of Justice",
        Section::Outlays,
        Level::Item,
        &["justice"],
    ),
    seed(
        "department_of_labor",
        "Department of Labor",
        Section::Outlays,
        Level::Item,
        &["labor"],
    ),
    seed(
        "department_of_state",
        "Department of State",
        Section::Outlays,
        Level::Item,
        &["state"],
    ),
    seed(
        "department_of_transportation",
        "Department of Transportation",
        Section::Outlays,
        Level::Item,
        &["transportation"],
    ),
    seed(
        "department_of_the_treasury",
        "Department of the Treasury",
        Section::Outlays,
        Level::Item,
        &["treasury", "department of treasury"],
    ),
    seed(
        "department_of_veterans_affairs",
        "Department of Veterans Affairs",
        Section::Outlays,
        Level::Item,
        &["veterans affairs"],
    ),
    seed(
        "environmental_protection_agency",
        "Environmental Protection Agency",
        Section::Outlays,
        Level::Item,
        &["epa"],
    ),
    seed(
        "social_security_administration",
        "Social Security Administration",
        Section::Outlays,
        Level::Item,
        &[],
    ),
    seed(
        "other_independent_agencies",
        "Other Independent Agencies",
        Section::Outlays,
        Level::Item,
        &["independent agencies"],
    ),
    seed(
        INTEREST_ON_TREASURY_DEBT,
        "Interest on Treasury Debt",
        Section::Outlays,
        Level::Item,
        &["interest on the public debt"],
    ),
    seed(
        "outlays_on_budget",
        "(On-Budget)",
        Section::Outlays,
        Level::Subtotal,
        &["on-budget"],
    ),
    seed(
        "outlays_off_budget",
        "(Off-Budget)",
        Section::Outlays,
        Level::Subtotal,
        &["off-budget"],
    ),
    seed(
        TOTAL_OUTLAYS,
        "Total Outlays",
        Section::Outlays,
        Level::Total,
        &["total--budget outlays", "total budget outlays"],
    ),
    seed(
        SURPLUS_OR_DEFICIT,
        "Surplus or Deficit",
        Section::Outlays,
        Level::Total,
        &[
            "surplus or deficit (-)",
            "surplus/deficit (-)",
            "total surplus (+) or deficit (-)",
            "deficit",
        ],
    ),
];

/// Label-to-canonical-id mapping, built once at startup and read-only
/// afterwards. Alias keys are stored normalized and scoped by section, since
/// the on-/off-budget split rows print the same label in both sections.
pub struct AliasTable {
    entries: HashMap<&'static str, CanonicalEntry>,
    aliases: HashMap<(Section, String), &'static str>,
}

impl AliasTable {
    pub fn builtin() -> Self {
        let mut entries = HashMap::new();
        let mut aliases: HashMap<(Section, String), &'static str> = HashMap::new();

        for seed in REGISTRY {
            entries.insert(
                seed.id,
                CanonicalEntry {
                    id: seed.id,
                    display_name: seed.display_name,
                    section: seed.section,
                    level: seed.level,
                },
            );

            let mut register = |label: &str| {
                let key = (seed.section, normalize_label(label));
                if let Some(existing) = aliases.insert(key.clone(), seed.id) {
                    if existing != seed.id {
                        warn!(
                            "alias '{}' ({:?}) registered for both '{}' and '{}'",
                            key.1, seed.section, existing, seed.id
                        );
                    }
                }
            };

            register(seed.display_name);
            for alias in seed.aliases {
                register(alias);
            }
        }

        Self { entries, aliases }
    }

    pub fn resolve(&self, section: Section, normalized_label: &str) -> Option<&CanonicalEntry> {
        let id = self
            .aliases
            .get(&(section, normalized_label.to_string()))?;
        self.entries.get(id)
    }

    pub fn entry(&self, canonical_id: &str) -> Option<&CanonicalEntry> {
        self.entries.get(canonical_id)
    }

    /// Display name for a canonical id, or `None` for fallback ids minted
    /// from unknown labels.
    pub fn display_name(&self, canonical_id: &str) -> Option<&'static str> {
        self.entries.get(canonical_id).map(|e| e.display_name)
    }

    pub fn version(&self) -> u32 {
        REGISTRY_VERSION
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
