use chrono::Month;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, TreasuryError};

/// One reporting period of a Monthly Treasury Statement.
///
/// Orders chronologically, so periods can be sorted or compared directly.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(TreasuryError::InvalidMonth(month));
        }
        Ok(Self { year, month })
    }

    /// Parses the statement-id convention used by the document acquisition
    /// layer: `mts0224` is February 2024. Two-digit years are 21st century.
    pub fn from_statement_id(id: &str) -> Result<Self> {
        let digits = id
            .strip_prefix("mts")
            .ok_or_else(|| TreasuryError::PeriodFormat(id.to_string()))?;

        if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TreasuryError::PeriodFormat(id.to_string()));
        }

        let month: u32 = digits[..2]
            .parse()
            .map_err(|_| TreasuryError::PeriodFormat(id.to_string()))?;
        let year: i32 = digits[2..]
            .parse()
            .map_err(|_| TreasuryError::PeriodFormat(id.to_string()))?;

        Self::new(2000 + year, month).map_err(|_| TreasuryError::PeriodFormat(id.to_string()))
    }

    /// Display label in the form the source reports use, e.g. "February 2024".
    pub fn label(&self) -> String {
        let name = Month::try_from(self.month as u8)
            .map(|m| m.name())
            .unwrap_or("Unknown");
        format!("{} {}", name, self.year)
    }

    /// The federal fiscal year this period falls in. The fiscal year starts
    /// in October and is numbered by the calendar year it ends in.
    pub fn fiscal_year(&self) -> i32 {
        if self.month >= 10 {
            self.year + 1
        } else {
            self.year
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
