use log::debug;
use regex::Regex;

use crate::error::{Result, TreasuryError};
use crate::schema::Section;

/// One raw report line split into its label and value columns.
///
/// `values` is `None` for heading/footnote lines that carry no value columns
/// at all; an individual `None` inside the array is the no-transaction
/// placeholder, which is distinct from zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub label: String,
    /// Leading whitespace count, preserved for hierarchy inference. Not
    /// itself the canonical level.
    pub indent: usize,
    pub values: Option<[Option<i64>; 4]>,
}

/// Splits fixed-format report lines into a label and up to four
/// right-aligned numeric tokens. The grammar is compiled once and the parser
/// is reused across lines and statements.
pub struct LineParser {
    number_re: Regex,
    placeholder_re: Regex,
}

impl LineParser {
    pub fn new() -> Self {
        // Optional parentheses (negative), optional sign, comma-grouped or
        // plain digit runs.
        let number_re = Regex::new(r"^\(?-?(?:\d{1,3}(?:,\d{3})+|\d+)\)?$")
            .expect("number token pattern is valid");
        // A run of dots is the report's no-transaction placeholder.
        let placeholder_re = Regex::new(r"^\.+$").expect("placeholder pattern is valid");

        Self {
            number_re,
            placeholder_re,
        }
    }

    /// Recognizes the section header lines that establish parsing context.
    pub fn section_header(&self, line: &str) -> Option<Section> {
        let lowered = line.to_lowercase();
        if lowered.contains("budget receipts") {
            Some(Section::Receipts)
        } else if lowered.contains("budget outlays") {
            Some(Section::Outlays)
        } else {
            None
        }
    }

    pub fn parse_line(&self, line: &str, line_number: usize) -> Result<ParsedLine> {
        let indent = line.chars().take_while(|c| c.is_whitespace()).count();
        let tokens: Vec<&str> = line.split_whitespace().collect();

        // Count the trailing run of value tokens.
        let trailing = tokens
            .iter()
            .rev()
            .take_while(|t| self.parse_token(t).is_some())
            .count();

        let label_tokens = &tokens[..tokens.len() - trailing];
        if label_tokens.is_empty() {
            return Err(TreasuryError::MalformedLine {
                line_number,
                reason: "empty label".to_string(),
            });
        }

        let values = match trailing {
            0 => None,
            4 => {
                let mut columns = [None; 4];
                for (slot, token) in columns.iter_mut().zip(&tokens[tokens.len() - 4..]) {
                    // take_while above guarantees the token parses
                    *slot = self.parse_token(token).flatten();
                }
                Some(columns)
            }
            n => {
                return Err(TreasuryError::MalformedLine {
                    line_number,
                    reason: format!("expected 0 or 4 value columns, found {}", n),
                });
            }
        };

        let parsed = ParsedLine {
            label: label_tokens.join(" "),
            indent,
            values,
        };
        debug!("line {}: parsed {:?}", line_number, parsed);
        Ok(parsed)
    }

    /// `None` if the token is not a value token at all; `Some(None)` for the
    /// placeholder; `Some(Some(v))` for a number, in report units (millions).
    fn parse_token(&self, token: &str) -> Option<Option<i64>> {
        if self.placeholder_re.is_match(token) {
            return Some(None);
        }
        if !self.number_re.is_match(token) {
            return None;
        }

        let mut negative = false;
        let mut digits = token;
        if let Some(inner) = digits.strip_prefix('(').and_then(|d| d.strip_suffix(')')) {
            negative = true;
            digits = inner;
        }
        if let Some(rest) = digits.strip_prefix('-') {
            negative = true;
            digits = rest;
        }

        let value: i64 = digits.replace(',', "").parse().ok()?;
        Some(Some(if negative { -value } else { value }))
    }
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}
