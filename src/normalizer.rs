use log::{debug, warn};

use crate::aliases::AliasTable;
use crate::error::Diagnostic;
use crate::parser::ParsedLine;
use crate::schema::{Level, LineItem, Section};

/// Canonical form of a report label: trimmed, casefolded, internal
/// whitespace collapsed, trailing dot leaders, footnote markers and colons
/// stripped. Idempotent.
pub fn normalize_label(label: &str) -> String {
    let lowered = label.to_lowercase();
    let mut normalized = lowered.split_whitespace().collect::<Vec<_>>().join(" ");

    loop {
        let before = normalized.len();

        normalized = normalized.trim_end_matches('.').trim_end().to_string();
        normalized = normalized.trim_end_matches(':').trim_end().to_string();
        normalized = normalized
            .trim_end_matches(|c| {
                matches!(
                    c,
                    '*' | '†' | '‡' | '§' | '⁰' | '¹' | '²' | '³' | '⁴' | '⁵' | '⁶' | '⁷' | '⁸' | '⁹'
                )
            })
            .trim_end()
            .to_string();

        // Trailing standalone footnote number, e.g. "total receipts 1".
        if let Some((head, tail)) = normalized.rsplit_once(' ') {
            if tail.len() <= 2 && tail.bytes().all(|b| b.is_ascii_digit()) {
                normalized = head.to_string();
            }
        }

        if normalized.len() == before {
            return normalized;
        }
    }
}

/// Canonical id minted for labels the alias table does not know.
pub fn fallback_id(normalized_label: &str) -> String {
    let mut id = String::with_capacity(normalized_label.len());
    for c in normalized_label.chars() {
        if c.is_ascii_alphanumeric() {
            id.push(c);
        } else if matches!(c, ' ' | '-' | '/') && !id.is_empty() && !id.ends_with('_') {
            id.push('_');
        }
    }
    id.trim_end_matches('_').to_string()
}

/// Maps parsed lines to canonical line items through the alias table.
/// Lookup misses do not fail the pipeline; they fall back to the normalized
/// label and record a warning so the alias table can be extended without
/// blocking ingestion.
pub struct SchemaNormalizer {
    aliases: AliasTable,
}

impl SchemaNormalizer {
    pub fn new(aliases: AliasTable) -> Self {
        Self { aliases }
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Returns `None` for pure header lines (no value columns), which are
    /// dropped rather than retained as zero-valued items.
    pub fn normalize(
        &self,
        parsed: &ParsedLine,
        section: Section,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<LineItem> {
        let values = match parsed.values {
            Some(values) => values,
            None => {
                debug!("dropping header line '{}'", parsed.label);
                return None;
            }
        };

        let normalized = normalize_label(&parsed.label);
        if normalized.is_empty() {
            debug!("dropping line with no label content: '{}'", parsed.label);
            return None;
        }

        let (canonical_id, level) = match self.aliases.resolve(section, &normalized) {
            Some(entry) => (entry.id.to_string(), entry.level),
            None => {
                let id = fallback_id(&normalized);
                warn!(
                    "no alias for label '{}' in {:?}; using fallback id '{}'",
                    parsed.label, section, id
                );
                diagnostics.push(Diagnostic::UnknownLabel {
                    raw_label: parsed.label.clone(),
                    fallback_id: id.clone(),
                });
                // Unregistered totals are still recognizable by prefix.
                let level = if normalized.starts_with("total") {
                    Level::Total
                } else {
                    Level::Item
                };
                (id, level)
            }
        };

        Some(LineItem {
            canonical_id,
            raw_label: parsed.label.clone(),
            section,
            level,
            this_month: values[0],
            fiscal_year_to_date: values[1],
            prior_period_ytd: values[2],
            budget_estimate_full_year: values[3],
        })
    }
}
