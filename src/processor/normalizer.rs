//! Collapses spelling variants of a category label into canonical labels.
//!
//! A [`RuleSet`] is an ordered list of [`CategoryRule`]s plus a default label.
//! Each raw value is tested against the rules in order; the first rule whose
//! variant set contains the value supplies the canonical label, and values no
//! rule claims get the default. Every rule also matches its own canonical
//! label, so running a rule set over its own output changes nothing.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::processor::{ProcessorError, column::Column, table::Table};

/// Maps a set of raw label variants to one canonical label
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategoryRule {
    /// Canonical label assigned on a match
    pub label: String,
    /// Raw spellings that map to `label`
    #[serde(default)]
    pub variants: Vec<String>,
}

impl CategoryRule {
    pub fn new<I, S>(label: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: label.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }
}

/// Ordered rules with a catch-all label
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    pub rules: Vec<CategoryRule>,
    pub default_label: String,
    /// Compare labels case-insensitively
    pub ignore_case: bool,
    /// Strip surrounding whitespace from raw values before matching
    pub trim: bool,
}

impl RuleSet {
    pub fn new(rules: Vec<CategoryRule>, default_label: impl Into<String>) -> Self {
        Self {
            rules,
            default_label: default_label.into(),
            ignore_case: false,
            trim: false,
        }
    }

    pub fn ignore_case(mut self, yes: bool) -> Self {
        self.ignore_case = yes;
        self
    }

    pub fn trim(mut self, yes: bool) -> Self {
        self.trim = yes;
        self
    }

    /// Every label the rule set can produce, default included.
    pub fn labels(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::with_capacity(self.rules.len() + 1);
        for label in self
            .rules
            .iter()
            .map(|r| r.label.as_str())
            .chain(std::iter::once(self.default_label.as_str()))
        {
            if !out.contains(&label) {
                out.push(label);
            }
        }
        out
    }

    fn compile(&self) -> Matcher<'_> {
        let key = |s: &str| {
            if self.ignore_case {
                s.to_lowercase()
            } else {
                s.to_string()
            }
        };
        let rules = self
            .rules
            .iter()
            .map(|rule| {
                let mut set: HashSet<String> = rule.variants.iter().map(|v| key(v)).collect();
                set.insert(key(&rule.label));
                (set, rule.label.as_str())
            })
            .collect();
        Matcher {
            rules,
            default_label: &self.default_label,
            ignore_case: self.ignore_case,
            trim: self.trim,
        }
    }

    /// Canonical label for a single raw value.
    ///
    /// Builds the rule lookup tables on every call, so it suits one-off
    /// lookups; use [`normalize`] to label a whole column.
    pub fn classify<'a>(&'a self, raw: &str) -> &'a str {
        self.compile().classify(raw)
    }
}

struct Matcher<'a> {
    rules: Vec<(HashSet<String>, &'a str)>,
    default_label: &'a str,
    ignore_case: bool,
    trim: bool,
}

impl<'a> Matcher<'a> {
    fn classify(&self, raw: &str) -> &'a str {
        let raw = if self.trim { raw.trim() } else { raw };
        let lowered;
        let probe = if self.ignore_case {
            lowered = raw.to_lowercase();
            lowered.as_str()
        } else {
            raw
        };

        self.rules
            .iter()
            .find(|(set, _)| set.contains(probe))
            .map_or(self.default_label, |(_, label)| *label)
    }

    fn claims(&self, label: &str) -> bool {
        self.rules.iter().any(|(_, l)| *l == label)
    }
}

/// Derives a canonical-label column from `source_column`
///
/// Consumes `table` and returns it with one more string column named
/// `derived_column`. The source column is left untouched.
///
/// # Errors
/// - [`ProcessorError::ColumnNotFound`] if `source_column` is absent
/// - [`ProcessorError::DuplicateColumn`] if `derived_column` already exists
pub fn normalize(
    table: Table,
    source_column: &str,
    derived_column: &str,
    rules: &RuleSet,
) -> Result<Table, ProcessorError> {
    let source = table.get_col(source_column)?;
    if table.has_column(derived_column) {
        return Err(ProcessorError::DuplicateColumn(derived_column.to_string()));
    }

    let matcher = rules.compile();
    let mut defaulted = 0usize;
    let labels: Vec<String> = source
        .iter_text()
        .map(|raw| {
            let label = matcher.classify(&raw);
            if label == rules.default_label && !matcher.claims(label) {
                defaulted += 1;
            }
            label.to_string()
        })
        .collect();

    debug!(
        source = source_column,
        derived = derived_column,
        rows = labels.len(),
        defaulted,
        "normalized category column"
    );
    if defaulted > 0 && defaulted == labels.len() {
        warn!(
            source = source_column,
            "no value matched any rule; every row got the default label"
        );
    }

    table.with_column(derived_column, Column::Str(labels))
}
