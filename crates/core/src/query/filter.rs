//! Predicate construction from untrusted query parameters.

use crate::types::{DbId, Timestamp};

use super::params::ListConfig;
use super::QueryError;

/// A typed scalar that can appear in a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Timestamp(Timestamp),
}

/// One condition of a predicate. Conditions are AND-ed together.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Exact match on a column.
    Eq { field: &'static str, value: Scalar },
    /// Membership in a value set.
    InSet {
        field: &'static str,
        values: Vec<Scalar>,
    },
    /// Inclusive range; either bound may be absent.
    Range {
        field: &'static str,
        min: Option<Scalar>,
        max: Option<Scalar>,
    },
    /// Case-insensitive substring match across several fields. The term is
    /// already escaped; stores must treat it literally.
    Search {
        fields: &'static [&'static str],
        term: String,
    },
    /// Exclude soft-deleted rows.
    NotDeleted,
}

/// A structured filter expression evaluated by a store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    pub conditions: Vec<Condition>,
}

/// Builds a [`Predicate`] from raw query parameters.
///
/// Soft-deleted rows are excluded unless [`FilterBuilder::include_deleted`]
/// is called; no listing endpoint currently does. Construction is pure: no
/// store access happens until the predicate is executed.
#[derive(Debug, Default)]
pub struct FilterBuilder {
    conditions: Vec<Condition>,
    include_deleted: bool,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include_deleted(&mut self) -> &mut Self {
        self.include_deleted = true;
        self
    }

    /// Free-text search across the module's searchable fields. Empty and
    /// whitespace-only terms are ignored.
    pub fn search(&mut self, config: &ListConfig, term: Option<&str>) -> &mut Self {
        if let Some(term) = term {
            let term = term.trim();
            if !term.is_empty() && !config.searchable_fields.is_empty() {
                self.conditions.push(Condition::Search {
                    fields: config.searchable_fields,
                    term: escape_like(term),
                });
            }
        }
        self
    }

    pub fn eq(&mut self, field: &'static str, value: Scalar) -> &mut Self {
        self.conditions.push(Condition::Eq { field, value });
        self
    }

    /// Exact match on a reference (foreign-key) column. The raw id string
    /// is validated first: a malformed id is an error, never a silent
    /// empty result.
    pub fn reference(
        &mut self,
        field: &'static str,
        raw: Option<&str>,
    ) -> Result<&mut Self, QueryError> {
        if let Some(raw) = raw {
            let id = parse_ref_id(field, raw)?;
            self.conditions.push(Condition::Eq {
                field,
                value: Scalar::Int(id),
            });
        }
        Ok(self)
    }

    /// Membership in a set of text values (e.g. a status filter). Empty
    /// entries are dropped; an empty set adds no condition.
    pub fn one_of<S: AsRef<str>>(&mut self, field: &'static str, values: &[S]) -> &mut Self {
        let values: Vec<Scalar> = values
            .iter()
            .map(|v| v.as_ref().trim())
            .filter(|v| !v.is_empty())
            .map(|v| Scalar::Text(v.to_string()))
            .collect();
        if !values.is_empty() {
            self.conditions.push(Condition::InSet { field, values });
        }
        self
    }

    /// Inclusive date range; an omitted bound is unbounded on that side.
    pub fn date_range(
        &mut self,
        field: &'static str,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    ) -> &mut Self {
        if from.is_some() || to.is_some() {
            self.conditions.push(Condition::Range {
                field,
                min: from.map(Scalar::Timestamp),
                max: to.map(Scalar::Timestamp),
            });
        }
        self
    }

    /// Inclusive numeric range; an omitted bound is unbounded on that side.
    pub fn amount_range(
        &mut self,
        field: &'static str,
        min: Option<f64>,
        max: Option<f64>,
    ) -> &mut Self {
        if min.is_some() || max.is_some() {
            self.conditions.push(Condition::Range {
                field,
                min: min.map(Scalar::Float),
                max: max.map(Scalar::Float),
            });
        }
        self
    }

    pub fn build(self) -> Predicate {
        let mut conditions = Vec::with_capacity(self.conditions.len() + 1);
        if !self.include_deleted {
            conditions.push(Condition::NotDeleted);
        }
        conditions.extend(self.conditions);
        Predicate { conditions }
    }
}

/// Escape LIKE/ILIKE metacharacters so user search terms match literally.
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Validate a caller-supplied reference id string. Ids are positive
/// integers; anything else is rejected before a predicate is built.
pub fn parse_ref_id(field: &str, raw: &str) -> Result<DbId, QueryError> {
    raw.trim()
        .parse::<DbId>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| QueryError::InvalidArgument(format!("{field}: '{raw}' is not a valid id")))
}
