//! Typed filter predicates assembled by the query builder and interpreted by a collection.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// A scalar operand of a filter clause.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Text(s)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Bool(b)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        FilterValue::Int(n)
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        FilterValue::Float(n)
    }
}

impl From<uuid::Uuid> for FilterValue {
    fn from(u: uuid::Uuid) -> Self {
        FilterValue::Text(u.to_string())
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(d: DateTime<Utc>) -> Self {
        FilterValue::Timestamp(d)
    }
}

/// Inclusive/exclusive bounds of a range clause. Unset sides are open.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bounds {
    pub gt: Option<FilterValue>,
    pub gte: Option<FilterValue>,
    pub lt: Option<FilterValue>,
    pub lte: Option<FilterValue>,
}

impl Bounds {
    pub fn gte(v: impl Into<FilterValue>) -> Self {
        Bounds { gte: Some(v.into()), ..Default::default() }
    }

    pub fn lte(v: impl Into<FilterValue>) -> Self {
        Bounds { lte: Some(v.into()), ..Default::default() }
    }

    pub fn lt(v: impl Into<FilterValue>) -> Self {
        Bounds { lt: Some(v.into()), ..Default::default() }
    }

    /// Overlay `other` onto self; bounds set in `other` replace ours on the same side.
    fn absorb(&mut self, other: Bounds) {
        if other.gt.is_some() {
            self.gt = other.gt;
        }
        if other.gte.is_some() {
            self.gte = other.gte;
        }
        if other.lt.is_some() {
            self.lt = other.lt;
        }
        if other.lte.is_some() {
            self.lte = other.lte;
        }
    }
}

/// One condition on a single field.
#[derive(Clone, Debug, PartialEq)]
pub enum Clause {
    Equals(FilterValue),
    In(Vec<FilterValue>),
    Range(Bounds),
    Contains { needle: String, case_insensitive: bool },
    /// Array-typed field holds the value.
    ArrayContains(FilterValue),
    IsNull,
    NotNull,
}

impl Clause {
    pub fn contains_insensitive(needle: impl Into<String>) -> Self {
        Clause::Contains {
            needle: needle.into(),
            case_insensitive: true,
        }
    }
}

/// Conjunction of per-field clauses plus an optional OR group.
///
/// Field names are API names (camelCase); the collection maps them to storage columns.
/// An empty predicate matches every row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Predicate {
    fields: BTreeMap<String, Vec<Clause>>,
    any_of: Vec<Predicate>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Predicate::merge`].
    pub fn with(mut self, field: impl Into<String>, clause: Clause) -> Self {
        self.merge(field, clause);
        self
    }

    /// Shorthand for an equality clause.
    pub fn eq(self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.with(field, Clause::Equals(value.into()))
    }

    /// Add a clause to `field`. Ranges on the same field merge bound-by-bound,
    /// an identical clause is kept once, anything else is ANDed.
    pub fn merge(&mut self, field: impl Into<String>, clause: Clause) {
        let clauses = self.fields.entry(field.into()).or_default();
        if let Clause::Range(bounds) = clause {
            if let Some(Clause::Range(existing)) = clauses.iter_mut().find(|c| matches!(c, Clause::Range(_))) {
                existing.absorb(bounds);
                return;
            }
            clauses.push(Clause::Range(bounds));
            return;
        }
        if !clauses.contains(&clause) {
            clauses.push(clause);
        }
    }

    /// Append alternatives to the OR group.
    pub fn extend_any_of(&mut self, alternatives: impl IntoIterator<Item = Predicate>) {
        self.any_of.extend(alternatives);
    }

    /// Merge every field clause and OR alternative of `other` into self.
    pub fn absorb(&mut self, other: Predicate) {
        for (field, clauses) in other.fields {
            for clause in clauses {
                self.merge(field.clone(), clause);
            }
        }
        self.any_of.extend(other.any_of);
    }

    pub fn clauses(&self, field: &str) -> &[Clause] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[Clause])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn any_of(&self) -> &[Predicate] {
        &self.any_of
    }

    pub fn is_empty(&self) -> bool {
        self.fields.values().all(Vec::is_empty) && self.any_of.is_empty()
    }
}
