use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Boolean operator joining sibling terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operator {
    And,
    Or,
}

/// Operator used between groups and for terms built by the search pipeline.
pub const DEFAULT_OPERATOR: Operator = Operator::And;

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }

    fn separator(&self) -> String {
        format!(" {} ", self.as_str())
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One literal phrase and the operator combining it with its group siblings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTerm {
    pub term: String,
    pub operator: Operator,
}

impl SearchTerm {
    pub fn new(term: impl Into<String>, operator: Operator) -> Self {
        Self {
            term: term.into(),
            operator,
        }
    }
}

/// Include/exclude terms for a single query axis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTermSet {
    pub includes: Vec<SearchTerm>,
    pub excludes: Vec<SearchTerm>,
}

impl SearchTermSet {
    /// Set including every term with the same operator and excluding nothing.
    pub fn including<I, S>(terms: I, operator: Operator) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            includes: terms
                .into_iter()
                .map(|t| SearchTerm::new(t, operator))
                .collect(),
            excludes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }
}

/// Quotes multi-word terms so the registry matches them as a phrase.
pub fn phrase(term: &str) -> String {
    if term.contains(char::is_whitespace) {
        format!("\"{term}\"")
    } else {
        term.to_owned()
    }
}

/// Scopes `term` to each of `fields` with `AREA[field]` and joins the scoped
/// expressions with `operator`.
pub fn build_field_expression(term: &str, fields: &[&str], operator: Operator) -> String {
    let quoted = phrase(term);
    fields
        .iter()
        .map(|field| format!("AREA[{field}]{quoted}"))
        .collect::<Vec<_>>()
        .join(&operator.separator())
}

/// Compiles a term set into one boolean expression.
///
/// Terms are grouped by their operator (groups keep first-appearance order),
/// each group is parenthesized, and groups are joined with
/// `default_operator`. The include and exclude expressions are then joined
/// with `NOT`, skipping whichever is empty.
///
/// An exclude-only set therefore renders as a plain positive match on the
/// excluded terms: `NOT` only ever appears between two expressions. Callers
/// that need a real negation must also supply includes.
pub fn build_search_expression(set: &SearchTermSet, default_operator: Operator) -> String {
    [
        grouped_expression(&set.includes, default_operator),
        grouped_expression(&set.excludes, default_operator),
    ]
    .into_iter()
    .filter(|expr| !expr.is_empty())
    .collect::<Vec<_>>()
    .join(" NOT ")
}

fn grouped_expression(terms: &[SearchTerm], default_operator: Operator) -> String {
    let mut groups: IndexMap<Operator, Vec<String>> = IndexMap::new();
    for term in terms {
        groups.entry(term.operator).or_default().push(phrase(&term.term));
    }

    groups
        .into_iter()
        .map(|(operator, phrases)| format!("({})", phrases.join(&operator.separator())))
        .collect::<Vec<_>>()
        .join(&default_operator.separator())
}
