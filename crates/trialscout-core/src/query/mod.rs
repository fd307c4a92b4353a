//! Compilation of coded medical concepts into registry query expressions.
//!
//! The registry accepts an Essie-style boolean syntax per query axis
//! (`query.cond`, `query.intr`, `query.outc`) plus a free-form `query.term`
//! that supports `AREA[Field]value` scoping. This module turns structured
//! term sets into those strings.

mod age;
mod expression;
mod params;
mod terms;

pub use age::AgeGroup;
pub use expression::{
    DEFAULT_OPERATOR, Operator, SearchTerm, SearchTermSet, build_field_expression,
    build_search_expression, phrase,
};
pub use params::{SearchGender, SearchParams, SearchPatient};
pub use terms::extract_terms;
