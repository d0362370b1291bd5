//! Departmental correction rules
//!
//! Some catalog listings are irregular in ways no general grammar covers: a
//! department that prints course numbers inline, a swapped digit, a missing
//! season letter. Each such case is a [`Rule`] in a [`CorrectionTable`],
//! applied to digit-leading tokens before classification. The first rule
//! whose predicates all hold wins.

pub mod builtin;
pub mod error;
pub mod rule;
pub mod table;

pub use builtin::builtin_rules;
pub use error::CorrectionError;
pub use rule::{AccumulatorCondition, Action, NameMatch, Rule, RuleScope, TokenPredicate};
pub use table::{Correction, CorrectionTable};
