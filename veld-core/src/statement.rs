//! Statement - a single fact in the graph
//!
//! A [`Statement`] is an ordered (subject, predicate, object, optional
//! context) tuple of terms. Identity is structural equality.
//!
//! ## Ordering
//!
//! Statements order subject-first: (s, p, o, context). Scans over a sorted
//! statement collection therefore emit runs of equal subjects, which is the
//! sortedness contract downstream grouping operators depend on.

use crate::term::Term;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single (subject, predicate, object, optional context) fact
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Statement {
    /// Subject (who/what the fact is about)
    pub s: Term,
    /// Predicate (the property/relationship)
    pub p: Term,
    /// Object (the value)
    pub o: Term,
    /// Optional named context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c: Option<Term>,
}

impl Statement {
    /// Create a statement in the default context
    pub fn new(s: Term, p: Term, o: Term) -> Self {
        Self { s, p, o, c: None }
    }

    /// Create a statement in a named context
    pub fn in_context(s: Term, p: Term, o: Term, c: Term) -> Self {
        Self { s, p, o, c: Some(c) }
    }

    /// Lower bound for range scans over a fixed subject
    pub fn min_for_subject(s: Term) -> Self {
        Self {
            s,
            p: Term::min(),
            o: Term::min(),
            c: None,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.s, self.p, self.o)
    }
}

/// A scan pattern with positions bound to constants or left free
///
/// `None` positions match any term. The all-free pattern scans the whole
/// view.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct StatementPattern {
    pub s: Option<Term>,
    pub p: Option<Term>,
    pub o: Option<Term>,
}

impl StatementPattern {
    /// Match any statement
    pub fn any() -> Self {
        Self::default()
    }

    /// Match statements with a fixed subject
    pub fn subject(s: Term) -> Self {
        Self {
            s: Some(s),
            ..Self::default()
        }
    }

    /// Match statements with a fixed predicate
    pub fn predicate(p: Term) -> Self {
        Self {
            p: Some(p),
            ..Self::default()
        }
    }

    /// Match statements with a fixed predicate and object
    pub fn predicate_object(p: Term, o: Term) -> Self {
        Self {
            s: None,
            p: Some(p),
            o: Some(o),
        }
    }

    /// Match statements with a fixed subject and predicate
    pub fn subject_predicate(s: Term, p: Term) -> Self {
        Self {
            s: Some(s),
            p: Some(p),
            o: None,
        }
    }

    /// Test a statement against this pattern
    pub fn matches(&self, st: &Statement) -> bool {
        self.s.as_ref().is_none_or(|s| s == &st.s)
            && self.p.as_ref().is_none_or(|p| p == &st.p)
            && self.o.as_ref().is_none_or(|o| o == &st.o)
    }
}

impl fmt::Display for StatementPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn pos(f: &mut fmt::Formatter<'_>, t: &Option<Term>) -> fmt::Result {
            match t {
                Some(t) => write!(f, "{t} "),
                None => write!(f, "? "),
            }
        }
        pos(f, &self.s)?;
        pos(f, &self.p)?;
        pos(f, &self.o)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn st(s: &str, p: &str, o: &str) -> Statement {
        Statement::new(Term::iri(s), Term::iri(p), Term::iri(o))
    }

    #[test]
    fn ordering_is_subject_first() {
        let a = st("a", "z", "z");
        let b = st("b", "a", "a");
        assert!(a < b);
    }

    #[test]
    fn pattern_matches_bound_positions_only() {
        let s = st("a", "p", "x");
        assert!(StatementPattern::any().matches(&s));
        assert!(StatementPattern::predicate(Term::iri("p")).matches(&s));
        assert!(!StatementPattern::predicate(Term::iri("q")).matches(&s));
        assert!(
            StatementPattern::predicate_object(Term::iri("p"), Term::iri("x")).matches(&s)
        );
        assert!(
            !StatementPattern::predicate_object(Term::iri("p"), Term::iri("y")).matches(&s)
        );
    }

    #[test]
    fn min_for_subject_bounds_the_subject_run() {
        let lo = Statement::min_for_subject(Term::iri("b"));
        assert!(st("a", "z", "z") < lo);
        assert!(lo <= st("b", "a", "a"));
    }

    #[test]
    fn context_is_part_of_identity() {
        let plain = st("a", "p", "x");
        let ctx = Statement::in_context(
            Term::iri("a"),
            Term::iri("p"),
            Term::iri("x"),
            Term::iri("g"),
        );
        assert_ne!(plain, ctx);
    }
}
