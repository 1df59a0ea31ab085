//! Graph views and the in-memory statement store
//!
//! [`GraphView`] is the contract the validation engine consumes: a sorted
//! pattern scan plus a membership test over some image of the graph. The
//! image may be the committed store, a snapshot, the staged result of a
//! pending transaction, or one side of a transaction delta - the engine does
//! not care which.
//!
//! [`MemoryGraph`] is the baseline implementation: a `BTreeSet<Statement>`
//! whose iteration order is exactly the subject-first statement ordering.

use crate::error::Result;
use crate::statement::{Statement, StatementPattern};
use crate::term::Term;
use std::collections::BTreeSet;
use std::ops::Bound;

/// A lazy, sorted stream of scan results
///
/// Items are fallible so store failures mid-scan propagate to the consumer
/// instead of truncating the stream. Dropping the iterator releases whatever
/// the view holds for the scan, whether or not it was exhausted.
pub type StatementIter<'a> = Box<dyn Iterator<Item = Result<Statement>> + 'a>;

/// A readable image of a graph
///
/// Implementations must yield scan results in statement order (subject
/// first). That ordering is a correctness contract: the plan compiler relies
/// on it to satisfy the sorted-input preconditions of grouping operators
/// without re-sorting.
pub trait GraphView {
    /// Scan for statements matching `pattern`, in statement order
    fn scan(&self, pattern: &StatementPattern) -> StatementIter<'_>;

    /// Test whether at least one statement matches the given bounds
    fn has_statement(
        &self,
        s: Option<&Term>,
        p: Option<&Term>,
        o: Option<&Term>,
    ) -> Result<bool> {
        let pattern = StatementPattern {
            s: s.cloned(),
            p: p.cloned(),
            o: o.cloned(),
        };
        match self.scan(&pattern).next() {
            Some(Ok(_)) => Ok(true),
            Some(Err(e)) => Err(e),
            None => Ok(false),
        }
    }
}

/// Sorted in-memory statement set
///
/// The baseline store used by the transaction layer and by tests. Scans with
/// a bound subject seek into the set; all other patterns filter a full
/// ordered walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryGraph {
    statements: BTreeSet<Statement>,
    /// Incremented on every committed mutation; used for serializable
    /// conflict detection by the transaction layer.
    head: u64,
}

impl MemoryGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from an initial statement set
    pub fn from_statements(statements: impl IntoIterator<Item = Statement>) -> Self {
        Self {
            statements: statements.into_iter().collect(),
            head: 0,
        }
    }

    /// Number of statements
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// True if the graph holds no statements
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Head version - bumped on every committed mutation
    pub fn head(&self) -> u64 {
        self.head
    }

    /// Membership test on the exact statement
    pub fn contains(&self, st: &Statement) -> bool {
        self.statements.contains(st)
    }

    /// Apply a committed mutation: remove then add, then bump the head
    ///
    /// The caller (the transaction layer) is responsible for holding
    /// exclusive access while this runs; the mutation is visible atomically
    /// to anything that reads the graph afterwards.
    pub fn apply(
        &mut self,
        added: impl IntoIterator<Item = Statement>,
        removed: impl IntoIterator<Item = Statement>,
    ) {
        for st in removed {
            self.statements.remove(&st);
        }
        for st in added {
            self.statements.insert(st);
        }
        self.head += 1;
    }

    /// Iterate all statements in order
    pub fn iter(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter()
    }
}

impl GraphView for MemoryGraph {
    fn scan(&self, pattern: &StatementPattern) -> StatementIter<'_> {
        let pattern = pattern.clone();
        match pattern.s.clone() {
            Some(subject) => {
                // Seek to the subject's run and stop at its end.
                let lo = Statement::min_for_subject(subject.clone());
                let iter = self
                    .statements
                    .range((Bound::Included(lo), Bound::Unbounded))
                    .take_while(move |st| st.s == subject)
                    .filter(move |st| pattern.matches(st))
                    .map(|st| Ok(st.clone()));
                Box::new(iter)
            }
            None => {
                let iter = self
                    .statements
                    .iter()
                    .filter(move |st| pattern.matches(st))
                    .map(|st| Ok(st.clone()));
                Box::new(iter)
            }
        }
    }

    fn has_statement(
        &self,
        s: Option<&Term>,
        p: Option<&Term>,
        o: Option<&Term>,
    ) -> Result<bool> {
        let pattern = StatementPattern {
            s: s.cloned(),
            p: p.cloned(),
            o: o.cloned(),
        };
        Ok(match &pattern.s {
            Some(subject) => {
                let lo = Statement::min_for_subject(subject.clone());
                self.statements
                    .range((Bound::Included(lo), Bound::Unbounded))
                    .take_while(|st| &st.s == subject)
                    .any(|st| pattern.matches(st))
            }
            None => self.statements.iter().any(|st| pattern.matches(st)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(s: &str) -> Term {
        Term::iri(format!("http://example.org/{s}"))
    }

    fn graph() -> MemoryGraph {
        MemoryGraph::from_statements([
            Statement::new(iri("alice"), iri("knows"), iri("bob")),
            Statement::new(iri("alice"), iri("name"), Term::literal("Alice")),
            Statement::new(iri("bob"), iri("knows"), iri("alice")),
            Statement::new(iri("carol"), iri("name"), Term::literal("Carol")),
        ])
    }

    #[test]
    fn scan_bound_subject_returns_only_that_run() {
        let g = graph();
        let results: Vec<_> = g
            .scan(&StatementPattern::subject(iri("alice")))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|st| st.s == iri("alice")));
    }

    #[test]
    fn scan_is_sorted_subject_first() {
        let g = graph();
        let subjects: Vec<_> = g
            .scan(&StatementPattern::any())
            .map(|r| r.unwrap().s)
            .collect();
        let mut sorted = subjects.clone();
        sorted.sort();
        assert_eq!(subjects, sorted);
    }

    #[test]
    fn has_statement_respects_bounds() {
        let g = graph();
        assert!(g
            .has_statement(Some(&iri("alice")), Some(&iri("knows")), None)
            .unwrap());
        assert!(!g
            .has_statement(Some(&iri("carol")), Some(&iri("knows")), None)
            .unwrap());
        assert!(g
            .has_statement(None, Some(&iri("name")), None)
            .unwrap());
    }

    #[test]
    fn apply_bumps_head_and_mutates() {
        let mut g = graph();
        let st = Statement::new(iri("dan"), iri("name"), Term::literal("Dan"));
        let before = g.head();
        g.apply([st.clone()], [Statement::new(iri("alice"), iri("knows"), iri("bob"))]);
        assert_eq!(g.head(), before + 1);
        assert!(g.contains(&st));
        assert!(!g.contains(&Statement::new(iri("alice"), iri("knows"), iri("bob"))));
    }
}
