//! Transaction deltas and the views over them
//!
//! A [`TxnDelta`] holds the added and removed statement sets of one pending
//! transaction. The validation engine never looks at the delta directly; it
//! consumes three [`GraphView`]s derived from it:
//!
//! - [`AddedView`] - just the added statements
//! - [`RemovedView`] - just the removed statements
//! - [`StagedView`] - the base image with the delta applied
//!   (base ∪ added ∖ removed), merged lazily in statement order
//!
//! For the same statement, a later operation overrides an earlier one: after
//! add-then-remove the statement sits in the removed set, after
//! remove-then-add in the added set. The sets stay disjoint, and the staged
//! image equals the result of replaying the operations in order against the
//! base, whatever the base contains.

use crate::error::Result;
use crate::graph::{GraphView, StatementIter};
use crate::statement::{Statement, StatementPattern};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::iter::Peekable;

/// Isolation level negotiated with the store at transaction begin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IsolationLevel {
    /// Every read within one validation pass sees one consistent graph image
    #[default]
    Snapshot,
    /// Snapshot reads plus conflict detection against concurrent commits
    Serializable,
}

/// The added/removed statement sets of one pending transaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxnDelta {
    added: BTreeSet<Statement>,
    removed: BTreeSet<Statement>,
}

impl TxnDelta {
    /// Create an empty delta
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an addition, overriding a pending removal of the statement
    pub fn add(&mut self, st: Statement) {
        self.removed.remove(&st);
        self.added.insert(st);
    }

    /// Record a removal, overriding a pending addition of the statement
    pub fn remove(&mut self, st: Statement) {
        self.added.remove(&st);
        self.removed.insert(st);
    }

    /// True if the delta records no changes
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// The added statements, in order
    pub fn added(&self) -> impl Iterator<Item = &Statement> {
        self.added.iter()
    }

    /// The removed statements, in order
    pub fn removed(&self) -> impl Iterator<Item = &Statement> {
        self.removed.iter()
    }

    /// View over the added statements
    pub fn added_view(&self) -> AddedView<'_> {
        AddedView { delta: self }
    }

    /// View over the removed statements
    pub fn removed_view(&self) -> RemovedView<'_> {
        RemovedView { delta: self }
    }

    /// View of `base` with this delta applied
    pub fn staged_view<'a>(&'a self, base: &'a dyn GraphView) -> StagedView<'a> {
        StagedView { base, delta: self }
    }
}

fn scan_set<'a>(
    set: &'a BTreeSet<Statement>,
    pattern: &StatementPattern,
) -> StatementIter<'a> {
    let pattern = pattern.clone();
    Box::new(
        set.iter()
            .filter(move |st| pattern.matches(st))
            .map(|st| Ok(st.clone())),
    )
}

/// View over the added statements of a delta
#[derive(Debug, Clone, Copy)]
pub struct AddedView<'a> {
    delta: &'a TxnDelta,
}

impl GraphView for AddedView<'_> {
    fn scan(&self, pattern: &StatementPattern) -> StatementIter<'_> {
        scan_set(&self.delta.added, pattern)
    }
}

/// View over the removed statements of a delta
#[derive(Debug, Clone, Copy)]
pub struct RemovedView<'a> {
    delta: &'a TxnDelta,
}

impl GraphView for RemovedView<'_> {
    fn scan(&self, pattern: &StatementPattern) -> StatementIter<'_> {
        scan_set(&self.delta.removed, pattern)
    }
}

/// View of a base graph with a pending delta applied
///
/// Scans merge the base stream (minus removed statements) with the added
/// set lazily, preserving statement order and dropping duplicates where an
/// added statement is already present in the base.
#[derive(Clone, Copy)]
pub struct StagedView<'a> {
    base: &'a dyn GraphView,
    delta: &'a TxnDelta,
}

impl GraphView for StagedView<'_> {
    fn scan(&self, pattern: &StatementPattern) -> StatementIter<'_> {
        let removed = &self.delta.removed;
        let base = self
            .base
            .scan(pattern)
            .filter(move |r| match r {
                Ok(st) => !removed.contains(st),
                Err(_) => true,
            });
        let added = scan_set(&self.delta.added, pattern);
        Box::new(MergeIter {
            left: base.peekable(),
            right: added.peekable(),
        })
    }
}

/// Ordered merge of two sorted fallible statement streams, deduplicating
/// statements present in both.
///
/// Errors are yielded as soon as they surface on either side.
struct MergeIter<L, R>
where
    L: Iterator<Item = Result<Statement>>,
    R: Iterator<Item = Result<Statement>>,
{
    left: Peekable<L>,
    right: Peekable<R>,
}

impl<L, R> Iterator for MergeIter<L, R>
where
    L: Iterator<Item = Result<Statement>>,
    R: Iterator<Item = Result<Statement>>,
{
    type Item = Result<Statement>;

    fn next(&mut self) -> Option<Self::Item> {
        if matches!(self.left.peek(), Some(Err(_))) {
            return self.left.next();
        }
        if matches!(self.right.peek(), Some(Err(_))) {
            return self.right.next();
        }
        match (self.left.peek(), self.right.peek()) {
            (None, None) => None,
            (Some(_), None) => self.left.next(),
            (None, Some(_)) => self.right.next(),
            (Some(Ok(l)), Some(Ok(r))) => match l.cmp(r) {
                std::cmp::Ordering::Less => self.left.next(),
                std::cmp::Ordering::Greater => self.right.next(),
                std::cmp::Ordering::Equal => {
                    self.right.next();
                    self.left.next()
                }
            },
            // Err peeks handled above
            _ => unreachable!(),
        }
    }
}
