//! Select memoization within one validation pass
//!
//! Several compiled plans in the same pass often scan the same pattern
//! against the same view. [`PlanCache`] memoizes the fully-drained output of
//! a [`Select`](super::Select) keyed by (scope, pattern, projection), and
//! [`CachedSelect`] replays the shared buffer. A scan that fails is never
//! cached; the error is surfaced and the next evaluation retries the store.

use super::{PlanExplain, PlanId, PlanNode, Pos, Select, TupleIter};
use crate::compile::PlanScope;
use crate::error::Result;
use crate::tuple::Tuple;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;
use veld_core::StatementPattern;

/// Identity of a select, independent of plan-node ids
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectKey {
    pub scope: PlanScope,
    pub pattern: StatementPattern,
    pub projection: Vec<Pos>,
}

#[derive(Default)]
pub struct PlanCache {
    entries: RefCell<FxHashMap<SelectKey, Rc<[Tuple]>>>,
}

impl PlanCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lookup(&self, key: &SelectKey) -> Option<Rc<[Tuple]>> {
        self.entries.borrow().get(key).cloned()
    }

    fn store(&self, key: SelectKey, rows: Rc<[Tuple]>) {
        self.entries.borrow_mut().insert(key, rows);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}

/// A [`Select`] wrapped with pass-level memoization
pub struct CachedSelect<'a> {
    id: PlanId,
    key: SelectKey,
    cache: &'a PlanCache,
    inner: Select<'a>,
}

impl<'a> CachedSelect<'a> {
    pub fn new(id: PlanId, key: SelectKey, cache: &'a PlanCache, inner: Select<'a>) -> Self {
        Self {
            id,
            key,
            cache,
            inner,
        }
    }

    pub fn sorted_by_focus(&self) -> bool {
        self.inner.sorted_by_focus()
    }
}

impl PlanNode for CachedSelect<'_> {
    fn iter(&self) -> TupleIter<'_> {
        if let Some(rows) = self.cache.lookup(&self.key) {
            return Box::new(CachedRows { rows, next: 0 });
        }
        let drained: Result<Vec<Tuple>> = self.inner.iter().collect();
        match drained {
            Ok(rows) => {
                let rows: Rc<[Tuple]> = rows.into();
                self.cache.store(self.key.clone(), rows.clone());
                Box::new(CachedRows { rows, next: 0 })
            }
            Err(e) => Box::new(std::iter::once(Err(e))),
        }
    }

    fn depth(&self) -> usize {
        self.inner.depth()
    }

    fn id(&self) -> PlanId {
        self.id
    }

    fn label(&self) -> String {
        format!("Cached({})", self.inner.label())
    }

    fn explain(&self, out: &mut PlanExplain) {
        out.node(self.id, &self.label());
    }
}

struct CachedRows {
    rows: Rc<[Tuple]>,
    next: usize,
}

impl Iterator for CachedRows {
    type Item = Result<Tuple>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.get(self.next)?.clone();
        self.next += 1;
        Some(Ok(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::PlanIds;
    use veld_core::{MemoryGraph, Statement, Term};

    fn iri(s: &str) -> Term {
        Term::iri(format!("http://example.org/{s}"))
    }

    fn graph() -> MemoryGraph {
        MemoryGraph::from_statements([
            Statement::new(iri("picasso"), iri("paints"), iri("guernica")),
            Statement::new(iri("rembrandt"), iri("paints"), iri("nightwatch")),
        ])
    }

    fn key() -> SelectKey {
        SelectKey {
            scope: PlanScope::Full,
            pattern: StatementPattern::predicate(iri("paints")),
            projection: vec![Pos::Subject],
        }
    }

    fn select<'a>(g: &'a MemoryGraph, ids: &'a PlanIds) -> Select<'a> {
        Select::new(
            ids.next(),
            g,
            StatementPattern::predicate(iri("paints")),
            vec![Pos::Subject],
        )
    }

    #[test]
    fn replay_matches_the_uncached_scan() {
        let g = graph();
        let ids = PlanIds::new();
        let cache = PlanCache::new();
        let direct: Vec<_> = select(&g, &ids).iter().collect::<Result<_>>().unwrap();
        let cached = CachedSelect::new(ids.next(), key(), &cache, select(&g, &ids));
        let first: Vec<_> = cached.iter().collect::<Result<_>>().unwrap();
        let second: Vec<_> = cached.iter().collect::<Result<_>>().unwrap();
        assert_eq!(first, direct);
        assert_eq!(second, direct);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn shared_between_nodes_with_the_same_key() {
        let g = graph();
        let ids = PlanIds::new();
        let cache = PlanCache::new();
        let a = CachedSelect::new(ids.next(), key(), &cache, select(&g, &ids));
        let b = CachedSelect::new(ids.next(), key(), &cache, select(&g, &ids));
        let _ = a.iter().count();
        let _ = b.iter().count();
        assert_eq!(cache.len(), 1);
    }
}
