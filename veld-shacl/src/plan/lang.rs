//! Language-tag uniqueness over focus-grouped runs
//!
//! Expects its parent sorted so that all tuples for one focus term arrive
//! contiguously (column 0 = focus, column 1 = value). Within each run it
//! partitions value tuples by whether their language tag occurs once or more
//! than once. Tuples whose value carries no language tag never appear in
//! onlyNotUnique output and always appear in onlyUnique output.

use super::{BoxedPlan, PlanExplain, PlanId, PlanNode, TupleIter};
use crate::error::Result;
use crate::tuple::Tuple;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use std::sync::Arc;
use veld_core::Term;

/// Which side of the uniqueness partition to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LangMode {
    /// Emit only tuples whose language tag is unique within the run
    OnlyUnique,
    /// Emit only tuples whose language tag repeats within the run
    OnlyNotUnique,
}

pub struct LangUniqueness<'a> {
    id: PlanId,
    mode: LangMode,
    parent: BoxedPlan<'a>,
}

impl<'a> LangUniqueness<'a> {
    pub fn new(id: PlanId, mode: LangMode, parent: BoxedPlan<'a>) -> Self {
        Self { id, mode, parent }
    }
}

impl PlanNode for LangUniqueness<'_> {
    fn iter(&self) -> TupleIter<'_> {
        match self.mode {
            LangMode::OnlyNotUnique => Box::new(NotUniqueIter {
                inner: self.parent.iter(),
                current: None,
                seen: FxHashSet::default(),
            }),
            LangMode::OnlyUnique => Box::new(OnlyUniqueIter {
                inner: self.parent.iter(),
                pending: None,
                out: VecDeque::new(),
                done: false,
            }),
        }
    }

    fn depth(&self) -> usize {
        self.parent.depth() + 1
    }

    fn id(&self) -> PlanId {
        self.id
    }

    fn label(&self) -> String {
        match self.mode {
            LangMode::OnlyUnique => "LangUniqueness(onlyUnique)".to_owned(),
            LangMode::OnlyNotUnique => "LangUniqueness(onlyNotUnique)".to_owned(),
        }
    }

    fn explain(&self, out: &mut PlanExplain) {
        if !out.node(self.id, &self.label()) {
            return;
        }
        out.edge(self.parent.id(), self.id);
        self.parent.explain(out);
    }
}

fn tag_of(tuple: &Tuple) -> Option<Arc<str>> {
    tuple.line().get(1).and_then(|v| v.lang()).map(Arc::from)
}

/// Streams tuples whose tag was already seen in the current run.
///
/// Misses the first occurrence of each repeated tag, which is fine for a
/// violation witness: one duplicate is evidence enough.
struct NotUniqueIter<'a> {
    inner: TupleIter<'a>,
    current: Option<Term>,
    seen: FxHashSet<Arc<str>>,
}

impl Iterator for NotUniqueIter<'_> {
    type Item = Result<Tuple>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let tuple = match self.inner.next()? {
                Ok(t) => t,
                Err(e) => return Some(Err(e)),
            };
            if self.current.as_ref() != Some(tuple.focus()) {
                self.current = Some(tuple.focus().clone());
                self.seen.clear();
            }
            // Values without a language tag cannot clash on one.
            let Some(tag) = tag_of(&tuple) else {
                continue;
            };
            if self.seen.insert(tag) {
                continue;
            }
            return Some(Ok(tuple));
        }
    }
}

/// Buffers one run at a time, then replays only the tuples whose tag
/// occurred exactly once.
struct OnlyUniqueIter<'a> {
    inner: TupleIter<'a>,
    /// First tuple of the next run, read past the boundary
    pending: Option<Tuple>,
    out: VecDeque<Tuple>,
    done: bool,
}

impl OnlyUniqueIter<'_> {
    fn fill_run(&mut self) -> Result<()> {
        let mut run: Vec<Tuple> = Vec::new();
        if let Some(first) = self.pending.take() {
            run.push(first);
        }
        loop {
            match self.inner.next() {
                None => {
                    self.done = true;
                    break;
                }
                Some(Err(e)) => return Err(e),
                Some(Ok(t)) => {
                    if let Some(first) = run.first() {
                        if first.focus() != t.focus() {
                            self.pending = Some(t);
                            break;
                        }
                    }
                    run.push(t);
                }
            }
        }
        let mut seen = FxHashSet::default();
        let mut twice = FxHashSet::default();
        for t in &run {
            if let Some(tag) = tag_of(t) {
                if !seen.insert(tag.clone()) {
                    twice.insert(tag);
                }
            }
        }
        for t in run {
            let keep = match tag_of(&t) {
                None => true,
                Some(tag) => !twice.contains(&tag),
            };
            if keep {
                self.out.push_back(t);
            }
        }
        Ok(())
    }
}

impl Iterator for OnlyUniqueIter<'_> {
    type Item = Result<Tuple>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(t) = self.out.pop_front() {
                return Some(Ok(t));
            }
            if self.done && self.pending.is_none() {
                return None;
            }
            if let Err(e) = self.fill_run() {
                self.done = true;
                return Some(Err(e));
            }
        }
    }
}
