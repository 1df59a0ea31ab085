//! Unique - collapse runs of equal focus nodes
//!
//! Precondition: the parent stream is sorted by column 0. Emits only the
//! first tuple of each run of equal column-0 values, collapsing duplicate
//! derivations of the same focus node to one. The compiler guarantees the
//! precondition by construction.

use super::{BoxedPlan, PlanExplain, PlanId, PlanNode, TupleIter};
use crate::error::Result;
use crate::tuple::Tuple;
use veld_core::Term;

/// First-of-run filter on column 0
pub struct Unique<'a> {
    id: PlanId,
    parent: BoxedPlan<'a>,
}

impl<'a> Unique<'a> {
    pub fn new(id: PlanId, parent: BoxedPlan<'a>) -> Self {
        Self { id, parent }
    }
}

impl PlanNode for Unique<'_> {
    fn iter(&self) -> TupleIter<'_> {
        Box::new(UniqueIter {
            inner: self.parent.iter(),
            last_focus: None,
        })
    }

    fn depth(&self) -> usize {
        self.parent.depth() + 1
    }

    fn id(&self) -> PlanId {
        self.id
    }

    fn label(&self) -> String {
        "Unique".to_string()
    }

    fn explain(&self, out: &mut PlanExplain) {
        if !out.node(self.id, &self.label()) {
            return;
        }
        out.edge(self.parent.id(), self.id);
        self.parent.explain(out);
    }
}

struct UniqueIter<'a> {
    inner: TupleIter<'a>,
    last_focus: Option<Term>,
}

impl Iterator for UniqueIter<'_> {
    type Item = Result<Tuple>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let tuple = match self.inner.next()? {
                Ok(t) => t,
                Err(e) => return Some(Err(e)),
            };
            if self.last_focus.as_ref() == Some(tuple.focus()) {
                continue;
            }
            self.last_focus = Some(tuple.focus().clone());
            return Some(Ok(tuple));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{PlanIds, Values};

    fn t(name: &str) -> Tuple {
        Tuple::new(vec![Term::iri(name)])
    }

    #[test]
    fn unique_keeps_first_of_each_run() {
        let ids = PlanIds::new();
        let source = Values::new(
            ids.next(),
            vec![t("a"), t("a"), t("b"), t("c"), t("c"), t("c")],
        );
        let unique = Unique::new(ids.next(), Box::new(source));
        let rows: Vec<_> = unique.iter().collect::<Result<_>>().unwrap();
        assert_eq!(rows, vec![t("a"), t("b"), t("c")]);
    }

    #[test]
    fn unique_passes_singleton_runs_through() {
        let ids = PlanIds::new();
        let source = Values::new(ids.next(), vec![t("a"), t("b")]);
        let unique = Unique::new(ids.next(), Box::new(source));
        assert_eq!(unique.iter().count(), 2);
    }
}
