//! Union - stream concatenation
//!
//! Emits the concatenation of all parent streams, in parent order, with no
//! deduplication. The output is generally unsorted even when every parent is
//! sorted; the compiler inserts a Sort stage after a multi-parent union when
//! downstream operators need column-0 runs.

use super::{BoxedPlan, PlanExplain, PlanId, PlanNode, TupleIter};

/// Concatenation of parent streams
pub struct Union<'a> {
    id: PlanId,
    parents: Vec<BoxedPlan<'a>>,
}

impl<'a> Union<'a> {
    pub fn new(id: PlanId, parents: Vec<BoxedPlan<'a>>) -> Self {
        Self { id, parents }
    }
}

impl PlanNode for Union<'_> {
    fn iter(&self) -> TupleIter<'_> {
        Box::new(self.parents.iter().flat_map(|p| p.iter()))
    }

    fn depth(&self) -> usize {
        self.parents
            .iter()
            .map(|p| p.depth())
            .max()
            .unwrap_or(0)
            + 1
    }

    fn id(&self) -> PlanId {
        self.id
    }

    fn label(&self) -> String {
        format!("Union({})", self.parents.len())
    }

    fn explain(&self, out: &mut PlanExplain) {
        if !out.node(self.id, &self.label()) {
            return;
        }
        for parent in &self.parents {
            out.edge(parent.id(), self.id);
            parent.explain(out);
        }
    }
}
