//! Trim - drop leading scaffolding columns
//!
//! Target-selection plans bind the target-defining predicate or class as a
//! constant in a leading column; Trim drops that scaffolding and re-indexes
//! the remainder so the focus node lands in column 0.

use super::{BoxedPlan, PlanExplain, PlanId, PlanNode, TupleIter};

/// Leading-column projection
pub struct Trim<'a> {
    id: PlanId,
    parent: BoxedPlan<'a>,
    skip: usize,
}

impl<'a> Trim<'a> {
    pub fn new(id: PlanId, parent: BoxedPlan<'a>, skip: usize) -> Self {
        Self { id, parent, skip }
    }
}

impl PlanNode for Trim<'_> {
    fn iter(&self) -> TupleIter<'_> {
        let skip = self.skip;
        Box::new(
            self.parent
                .iter()
                .map(move |r| r.map(|t| t.trimmed(skip))),
        )
    }

    fn depth(&self) -> usize {
        self.parent.depth() + 1
    }

    fn id(&self) -> PlanId {
        self.id
    }

    fn label(&self) -> String {
        format!("Trim({})", self.skip)
    }

    fn explain(&self, out: &mut PlanExplain) {
        if !out.node(self.id, &self.label()) {
            return;
        }
        out.edge(self.parent.id(), self.id);
        self.parent.explain(out);
    }
}
