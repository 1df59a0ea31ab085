//! Buffering sort
//!
//! Drains the parent fully, sorts by tuple line, then replays. Only needed
//! above a [`super::Union`] whose branches are individually sorted but not
//! globally so; single-source plans stay sorted by construction.

use super::{BoxedPlan, PlanExplain, PlanId, PlanNode, TupleIter};
use crate::error::ShaclError;
use crate::tuple::Tuple;

pub struct Sort<'a> {
    id: PlanId,
    parent: BoxedPlan<'a>,
}

impl<'a> Sort<'a> {
    pub fn new(id: PlanId, parent: BoxedPlan<'a>) -> Self {
        Self { id, parent }
    }
}

impl PlanNode for Sort<'_> {
    fn iter(&self) -> TupleIter<'_> {
        let mut buffer: Vec<Tuple> = Vec::new();
        let mut failure: Option<ShaclError> = None;
        for r in self.parent.iter() {
            match r {
                Ok(t) => buffer.push(t),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        if let Some(e) = failure {
            return Box::new(std::iter::once(Err(e)));
        }
        buffer.sort();
        Box::new(buffer.into_iter().map(Ok))
    }

    fn depth(&self) -> usize {
        self.parent.depth() + 1
    }

    fn id(&self) -> PlanId {
        self.id
    }

    fn label(&self) -> String {
        "Sort".to_owned()
    }

    fn explain(&self, out: &mut PlanExplain) {
        if !out.node(self.id, &self.label()) {
            return;
        }
        out.edge(self.parent.id(), self.id);
        self.parent.explain(out);
    }
}
