//! Shape annotation
//!
//! Pass-through node that tags every tuple flowing out of a plan with the
//! shape that produced it, so a rendered plan and a validation result can
//! both name their origin without threading the shape through every
//! operator.

use super::{BoxedPlan, PlanExplain, PlanId, PlanNode, TupleIter};
use crate::ast::ShapeId;

pub struct EnrichWithShape<'a> {
    id: PlanId,
    shape: ShapeId,
    parent: BoxedPlan<'a>,
}

impl<'a> EnrichWithShape<'a> {
    pub fn new(id: PlanId, shape: ShapeId, parent: BoxedPlan<'a>) -> Self {
        Self { id, shape, parent }
    }

    pub fn shape(&self) -> &ShapeId {
        &self.shape
    }
}

impl PlanNode for EnrichWithShape<'_> {
    fn iter(&self) -> TupleIter<'_> {
        self.parent.iter()
    }

    fn depth(&self) -> usize {
        self.parent.depth() + 1
    }

    fn id(&self) -> PlanId {
        self.id
    }

    fn label(&self) -> String {
        format!("EnrichWithShape({})", self.shape)
    }

    fn explain(&self, out: &mut PlanExplain) {
        if !out.node(self.id, &self.label()) {
            return;
        }
        out.edge(self.parent.id(), self.id);
        self.parent.explain(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::plan::{PlanIds, Values};
    use crate::tuple::Tuple;
    use veld_core::Term;

    #[test]
    fn annotation_is_transparent_to_the_stream() {
        let ids = PlanIds::new();
        let rows = vec![Tuple::new(vec![Term::iri("http://example.org/a")])];
        let values = Box::new(Values::new(ids.next(), rows.clone()));
        let enrich = EnrichWithShape::new(
            ids.next(),
            Term::iri("http://example.org/Shape"),
            values,
        );
        let out: Vec<_> = enrich.iter().collect::<Result<_>>().unwrap();
        assert_eq!(out, rows);
        assert_eq!(enrich.shape(), &Term::iri("http://example.org/Shape"));
    }
}
