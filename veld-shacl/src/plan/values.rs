//! Values - fixed-tuple source
//!
//! Emits a fixed, pre-sorted list of tuples. Used for `sh:targetNode`
//! targets, where the focus nodes are named in the shape itself rather than
//! selected from the store.

use super::{PlanExplain, PlanId, PlanNode, TupleIter};
use crate::tuple::Tuple;

/// Fixed-tuple source node
pub struct Values {
    id: PlanId,
    tuples: Vec<Tuple>,
}

impl Values {
    /// Create from tuples; sorts them so downstream run detection works
    pub fn new(id: PlanId, mut tuples: Vec<Tuple>) -> Self {
        tuples.sort();
        Self { id, tuples }
    }
}

impl PlanNode for Values {
    fn iter(&self) -> TupleIter<'_> {
        Box::new(self.tuples.iter().cloned().map(Ok))
    }

    fn depth(&self) -> usize {
        0
    }

    fn id(&self) -> PlanId {
        self.id
    }

    fn label(&self) -> String {
        format!("Values({})", self.tuples.len())
    }

    fn explain(&self, out: &mut PlanExplain) {
        out.node(self.id, &self.label());
    }
}
