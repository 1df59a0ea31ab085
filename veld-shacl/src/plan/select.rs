//! Select - the source operator
//!
//! Scans a store view for statements matching a pattern and emits one tuple
//! per match, with columns in caller-specified order. Scan results arrive in
//! statement order (subject first), so a projection that places the subject
//! in column 0 is sorted by column 0 - the compiler leans on this.

use super::{PlanExplain, PlanId, PlanNode, TupleIter};
use crate::tuple::Tuple;
use veld_core::{GraphView, Statement, StatementPattern};

/// Statement position projected into a tuple column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pos {
    Subject,
    Predicate,
    Object,
}

impl Pos {
    fn pick(self, st: &Statement) -> veld_core::Term {
        match self {
            Pos::Subject => st.s.clone(),
            Pos::Predicate => st.p.clone(),
            Pos::Object => st.o.clone(),
        }
    }
}

/// Source scan over a store view
pub struct Select<'a> {
    id: PlanId,
    view: &'a dyn GraphView,
    pattern: StatementPattern,
    projection: Vec<Pos>,
}

impl<'a> Select<'a> {
    pub fn new(
        id: PlanId,
        view: &'a dyn GraphView,
        pattern: StatementPattern,
        projection: Vec<Pos>,
    ) -> Self {
        Self {
            id,
            view,
            pattern,
            projection,
        }
    }

    /// True if the emitted stream is sorted by column 0
    ///
    /// Holds exactly when the projection puts the subject first, because
    /// scans are in subject-first statement order.
    pub fn sorted_by_focus(&self) -> bool {
        matches!(self.projection.first(), Some(Pos::Subject))
    }
}

impl PlanNode for Select<'_> {
    fn iter(&self) -> TupleIter<'_> {
        let projection = &self.projection;
        Box::new(self.view.scan(&self.pattern).map(move |r| {
            let st = r?;
            Ok(Tuple::new(
                projection.iter().map(|pos| pos.pick(&st)).collect(),
            ))
        }))
    }

    fn depth(&self) -> usize {
        0
    }

    fn id(&self) -> PlanId {
        self.id
    }

    fn label(&self) -> String {
        format!("Select({})", self.pattern)
    }

    fn explain(&self, out: &mut PlanExplain) {
        out.node(self.id, &self.label());
    }
}
