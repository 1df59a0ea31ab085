//! Membership filters against an external store view
//!
//! [`MembershipFilter`] tests, for each parent tuple, whether the term at a
//! given column participates as subject (or object) of at least one
//! statement with a fixed predicate - and optionally a fixed object - in a
//! given view. The tuple is emitted iff the test result matches the
//! configured polarity, and the (value, predicate) pair used for the test is
//! recorded into the tuple's history.
//!
//! [`SetFilter`] is the degenerate in-memory variant used for
//! `sh:targetNode`: membership in a fixed term set instead of the store.

use super::{BoxedPlan, PlanExplain, PlanId, PlanNode, TupleIter};
use crate::error::Result;
use crate::tuple::Tuple;
use std::collections::BTreeSet;
use veld_core::{GraphView, Term};

/// Which statement position the tested term must occupy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOn {
    Subject,
    Object,
}

/// Store-membership filter with configurable polarity
pub struct MembershipFilter<'a> {
    id: PlanId,
    view: &'a dyn GraphView,
    predicate: Term,
    /// Optional fixed object, e.g. the class term for an rdf:type test
    object: Option<Term>,
    on: FilterOn,
    column: usize,
    return_matching: bool,
    parent: BoxedPlan<'a>,
}

impl<'a> MembershipFilter<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: PlanId,
        view: &'a dyn GraphView,
        predicate: Term,
        object: Option<Term>,
        on: FilterOn,
        column: usize,
        return_matching: bool,
        parent: BoxedPlan<'a>,
    ) -> Self {
        Self {
            id,
            view,
            predicate,
            object,
            on,
            column,
            return_matching,
            parent,
        }
    }

    fn matches(&self, value: &Term) -> Result<bool> {
        // Literals never occur in subject position; for object-side tests a
        // literal value is still a legitimate object.
        match self.on {
            FilterOn::Subject => {
                if !value.is_resource() {
                    return Ok(false);
                }
                Ok(self.view.has_statement(
                    Some(value),
                    Some(&self.predicate),
                    self.object.as_ref(),
                )?)
            }
            FilterOn::Object => {
                Ok(self
                    .view
                    .has_statement(None, Some(&self.predicate), Some(value))?)
            }
        }
    }
}

impl PlanNode for MembershipFilter<'_> {
    fn iter(&self) -> TupleIter<'_> {
        Box::new(self.parent.iter().filter_map(move |r| {
            let mut tuple = match r {
                Ok(t) => t,
                Err(e) => return Some(Err(e)),
            };
            let value = tuple.col(self.column).clone();
            match self.matches(&value) {
                Err(e) => Some(Err(e)),
                Ok(matched) if matched == self.return_matching => {
                    tuple.add_history(Tuple::new(vec![value, self.predicate.clone()]));
                    Some(Ok(tuple))
                }
                Ok(_) => None,
            }
        }))
    }

    fn depth(&self) -> usize {
        self.parent.depth() + 1
    }

    fn id(&self) -> PlanId {
        self.id
    }

    fn label(&self) -> String {
        let side = match self.on {
            FilterOn::Subject => "subjectOf",
            FilterOn::Object => "objectOf",
        };
        format!(
            "MembershipFilter({side} {}, matching={})",
            self.predicate, self.return_matching
        )
    }

    fn explain(&self, out: &mut PlanExplain) {
        if !out.node(self.id, &self.label()) {
            return;
        }
        out.edge(self.parent.id(), self.id);
        self.parent.explain(out);
    }
}

/// Fixed-set membership filter on a column
pub struct SetFilter<'a> {
    id: PlanId,
    accept: BTreeSet<Term>,
    column: usize,
    return_matching: bool,
    parent: BoxedPlan<'a>,
}

impl<'a> SetFilter<'a> {
    pub fn new(
        id: PlanId,
        accept: BTreeSet<Term>,
        column: usize,
        return_matching: bool,
        parent: BoxedPlan<'a>,
    ) -> Self {
        Self {
            id,
            accept,
            column,
            return_matching,
            parent,
        }
    }
}

impl PlanNode for SetFilter<'_> {
    fn iter(&self) -> TupleIter<'_> {
        Box::new(self.parent.iter().filter(move |r| match r {
            Ok(t) => self.accept.contains(t.col(self.column)) == self.return_matching,
            Err(_) => true,
        }))
    }

    fn depth(&self) -> usize {
        self.parent.depth() + 1
    }

    fn id(&self) -> PlanId {
        self.id
    }

    fn label(&self) -> String {
        format!("SetFilter({}, matching={})", self.accept.len(), self.return_matching)
    }

    fn explain(&self, out: &mut PlanExplain) {
        if !out.node(self.id, &self.label()) {
            return;
        }
        out.edge(self.parent.id(), self.id);
        self.parent.explain(out);
    }
}
