//! Plan node runtime
//!
//! A compiled shape check is a DAG of [`PlanNode`]s: lazy, pull-based
//! streaming operators. Children own their parents; plan graphs are rebuilt
//! per validation pass and never persisted.
//!
//! Every operator follows the same contract:
//!
//! - [`PlanNode::iter`] produces a single-pass, forward-only sequence of
//!   fallible tuples. Consuming it exhausts it; a fresh call yields a fresh
//!   pass. Dropping an iterator mid-stream releases everything it holds -
//!   there is no separate close path.
//! - [`PlanNode::depth`] is the distance from the nearest source node,
//!   bounding explain output and flagging pathological fan-out.
//! - For a fixed store image and fixed delta views, two fresh passes yield
//!   the same multiset of tuples. Order is significant only where an
//!   operator states a sortedness precondition; the compiler discharges
//!   those preconditions by construction (scan order or an explicit
//!   [`Sort`] stage), so they are never checked at runtime.

mod cache;
mod enrich;
mod filter;
mod lang;
mod select;
mod sort;
mod trim;
mod union;
mod unique;
mod values;

pub use cache::{CachedSelect, PlanCache, SelectKey};
pub use enrich::EnrichWithShape;
pub use filter::{FilterOn, MembershipFilter, SetFilter};
pub use lang::{LangMode, LangUniqueness};
pub use select::{Pos, Select};
pub use sort::Sort;
pub use trim::Trim;
pub use union::Union;
pub use unique::Unique;
pub use values::Values;

use crate::error::Result;
use crate::tuple::Tuple;
use rustc_hash::FxHashSet;
use std::cell::Cell;
use std::fmt;

/// A lazy stream of plan output rows
pub type TupleIter<'a> = Box<dyn Iterator<Item = Result<Tuple>> + 'a>;

/// An owned plan subtree
pub type BoxedPlan<'a> = Box<dyn PlanNode + 'a>;

/// Stable integer id of a plan node within one compiled plan
///
/// Assigned at build time from a per-pass counter; diagnostics print the
/// index, never a memory address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlanId(pub u32);

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Build-time id counter, one per validation pass
#[derive(Debug, Default)]
pub struct PlanIds(Cell<u32>);

impl PlanIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id
    pub fn next(&self) -> PlanId {
        let id = self.0.get();
        self.0.set(id + 1);
        PlanId(id)
    }
}

/// A streaming operator in a compiled plan
pub trait PlanNode {
    /// Fresh single-pass iteration of this subtree
    fn iter(&self) -> TupleIter<'_>;

    /// DAG depth from the nearest source node
    fn depth(&self) -> usize;

    /// Stable id for diagnostics
    fn id(&self) -> PlanId;

    /// Operator label for explain output
    fn label(&self) -> String;

    /// Write this node and its incoming edges into the explain collector,
    /// then recurse into parents
    fn explain(&self, out: &mut PlanExplain);
}

/// Collector for plan-explain output: node labels plus edges
///
/// Rendered as one `id [label="..."];` line per node followed by
/// `parent -> child` lines, in discovery order. Shared subtrees are printed
/// once.
#[derive(Debug, Default)]
pub struct PlanExplain {
    nodes: Vec<String>,
    edges: Vec<String>,
    seen: FxHashSet<PlanId>,
}

impl PlanExplain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a node; returns false if it was already printed
    pub fn node(&mut self, id: PlanId, label: &str) -> bool {
        if !self.seen.insert(id) {
            return false;
        }
        self.nodes.push(format!("{id} [label=\"{label}\"];"));
        true
    }

    /// Record an edge from a parent node into a child node
    pub fn edge(&mut self, parent: PlanId, child: PlanId) {
        self.edges.push(format!("{parent} -> {child}"));
    }

    /// Render the collected graph description
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in self.nodes.iter().chain(self.edges.iter()) {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Render a plan's explain text
pub fn explain(plan: &dyn PlanNode) -> String {
    let mut out = PlanExplain::new();
    plan.explain(&mut out);
    out.render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use veld_core::Term;

    #[test]
    fn plan_ids_are_sequential() {
        let ids = PlanIds::new();
        assert_eq!(ids.next(), PlanId(0));
        assert_eq!(ids.next(), PlanId(1));
    }

    #[test]
    fn explain_prints_shared_nodes_once() {
        let mut out = PlanExplain::new();
        assert!(out.node(PlanId(0), "Select"));
        assert!(!out.node(PlanId(0), "Select"));
        out.edge(PlanId(0), PlanId(1));
        let rendered = out.render();
        assert_eq!(rendered, "0 [label=\"Select\"];\n0 -> 1\n");
    }

    #[test]
    fn explain_walks_a_small_plan() {
        let ids = PlanIds::new();
        let source = Values::new(
            ids.next(),
            vec![Tuple::new(vec![Term::iri("http://example.org/a")])],
        );
        let unique = Unique::new(ids.next(), Box::new(source));
        let text = explain(&unique);
        assert!(text.contains("[label=\"Unique\"];"));
        assert!(text.contains("0 -> 1"));
        assert_eq!(unique.depth(), 1);
    }
}
