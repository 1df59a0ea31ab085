//! Shape AST
//!
//! The parsed, immutable form of a shapes graph. A [`ShapeCatalog`] owns a
//! list of [`NodeShape`]s; each node shape owns its targets and property
//! shapes. Combinator shapes ([`ShapeKind::Not`], [`ShapeKind::Or`]) nest
//! via [`OrShape`] so that a single-branch `sh:not` and a multi-branch
//! `sh:or` share one representation.

use std::sync::Arc;
use veld_core::Term;

/// Shapes are identified by the term that names them in the shapes graph.
pub type ShapeId = Term;

/// Focus-node selector attached to a node shape
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Target {
    /// All subjects with `rdf:type <class>`
    Class(Term),
    /// An explicitly enumerated focus node
    Node(Term),
    /// All subjects of statements with the given predicate
    SubjectsOf(Term),
    /// All objects of statements with the given predicate
    ObjectsOf(Term),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeShape {
    pub id: ShapeId,
    pub targets: Vec<Target>,
    pub properties: Vec<PropertyShape>,
    pub deactivated: bool,
}

impl NodeShape {
    /// A shape with no targets or no constraints selects nothing to check.
    pub fn is_trivially_conforming(&self) -> bool {
        self.deactivated || self.targets.is_empty() || self.properties.is_empty()
    }
}

/// One constraint over one predicate path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyShape {
    pub id: ShapeId,
    pub path: Term,
    pub kind: ShapeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeKind {
    MinCount { min: u32 },
    UniqueLang,
    Not(Arc<OrShape>),
    Or(Arc<OrShape>),
}

impl ShapeKind {
    pub fn constraint_name(&self) -> &'static str {
        match self {
            ShapeKind::MinCount { .. } => "minCount",
            ShapeKind::UniqueLang => "uniqueLang",
            ShapeKind::Not(_) => "not",
            ShapeKind::Or(_) => "or",
        }
    }
}

/// Disjunction of property shapes over the same focus nodes
///
/// `sh:not X` parses as a one-branch disjunction so negation and
/// alternation share the plan construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrShape {
    pub id: ShapeId,
    pub branches: Vec<PropertyShape>,
}
