//! Shapes-graph parsing
//!
//! Builds a [`ShapeCatalog`] from the RDF statements of a shapes graph, once,
//! at store open. Every subject carrying a target declaration becomes a
//! [`NodeShape`]; its `sh:property` objects become [`PropertyShape`]s, one
//! per constraint component found on the property node. Combinator objects
//! (`sh:not`, `sh:or`) recurse, inheriting the enclosing path unless the
//! branch declares its own `sh:path`.
//!
//! Parsing is fatal-on-error: a malformed or unsupported declaration aborts
//! catalog construction, and with it store startup.

use crate::ast::{NodeShape, OrShape, PropertyShape, ShapeKind, Target};
use crate::error::{Result, ShaclError};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;
use veld_core::vocab::{rdf, sh};
use veld_core::{GraphView, StatementPattern, Term};

/// The parsed, immutable shapes of one store
#[derive(Debug, Clone, Default)]
pub struct ShapeCatalog {
    shapes: Vec<NodeShape>,
}

impl ShapeCatalog {
    /// Parse every node shape declared in `shapes_graph`.
    pub fn parse(shapes_graph: &dyn GraphView) -> Result<Self> {
        let mut subjects: BTreeSet<Term> = BTreeSet::new();
        for target_predicate in [
            sh::target_class(),
            sh::target_node(),
            sh::target_subjects_of(),
            sh::target_objects_of(),
        ] {
            for statement in shapes_graph.scan(&StatementPattern::predicate(target_predicate)) {
                subjects.insert(statement?.s);
            }
        }
        let mut shapes = Vec::with_capacity(subjects.len());
        for subject in subjects {
            shapes.push(parse_node_shape(shapes_graph, subject)?);
        }
        debug!(shapes = shapes.len(), "parsed shape catalog");
        Ok(Self { shapes })
    }

    pub fn shapes(&self) -> &[NodeShape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

fn objects(graph: &dyn GraphView, s: &Term, p: Term) -> Result<Vec<Term>> {
    let mut out = Vec::new();
    for statement in graph.scan(&StatementPattern::subject_predicate(s.clone(), p)) {
        out.push(statement?.o);
    }
    Ok(out)
}

fn single_object(graph: &dyn GraphView, s: &Term, p: Term) -> Result<Option<Term>> {
    let found = objects(graph, s, p.clone())?;
    if found.len() > 1 {
        return Err(ShaclError::parse(
            s,
            format!("expected at most one {p}, found {}", found.len()),
        ));
    }
    Ok(found.into_iter().next())
}

fn bool_object(graph: &dyn GraphView, s: &Term, p: Term) -> Result<bool> {
    Ok(single_object(graph, s, p)?
        .and_then(|o| o.lexical().map(|l| l == "true"))
        .unwrap_or(false))
}

/// Walk an rdf:first/rdf:rest list to its members.
fn list_members(graph: &dyn GraphView, head: &Term) -> Result<Vec<Term>> {
    let mut members = Vec::new();
    let mut visited: BTreeSet<Term> = BTreeSet::new();
    let mut node = head.clone();
    while node != rdf::nil() {
        if !visited.insert(node.clone()) {
            return Err(ShaclError::CircularReference { shape: node });
        }
        let Some(first) = single_object(graph, &node, rdf::first())? else {
            return Err(ShaclError::parse(&node, "list node without rdf:first"));
        };
        members.push(first);
        let Some(rest) = single_object(graph, &node, rdf::rest())? else {
            return Err(ShaclError::parse(&node, "list node without rdf:rest"));
        };
        node = rest;
    }
    Ok(members)
}

fn parse_node_shape(graph: &dyn GraphView, subject: Term) -> Result<NodeShape> {
    let mut targets = Vec::new();
    for o in objects(graph, &subject, sh::target_class())? {
        targets.push(Target::Class(o));
    }
    for o in objects(graph, &subject, sh::target_node())? {
        targets.push(Target::Node(o));
    }
    for o in objects(graph, &subject, sh::target_subjects_of())? {
        targets.push(Target::SubjectsOf(o));
    }
    for o in objects(graph, &subject, sh::target_objects_of())? {
        targets.push(Target::ObjectsOf(o));
    }
    targets.sort();

    let deactivated = bool_object(graph, &subject, sh::deactivated())?;

    let mut properties = Vec::new();
    for property_node in objects(graph, &subject, sh::property())? {
        let mut visited = BTreeSet::new();
        properties.extend(parse_property_shapes(
            graph,
            &property_node,
            None,
            false,
            &mut visited,
        )?);
    }

    Ok(NodeShape {
        id: subject,
        targets,
        properties,
        deactivated,
    })
}

/// Parse every constraint component on one property-shape node.
///
/// Emits one [`PropertyShape`] per component so downstream compilation never
/// has to split a multi-constraint node. `inherited_path` carries the
/// enclosing path into combinator branches; `in_combinator` is true anywhere
/// below a `sh:not` or `sh:or`, where every constraint must compile to a
/// membership filter; `visited` holds the active recursion path, so a shape
/// node referenced from two sibling combinators parses twice, while a node
/// referencing itself through `sh:not`/`sh:or` is rejected.
fn parse_property_shapes(
    graph: &dyn GraphView,
    node: &Term,
    inherited_path: Option<&Term>,
    in_combinator: bool,
    visited: &mut BTreeSet<Term>,
) -> Result<Vec<PropertyShape>> {
    if !visited.insert(node.clone()) {
        return Err(ShaclError::CircularReference {
            shape: node.clone(),
        });
    }
    let shapes = parse_property_node(graph, node, inherited_path, in_combinator, visited);
    visited.remove(node);
    shapes
}

fn parse_property_node(
    graph: &dyn GraphView,
    node: &Term,
    inherited_path: Option<&Term>,
    in_combinator: bool,
    visited: &mut BTreeSet<Term>,
) -> Result<Vec<PropertyShape>> {
    let declared_path = single_object(graph, node, sh::path())?;
    let path = match declared_path.or_else(|| inherited_path.cloned()) {
        Some(p) if p.is_resource() => p,
        Some(p) => {
            return Err(ShaclError::parse(
                node,
                format!("sh:path must be a resource, got {p}"),
            ))
        }
        None => return Err(ShaclError::parse(node, "property shape without sh:path")),
    };

    let mut shapes = Vec::new();

    for o in objects(graph, node, sh::min_count())? {
        let min: u32 = o
            .lexical()
            .and_then(|l| l.parse().ok())
            .ok_or_else(|| ShaclError::parse(node, format!("invalid sh:minCount {o}")))?;
        if min != 1 {
            return Err(ShaclError::unsupported(
                node,
                format!("sh:minCount {min} (only 1 is supported)"),
            ));
        }
        shapes.push(PropertyShape {
            id: node.clone(),
            path: path.clone(),
            kind: ShapeKind::MinCount { min },
        });
    }

    for o in objects(graph, node, sh::unique_lang())? {
        if o.lexical() != Some("true") {
            // uniqueLang false is a no-op constraint
            continue;
        }
        if in_combinator {
            return Err(ShaclError::unsupported(
                node,
                "sh:uniqueLang inside sh:not or sh:or",
            ));
        }
        shapes.push(PropertyShape {
            id: node.clone(),
            path: path.clone(),
            kind: ShapeKind::UniqueLang,
        });
    }

    for negated in objects(graph, node, sh::not())? {
        let branches = parse_property_shapes(graph, &negated, Some(&path), true, visited)?;
        if branches.is_empty() {
            return Err(ShaclError::parse(&negated, "sh:not with no constraints"));
        }
        shapes.push(PropertyShape {
            id: node.clone(),
            path: path.clone(),
            kind: ShapeKind::Not(Arc::new(OrShape {
                id: negated,
                branches,
            })),
        });
    }

    for list_head in objects(graph, node, sh::or())? {
        let mut branches = Vec::new();
        for member in list_members(graph, &list_head)? {
            branches.extend(parse_property_shapes(
                graph,
                &member,
                Some(&path),
                true,
                visited,
            )?);
        }
        if branches.is_empty() {
            return Err(ShaclError::parse(&list_head, "sh:or with no branches"));
        }
        shapes.push(PropertyShape {
            id: node.clone(),
            path: path.clone(),
            kind: ShapeKind::Or(Arc::new(OrShape {
                id: list_head,
                branches,
            })),
        });
    }

    Ok(shapes)
}
