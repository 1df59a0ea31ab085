//! Shape-to-plan compilation
//!
//! [`PlanFactory`] turns a parsed shape into a [`CompiledPlan`]: a plan-node
//! DAG whose iteration emits one tuple per violation. Plans come in two
//! flavors. The full plan checks every focus node the shape targets against
//! the post-transaction graph. The delta plan, available where it provably
//! gives the same verdict, restricts the candidate focus nodes to those the
//! transaction could have affected and is the reason a commit does not
//! re-scan the whole dataset.
//!
//! Combinators compile to filters over the focus stream, threaded with a
//! polarity flag: every constraint can produce its violating or its
//! satisfied filter. `sh:or` is violated when every branch filter passes
//! (branch filters chained), satisfied when any does (branch filters
//! unioned); `sh:not` is the same with the branch polarity flipped.
//!
//! Sortedness is established by construction. Scans project the subject into
//! column 0 where possible; anything else gets an explicit [`Sort`] before
//! an operator that needs runs of equal focus nodes.

use crate::ast::{NodeShape, PropertyShape, ShapeId, ShapeKind, Target};
use crate::error::{Result, ShaclError};
use crate::plan::{
    BoxedPlan, CachedSelect, EnrichWithShape, FilterOn, LangMode, LangUniqueness,
    MembershipFilter, PlanCache, PlanIds, PlanNode, Pos, Select, SelectKey, SetFilter, Sort, Trim,
    Union, Unique, Values,
};
use crate::tuple::Tuple;
use std::collections::BTreeSet;
use veld_core::vocab::rdf;
use veld_core::{GraphView, StatementPattern, Term};

/// Which store view a source scan runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanScope {
    /// The post-transaction graph (base with the delta applied)
    Full,
    /// Only the statements the transaction adds
    Added,
    /// Only the statements the transaction removes
    Removed,
}

/// The three store views of one validation pass
#[derive(Clone, Copy)]
pub struct ValidationViews<'a> {
    pub full: &'a dyn GraphView,
    pub added: &'a dyn GraphView,
    pub removed: &'a dyn GraphView,
}

/// A compiled, ready-to-iterate violation plan for one constraint
pub struct CompiledPlan<'a> {
    shape: ShapeId,
    constraint: &'static str,
    root: BoxedPlan<'a>,
}

impl<'a> CompiledPlan<'a> {
    pub fn shape(&self) -> &ShapeId {
        &self.shape
    }

    pub fn constraint(&self) -> &'static str {
        self.constraint
    }

    pub fn root(&self) -> &dyn PlanNode {
        self.root.as_ref()
    }
}

/// Builder of a focus-node stream, callable once per consumer so each plan
/// branch owns its own subtree
type MakePlan<'a, 'f> = &'f dyn Fn() -> Result<BoxedPlan<'a>>;

/// One-pass plan builder over a fixed set of views
///
/// Holds the pass-scoped id counter and select cache; dropped with the pass.
pub struct PlanFactory<'a> {
    views: ValidationViews<'a>,
    ids: &'a PlanIds,
    cache: &'a PlanCache,
}

impl<'a> PlanFactory<'a> {
    pub fn new(views: ValidationViews<'a>, ids: &'a PlanIds, cache: &'a PlanCache) -> Self {
        Self { views, ids, cache }
    }

    fn view(&self, scope: PlanScope) -> &'a dyn GraphView {
        match scope {
            PlanScope::Full => self.views.full,
            PlanScope::Added => self.views.added,
            PlanScope::Removed => self.views.removed,
        }
    }

    /// Memoized source scan
    fn select(
        &self,
        scope: PlanScope,
        pattern: StatementPattern,
        projection: Vec<Pos>,
    ) -> BoxedPlan<'a> {
        let key = SelectKey {
            scope,
            pattern: pattern.clone(),
            projection: projection.clone(),
        };
        let inner = Select::new(self.ids.next(), self.view(scope), pattern, projection);
        Box::new(CachedSelect::new(self.ids.next(), key, self.cache, inner))
    }

    /// Violation plan for one property shape of one node shape
    pub fn full_plan(
        &self,
        shape: &NodeShape,
        property: &PropertyShape,
    ) -> Result<CompiledPlan<'a>> {
        let plan = self.constraint_plan(&shape.targets, property)?;
        Ok(self.finish(shape, property, plan))
    }

    /// Delta-restricted violation plan, where it is verdict-equivalent
    ///
    /// Only min-count qualifies: its verdict for a focus node depends solely
    /// on the post-transaction graph, so restricting candidates to foci the
    /// delta touched (new targets, or targets that lost a path statement)
    /// cannot change the answer. Language uniqueness has no such restriction
    /// because an added statement can clash with untouched ones.
    ///
    /// Verdict equivalence assumes the pre-transaction graph conforms. Every
    /// committed state is validated before it lands, so the only way to break
    /// the assumption is opening a ledger over nonconforming data; foci
    /// already violating before the delta stay invisible to this plan.
    pub fn delta_plan(
        &self,
        shape: &NodeShape,
        property: &PropertyShape,
    ) -> Result<Option<CompiledPlan<'a>>> {
        let ShapeKind::MinCount { .. } = property.kind else {
            return Ok(None);
        };
        let fresh_targets = self.target_plan(&shape.targets, PlanScope::Added);
        let path = property.path.clone();
        let lost_path = self.target_filter(&shape.targets, &|| {
            self.select(
                PlanScope::Removed,
                StatementPattern::predicate(path.clone()),
                vec![Pos::Subject],
            )
        });
        let candidates = Box::new(Unique::new(
            self.ids.next(),
            Box::new(Sort::new(
                self.ids.next(),
                Box::new(Union::new(self.ids.next(), vec![fresh_targets, lost_path])),
            )),
        ));
        let plan: BoxedPlan<'a> = Box::new(MembershipFilter::new(
            self.ids.next(),
            self.views.full,
            property.path.clone(),
            None,
            FilterOn::Subject,
            0,
            false,
            candidates,
        ));
        Ok(Some(self.finish(shape, property, plan)))
    }

    fn finish(
        &self,
        shape: &NodeShape,
        property: &PropertyShape,
        plan: BoxedPlan<'a>,
    ) -> CompiledPlan<'a> {
        let root = Box::new(EnrichWithShape::new(self.ids.next(), shape.id.clone(), plan));
        CompiledPlan {
            shape: shape.id.clone(),
            constraint: property.kind.constraint_name(),
            root,
        }
    }

    /// Sources of candidate focus nodes, one per target selector
    ///
    /// The flag says whether the source streams sorted by focus.
    fn target_sources(
        &self,
        targets: &[Target],
        scope: PlanScope,
    ) -> Vec<(BoxedPlan<'a>, bool)> {
        targets
            .iter()
            .map(|target| match target {
                Target::Class(class) => (
                    self.select(
                        scope,
                        StatementPattern::predicate_object(rdf::type_(), class.clone()),
                        vec![Pos::Subject],
                    ),
                    true,
                ),
                Target::SubjectsOf(predicate) => (
                    self.select(
                        scope,
                        StatementPattern::predicate(predicate.clone()),
                        vec![Pos::Subject],
                    ),
                    true,
                ),
                Target::ObjectsOf(predicate) => {
                    // Scan order is subject-first, so the projected object
                    // column is unsorted; the caller inserts the sort.
                    let select = self.select(
                        scope,
                        StatementPattern::predicate(predicate.clone()),
                        vec![Pos::Predicate, Pos::Object],
                    );
                    (
                        Box::new(Trim::new(self.ids.next(), select, 1)) as BoxedPlan<'a>,
                        false,
                    )
                }
                Target::Node(node) => (
                    Box::new(Values::new(
                        self.ids.next(),
                        vec![Tuple::new(vec![node.clone()])],
                    )) as BoxedPlan<'a>,
                    true,
                ),
            })
            .collect()
    }

    /// Deduplicated, focus-sorted stream of a shape's target nodes in `scope`
    fn target_plan(&self, targets: &[Target], scope: PlanScope) -> BoxedPlan<'a> {
        let mut sources = self.target_sources(targets, scope);
        let inner: BoxedPlan<'a> = if sources.len() == 1 && sources[0].1 {
            sources.remove(0).0
        } else {
            let branches = sources.into_iter().map(|(plan, _)| plan).collect();
            Box::new(Sort::new(
                self.ids.next(),
                Box::new(Union::new(self.ids.next(), branches)),
            ))
        };
        Box::new(Unique::new(self.ids.next(), inner))
    }

    /// Restrict a candidate stream to tuples whose focus is a target node
    ///
    /// Membership is always tested against the full view. `make_parent` must
    /// build a focus-sorted stream; it is called once per target selector so
    /// each branch owns its own subtree.
    fn target_filter(
        &self,
        targets: &[Target],
        make_parent: &dyn Fn() -> BoxedPlan<'a>,
    ) -> BoxedPlan<'a> {
        let mut branches: Vec<BoxedPlan<'a>> = targets
            .iter()
            .map(|target| {
                let parent = make_parent();
                match target {
                    Target::Class(class) => Box::new(MembershipFilter::new(
                        self.ids.next(),
                        self.views.full,
                        rdf::type_(),
                        Some(class.clone()),
                        FilterOn::Subject,
                        0,
                        true,
                        parent,
                    )) as BoxedPlan<'a>,
                    Target::SubjectsOf(predicate) => Box::new(MembershipFilter::new(
                        self.ids.next(),
                        self.views.full,
                        predicate.clone(),
                        None,
                        FilterOn::Subject,
                        0,
                        true,
                        parent,
                    )),
                    Target::ObjectsOf(predicate) => Box::new(MembershipFilter::new(
                        self.ids.next(),
                        self.views.full,
                        predicate.clone(),
                        None,
                        FilterOn::Object,
                        0,
                        true,
                        parent,
                    )),
                    Target::Node(node) => Box::new(SetFilter::new(
                        self.ids.next(),
                        BTreeSet::from([node.clone()]),
                        0,
                        true,
                        parent,
                    )),
                }
            })
            .collect();
        if branches.len() == 1 {
            branches.remove(0)
        } else {
            Box::new(Sort::new(
                self.ids.next(),
                Box::new(Union::new(self.ids.next(), branches)),
            ))
        }
    }

    /// Violation plan for one constraint over the shape's targets
    fn constraint_plan(
        &self,
        targets: &[Target],
        property: &PropertyShape,
    ) -> Result<BoxedPlan<'a>> {
        match &property.kind {
            ShapeKind::UniqueLang => {
                let path = property.path.clone();
                let values = self.target_filter(targets, &|| {
                    self.select(
                        PlanScope::Full,
                        StatementPattern::predicate(path.clone()),
                        vec![Pos::Subject, Pos::Object],
                    )
                });
                Ok(Box::new(LangUniqueness::new(
                    self.ids.next(),
                    LangMode::OnlyNotUnique,
                    values,
                )))
            }
            _ => self.violation_filter(
                &|| Ok(self.target_plan(targets, PlanScope::Full)),
                property,
                false,
            ),
        }
    }

    /// Filter the focus stream from `make_parent` down to the foci that
    /// violate (`negate` false) or satisfy (`negate` true) `property`
    fn violation_filter(
        &self,
        make_parent: MakePlan<'a, '_>,
        property: &PropertyShape,
        negate: bool,
    ) -> Result<BoxedPlan<'a>> {
        match &property.kind {
            ShapeKind::MinCount { .. } => Ok(Box::new(MembershipFilter::new(
                self.ids.next(),
                self.views.full,
                property.path.clone(),
                None,
                FilterOn::Subject,
                0,
                negate,
                make_parent()?,
            ))),
            // Rejected at parse time inside combinators; its satisfied side
            // is not expressible as a membership test.
            ShapeKind::UniqueLang => Err(ShaclError::unsupported(
                &property.id,
                "sh:uniqueLang inside a combinator",
            )),
            // not violated = every branch satisfied; not satisfied = any
            // branch violated
            ShapeKind::Not(inner) => {
                if negate {
                    self.any_of(make_parent, &inner.branches, false)
                } else {
                    self.all_of(make_parent, &inner.branches, true)
                }
            }
            // or violated = every branch violated; or satisfied = any branch
            // satisfied
            ShapeKind::Or(inner) => {
                if negate {
                    self.any_of(make_parent, &inner.branches, true)
                } else {
                    self.all_of(make_parent, &inner.branches, false)
                }
            }
        }
    }

    /// Foci passing every branch filter: the branch filters chained
    fn all_of(
        &self,
        make_parent: MakePlan<'a, '_>,
        branches: &[PropertyShape],
        branch_negate: bool,
    ) -> Result<BoxedPlan<'a>> {
        match branches.split_first() {
            None => make_parent(),
            Some((first, rest)) if rest.is_empty() => {
                self.violation_filter(make_parent, first, branch_negate)
            }
            Some((first, rest)) => self.violation_filter(
                &|| self.all_of(make_parent, rest, branch_negate),
                first,
                branch_negate,
            ),
        }
    }

    /// Foci passing at least one branch filter: the branch outputs unioned,
    /// deduplicated on the focus node
    fn any_of(
        &self,
        make_parent: MakePlan<'a, '_>,
        branches: &[PropertyShape],
        branch_negate: bool,
    ) -> Result<BoxedPlan<'a>> {
        let mut plans = Vec::with_capacity(branches.len());
        for branch in branches {
            plans.push(self.violation_filter(make_parent, branch, branch_negate)?);
        }
        Ok(if plans.len() == 1 {
            plans.remove(0)
        } else {
            Box::new(Unique::new(
                self.ids.next(),
                Box::new(Sort::new(
                    self.ids.next(),
                    Box::new(Union::new(self.ids.next(), plans)),
                )),
            ))
        })
    }

    /// Could this delta change the shape's verdict?
    ///
    /// Conservative over-approximation: true whenever the delta touches a
    /// target-defining predicate, a declared target node, or any constrained
    /// path. Deactivated shapes never require evaluation.
    pub fn requires_evaluation(&self, shape: &NodeShape) -> Result<bool> {
        if shape.deactivated {
            return Ok(false);
        }
        for view in [self.views.added, self.views.removed] {
            for target in &shape.targets {
                let touched = match target {
                    Target::Class(class) => {
                        view.has_statement(None, Some(&rdf::type_()), Some(class))?
                    }
                    Target::SubjectsOf(p) | Target::ObjectsOf(p) => {
                        view.has_statement(None, Some(p), None)?
                    }
                    Target::Node(node) => view.has_statement(Some(node), None, None)?,
                };
                if touched {
                    return Ok(true);
                }
            }
            for path in constrained_paths(&shape.properties) {
                if view.has_statement(None, Some(path), None)? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

/// Every path constrained by the given property shapes, combinators included
fn constrained_paths(properties: &[PropertyShape]) -> BTreeSet<&Term> {
    let mut paths = BTreeSet::new();
    let mut pending: Vec<&PropertyShape> = properties.iter().collect();
    while let Some(property) = pending.pop() {
        paths.insert(&property.path);
        match &property.kind {
            ShapeKind::Not(or) | ShapeKind::Or(or) => {
                pending.extend(or.branches.iter());
            }
            ShapeKind::MinCount { .. } | ShapeKind::UniqueLang => {}
        }
    }
    paths
}
