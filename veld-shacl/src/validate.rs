//! Delta-aware validation
//!
//! [`ShaclValidator`] owns the immutable [`ShapeCatalog`] of a store and
//! decides, per pending transaction, whether the post-transaction graph
//! still conforms. Only shapes whose verdict the delta could change are
//! compiled and run; everything else is skipped outright. Plan graphs, the
//! id counter and the select cache all live for exactly one pass.
//!
//! A validation error (store failure mid-scan) propagates out of `validate`;
//! the transaction layer treats that as a rejection, never as conformance.

use crate::ast::ShapeId;
use crate::compile::{PlanFactory, ValidationViews};
use crate::error::Result;
use crate::parse::ShapeCatalog;
use crate::plan::{explain, PlanCache, PlanIds};
use crate::tuple::Tuple;
use rustc_hash::FxHashSet;
use tracing::{debug, info_span};
use veld_core::{GraphView, TxnDelta};

/// Validator construction-time configuration
#[derive(Debug, Clone, Copy)]
pub struct ValidatorConfig {
    /// When false, every pass short-circuits to conformance
    pub validation_enabled: bool,
    /// Log the explain text of every plan that runs
    pub print_plans: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            validation_enabled: true,
            print_plans: false,
        }
    }
}

/// One violation: a shape, the constraint that fired, and the offending row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub shape: ShapeId,
    pub constraint: &'static str,
    pub tuple: Tuple,
    /// Rendered history of the offending tuple, derivation steps in order
    pub explanation: Vec<String>,
}

/// Outcome of one validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    results: Vec<ValidationResult>,
}

impl ValidationReport {
    /// A report with no violations
    pub fn conforming() -> Self {
        Self::default()
    }

    pub fn conforms(&self) -> bool {
        self.results.is_empty()
    }

    pub fn results(&self) -> &[ValidationResult] {
        &self.results
    }
}

/// The constraint engine of one store
#[derive(Debug, Clone)]
pub struct ShaclValidator {
    catalog: ShapeCatalog,
    config: ValidatorConfig,
}

impl ShaclValidator {
    pub fn new(catalog: ShapeCatalog, config: ValidatorConfig) -> Self {
        Self { catalog, config }
    }

    pub fn catalog(&self) -> &ShapeCatalog {
        &self.catalog
    }

    /// Validate `base` with `delta` applied.
    ///
    /// Idempotent for a fixed base image and delta: two calls produce the
    /// same report.
    pub fn validate(&self, base: &dyn GraphView, delta: &TxnDelta) -> Result<ValidationReport> {
        if !self.config.validation_enabled || self.catalog.is_empty() || delta.is_empty() {
            return Ok(ValidationReport::conforming());
        }

        let span = info_span!("validate", shapes = self.catalog.len());
        let _guard = span.enter();

        let full = delta.staged_view(base);
        let added = delta.added_view();
        let removed = delta.removed_view();
        let views = ValidationViews {
            full: &full,
            added: &added,
            removed: &removed,
        };
        let ids = PlanIds::new();
        let cache = PlanCache::new();
        let factory = PlanFactory::new(views, &ids, &cache);

        let mut seen: FxHashSet<(ShapeId, &'static str, Tuple)> = FxHashSet::default();
        let mut results = Vec::new();

        for shape in self.catalog.shapes() {
            if shape.is_trivially_conforming() {
                continue;
            }
            if !factory.requires_evaluation(shape)? {
                debug!(shape = %shape.id, "delta cannot affect shape, skipping");
                continue;
            }
            for property in &shape.properties {
                let plan = match factory.delta_plan(shape, property)? {
                    Some(delta_plan) => delta_plan,
                    None => factory.full_plan(shape, property)?,
                };
                if self.config.print_plans {
                    debug!(
                        shape = %plan.shape(),
                        constraint = plan.constraint(),
                        plan = %explain(plan.root()),
                        "running plan"
                    );
                }
                for row in plan.root().iter() {
                    let tuple = row?;
                    let key = (plan.shape().clone(), plan.constraint(), tuple.clone());
                    if !seen.insert(key) {
                        continue;
                    }
                    let explanation = tuple
                        .history()
                        .iter()
                        .map(|step| step.to_string())
                        .collect();
                    results.push(ValidationResult {
                        shape: plan.shape().clone(),
                        constraint: plan.constraint(),
                        tuple,
                        explanation,
                    });
                }
            }
        }

        results.sort_by(|a, b| {
            (&a.shape, a.constraint, &a.tuple).cmp(&(&b.shape, b.constraint, &b.tuple))
        });
        debug!(violations = results.len(), "validation pass done");
        Ok(ValidationReport { results })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veld_core::vocab::{rdf, sh};
    use veld_core::{MemoryGraph, Statement, Term};

    fn iri(s: &str) -> Term {
        Term::iri(format!("http://example.org/{s}"))
    }

    fn st(s: Term, p: Term, o: Term) -> Statement {
        Statement::new(s, p, o)
    }

    fn painter_catalog() -> ShapeCatalog {
        let shapes = MemoryGraph::from_statements([
            st(iri("PainterShape"), sh::target_class(), iri("Painter")),
            st(iri("PainterShape"), sh::property(), iri("paintsShape")),
            st(iri("paintsShape"), sh::path(), iri("paints")),
            st(iri("paintsShape"), sh::min_count(), Term::literal("1")),
        ]);
        ShapeCatalog::parse(&shapes).unwrap()
    }

    fn validator(catalog: ShapeCatalog) -> ShaclValidator {
        ShaclValidator::new(catalog, ValidatorConfig::default())
    }

    #[test]
    fn paired_type_and_path_conform() {
        let base = MemoryGraph::new();
        let mut delta = TxnDelta::new();
        delta.add(st(iri("picasso"), rdf::type_(), iri("Painter")));
        delta.add(st(iri("picasso"), iri("paints"), iri("guernica")));
        let report = validator(painter_catalog()).validate(&base, &delta).unwrap();
        assert!(report.conforms());
    }

    #[test]
    fn type_without_path_violates() {
        let base = MemoryGraph::new();
        let mut delta = TxnDelta::new();
        delta.add(st(iri("picasso"), rdf::type_(), iri("Painter")));
        let report = validator(painter_catalog()).validate(&base, &delta).unwrap();
        assert!(!report.conforms());
        assert_eq!(report.results().len(), 1);
        let violation = &report.results()[0];
        assert_eq!(violation.shape, iri("PainterShape"));
        assert_eq!(violation.constraint, "minCount");
        assert_eq!(violation.tuple.focus(), &iri("picasso"));
        assert!(!violation.explanation.is_empty());
    }

    #[test]
    fn removing_the_last_path_statement_violates() {
        let base = MemoryGraph::from_statements([
            st(iri("picasso"), rdf::type_(), iri("Painter")),
            st(iri("picasso"), iri("paints"), iri("guernica")),
        ]);
        let mut delta = TxnDelta::new();
        delta.remove(st(iri("picasso"), iri("paints"), iri("guernica")));
        let report = validator(painter_catalog()).validate(&base, &delta).unwrap();
        assert!(!report.conforms());
    }

    #[test]
    fn unrelated_delta_skips_the_shape() {
        let base = MemoryGraph::from_statements([st(
            iri("picasso"),
            rdf::type_(),
            iri("Painter"),
        )]);
        // The base already violates, but the delta touches nothing the shape
        // constrains, so the pass does not re-check it.
        let mut delta = TxnDelta::new();
        delta.add(st(iri("calder"), iri("sculpts"), iri("mobile")));
        let report = validator(painter_catalog()).validate(&base, &delta).unwrap();
        assert!(report.conforms());
    }

    #[test]
    fn empty_delta_short_circuits() {
        let base = MemoryGraph::new();
        let delta = TxnDelta::new();
        let report = validator(painter_catalog()).validate(&base, &delta).unwrap();
        assert!(report.conforms());
    }

    #[test]
    fn disabled_validation_short_circuits() {
        let base = MemoryGraph::new();
        let mut delta = TxnDelta::new();
        delta.add(st(iri("picasso"), rdf::type_(), iri("Painter")));
        let validator = ShaclValidator::new(
            painter_catalog(),
            ValidatorConfig {
                validation_enabled: false,
                print_plans: false,
            },
        );
        let report = validator.validate(&base, &delta).unwrap();
        assert!(report.conforms());
    }

    #[test]
    fn deactivated_shape_contributes_nothing() {
        let shapes = MemoryGraph::from_statements([
            st(iri("PainterShape"), sh::target_class(), iri("Painter")),
            st(iri("PainterShape"), sh::deactivated(), Term::literal("true")),
            st(iri("PainterShape"), sh::property(), iri("paintsShape")),
            st(iri("paintsShape"), sh::path(), iri("paints")),
            st(iri("paintsShape"), sh::min_count(), Term::literal("1")),
        ]);
        let catalog = ShapeCatalog::parse(&shapes).unwrap();
        let base = MemoryGraph::new();
        let mut delta = TxnDelta::new();
        delta.add(st(iri("picasso"), rdf::type_(), iri("Painter")));
        let report = validator(catalog).validate(&base, &delta).unwrap();
        assert!(report.conforms());
    }

    #[test]
    fn unique_lang_violation_reports_the_focus() {
        let shapes = MemoryGraph::from_statements([
            st(iri("LabelShape"), sh::target_class(), iri("Painter")),
            st(iri("LabelShape"), sh::property(), iri("labelShape")),
            st(iri("labelShape"), sh::path(), iri("label")),
            st(iri("labelShape"), sh::unique_lang(), Term::literal("true")),
        ]);
        let catalog = ShapeCatalog::parse(&shapes).unwrap();
        let base = MemoryGraph::from_statements([
            st(iri("picasso"), rdf::type_(), iri("Painter")),
            st(iri("picasso"), iri("label"), Term::lang_literal("Pablo", "en")),
        ]);
        let mut delta = TxnDelta::new();
        delta.add(st(iri("picasso"), iri("label"), Term::lang_literal("P", "en")));
        let report = validator(catalog).validate(&base, &delta).unwrap();
        assert!(!report.conforms());
        assert_eq!(report.results()[0].constraint, "uniqueLang");
        assert_eq!(report.results()[0].tuple.focus(), &iri("picasso"));
    }

    #[test]
    fn validation_is_idempotent_for_a_fixed_delta() {
        let base = MemoryGraph::new();
        let mut delta = TxnDelta::new();
        delta.add(st(iri("picasso"), rdf::type_(), iri("Painter")));
        let validator = validator(painter_catalog());
        let first = validator.validate(&base, &delta).unwrap();
        let second = validator.validate(&base, &delta).unwrap();
        assert_eq!(first, second);
    }
}
