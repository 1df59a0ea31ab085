//! SHACL validation engine for Veld
//!
//! This crate decides, per transaction commit, whether the mutated graph
//! still conforms to the declared shape constraints - incrementally, without
//! re-scanning the whole dataset on every commit.
//!
//! # Overview
//!
//! Validation works by:
//! 1. Parsing shape declarations once, at store-open time, into a
//!    [`ShapeCatalog`] (the shape AST)
//! 2. Selecting, per commit, the shapes whose verdict the transaction delta
//!    could possibly change (`requires_evaluation`)
//! 3. Compiling each affected shape into a DAG of lazy streaming plan nodes
//!    over the full / added / removed views of the store
//! 4. Collecting every tuple a plan emits as a violation attributed to its
//!    shape, and aggregating the verdict into a [`ValidationReport`]
//!
//! Plan graphs and tuples are built and discarded per validation pass; the
//! shape AST is immutable for the store's lifetime.
//!
//! # Supported constraints
//!
//! The engine covers the general mechanism - target selection
//! (`sh:targetClass`, `sh:targetNode`, `sh:targetSubjectsOf`,
//! `sh:targetObjectsOf`), the boolean combinators `sh:not` and `sh:or`,
//! property-path membership filters - plus two representative checks:
//! `sh:minCount 1` and `sh:uniqueLang`.

pub mod ast;
pub mod compile;
pub mod error;
pub mod parse;
pub mod plan;
pub mod tuple;
pub mod validate;

pub use ast::{NodeShape, OrShape, PropertyShape, ShapeId, ShapeKind, Target};
pub use compile::{CompiledPlan, PlanFactory, PlanScope, ValidationViews};
pub use error::{Result, ShaclError};
pub use parse::ShapeCatalog;
pub use tuple::Tuple;
pub use validate::{ShaclValidator, ValidationReport, ValidationResult, ValidatorConfig};
