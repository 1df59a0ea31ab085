//! Core data model for Veld
//!
//! This crate provides the substrate the validation engine is built on:
//!
//! - [`Term`] - an RDF term (IRI, blank node, or literal with an optional
//!   language tag). Immutable, totally ordered, cheap to clone.
//! - [`Statement`] - an (subject, predicate, object, optional context)
//!   quad with structural equality and subject-first ordering.
//! - [`GraphView`] - the store contract consumed by the engine: sorted
//!   pattern scans and membership tests over some image of the graph.
//! - [`MemoryGraph`] - the baseline sorted in-memory statement set.
//! - [`TxnDelta`] and its views ([`AddedView`], [`RemovedView`],
//!   [`StagedView`]) - the added/removed statement sets of one pending
//!   transaction, exposed as graph views.
//!
//! The subject-first statement ordering is load-bearing: a pattern scan that
//! projects the subject into column 0 is sorted by that column, which is the
//! precondition several downstream streaming operators rely on.

pub mod delta;
pub mod error;
pub mod graph;
pub mod statement;
pub mod term;
pub mod vocab;

pub use delta::{AddedView, IsolationLevel, RemovedView, StagedView, TxnDelta};
pub use error::{Result, StoreError};
pub use graph::{GraphView, MemoryGraph, StatementIter};
pub use statement::{Statement, StatementPattern};
pub use term::Term;
