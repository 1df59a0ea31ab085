//! Transactions
//!
//! A [`Transaction`] moves through `Collecting → Validating → {Committed,
//! Rejected}`. Mutations accumulate in a [`TxnDelta`]; nothing touches the
//! shared graph until commit. At commit time the delta is validated against
//! the pinned snapshot with the delta applied, and the graph mutates only on
//! a conforming pass - a rejected transaction leaves no trace.
//!
//! Under [`IsolationLevel::Snapshot`] every read of the pass sees the image
//! pinned at begin. [`IsolationLevel::Serializable`] additionally rejects
//! the commit if another transaction committed in between.

use crate::error::{Result, TransactError};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info_span};
use veld_core::{IsolationLevel, MemoryGraph, Statement, TxnDelta};
use veld_shacl::{ShaclValidator, ValidationReport};

/// Transaction lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnState {
    /// Accepting adds and removes
    Collecting,
    Committed,
    Rejected,
}

pub struct Transaction {
    graph: Arc<RwLock<MemoryGraph>>,
    validator: Arc<ShaclValidator>,
    /// Graph image pinned at begin
    base: MemoryGraph,
    base_head: u64,
    isolation: IsolationLevel,
    delta: TxnDelta,
    state: TxnState,
}

impl Transaction {
    pub(crate) fn new(
        graph: Arc<RwLock<MemoryGraph>>,
        validator: Arc<ShaclValidator>,
        base: MemoryGraph,
        isolation: IsolationLevel,
    ) -> Self {
        let base_head = base.head();
        Self {
            graph,
            validator,
            base,
            base_head,
            isolation,
            delta: TxnDelta::new(),
            state: TxnState::Collecting,
        }
    }

    pub fn state(&self) -> TxnState {
        self.state
    }

    pub fn isolation(&self) -> IsolationLevel {
        self.isolation
    }

    pub fn delta(&self) -> &TxnDelta {
        &self.delta
    }

    fn collecting(&self) -> Result<()> {
        if self.state != TxnState::Collecting {
            return Err(TransactError::InvalidState(
                "transaction already committed or rejected",
            ));
        }
        Ok(())
    }

    /// Stage a statement addition.
    pub fn add(&mut self, st: Statement) -> Result<()> {
        self.collecting()?;
        self.delta.add(st);
        Ok(())
    }

    /// Stage a statement removal.
    pub fn remove(&mut self, st: Statement) -> Result<()> {
        self.collecting()?;
        self.delta.remove(st);
        Ok(())
    }

    /// Discard the transaction without touching the graph.
    pub fn rollback(&mut self) {
        self.delta = TxnDelta::new();
        self.state = TxnState::Rejected;
    }

    /// Validate the staged delta and apply it to the graph.
    ///
    /// Returns the conforming report on success. On any failure - violation,
    /// serialization conflict, store error mid-pass - the transaction is
    /// rejected and the graph is unchanged.
    pub fn commit(&mut self) -> Result<ValidationReport> {
        self.collecting()?;
        if self.delta.is_empty() {
            self.state = TxnState::Committed;
            return Ok(ValidationReport::conforming());
        }

        let span = info_span!("commit", head = self.base_head);
        let _guard = span.enter();

        let mut graph = self.graph.write();
        if self.isolation == IsolationLevel::Serializable && graph.head() != self.base_head {
            self.state = TxnState::Rejected;
            return Err(TransactError::CommitConflict {
                expected: self.base_head,
                head: graph.head(),
            });
        }

        let report = match self.validator.validate(&self.base, &self.delta) {
            Ok(report) => report,
            Err(e) => {
                // Fail closed: a store error mid-pass rejects the commit.
                self.state = TxnState::Rejected;
                return Err(e.into());
            }
        };
        if !report.conforms() {
            self.state = TxnState::Rejected;
            debug!(violations = report.results().len(), "commit rejected");
            return Err(TransactError::Violation { report });
        }

        let delta = std::mem::take(&mut self.delta);
        graph.apply(delta.added().cloned(), delta.removed().cloned());
        self.state = TxnState::Committed;
        debug!(head = graph.head(), "commit applied");
        Ok(report)
    }
}
