//! Ledger - a shared graph plus its validator
//!
//! A [`Ledger`] pairs the mutable statement store with the immutable
//! validation engine built from the shapes graph at open time. Shape parsing
//! is fatal: a ledger with malformed shapes never opens. Transactions are
//! the only write path; see [`Transaction`](crate::Transaction).

use crate::error::Result;
use crate::txn::Transaction;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;
use veld_core::{GraphView, IsolationLevel, MemoryGraph, Statement};
use veld_shacl::{ShaclValidator, ShapeCatalog, ValidatorConfig};

#[derive(Debug, Clone)]
pub struct Ledger {
    graph: Arc<RwLock<MemoryGraph>>,
    validator: Arc<ShaclValidator>,
}

impl Ledger {
    /// Open a ledger over `data`, validating future commits against the
    /// shapes declared in `shapes_graph`.
    pub fn open(
        data: MemoryGraph,
        shapes_graph: &dyn GraphView,
        config: ValidatorConfig,
    ) -> Result<Self> {
        let catalog = ShapeCatalog::parse(shapes_graph)?;
        info!(shapes = catalog.len(), statements = data.len(), "ledger opened");
        Ok(Self {
            graph: Arc::new(RwLock::new(data)),
            validator: Arc::new(ShaclValidator::new(catalog, config)),
        })
    }

    /// Begin a transaction at the current head.
    pub fn begin(&self, isolation: IsolationLevel) -> Transaction {
        let snapshot = self.graph.read().clone();
        Transaction::new(
            self.graph.clone(),
            self.validator.clone(),
            snapshot,
            isolation,
        )
    }

    /// Version counter of the committed graph
    pub fn head(&self) -> u64 {
        self.graph.read().head()
    }

    /// Committed statement count
    pub fn len(&self) -> usize {
        self.graph.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if the committed graph contains `st`
    pub fn contains(&self, st: &Statement) -> bool {
        self.graph.read().contains(st)
    }

    /// Snapshot of the committed graph
    pub fn snapshot(&self) -> MemoryGraph {
        self.graph.read().clone()
    }
}
