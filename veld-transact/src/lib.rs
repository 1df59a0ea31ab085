//! Transactional ledger with commit-time constraint validation
//!
//! A [`Ledger`] wraps a statement store together with the validation engine
//! built from its shapes graph. All writes go through a [`Transaction`]:
//! mutations are staged into a delta, validated incrementally at commit, and
//! applied atomically only when the post-transaction graph conforms.

pub mod error;
pub mod ledger;
pub mod txn;

pub use error::{Result, TransactError};
pub use ledger::Ledger;
pub use txn::{Transaction, TxnState};
