//! Tuple - the streaming unit of data between plan nodes
//!
//! A [`Tuple`] is an ordered, fixed-arity row of terms (`line`) plus an
//! append-only history: the prior tuples that justify how this row was
//! derived. History exists for violation explanation and debugging, not for
//! correctness - equality, ordering and hashing compare only `line`.
//!
//! By convention column 0 holds the focus node; the grouping operators
//! (Unique, language-uniqueness) detect run boundaries on it.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use veld_core::Term;

/// A row produced by a plan node
#[derive(Clone, Debug)]
pub struct Tuple {
    line: Vec<Term>,
    history: Vec<Tuple>,
}

impl Tuple {
    /// Create a tuple from its line
    pub fn new(line: Vec<Term>) -> Self {
        Self {
            line,
            history: Vec::new(),
        }
    }

    /// The ordered row of terms
    pub fn line(&self) -> &[Term] {
        &self.line
    }

    /// Term at a column
    pub fn col(&self, index: usize) -> &Term {
        &self.line[index]
    }

    /// The focus node (column 0)
    pub fn focus(&self) -> &Term {
        &self.line[0]
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.line.len()
    }

    /// Append a derivation step to the history
    ///
    /// The only mutator; safe to call any number of times after emission.
    pub fn add_history(&mut self, step: Tuple) {
        self.history.push(step);
    }

    /// The derivation trail, oldest first
    pub fn history(&self) -> &[Tuple] {
        &self.history
    }

    /// Copy of this tuple with the first `skip` columns dropped
    ///
    /// History carries over so the explanation trail survives projection.
    pub fn trimmed(&self, skip: usize) -> Tuple {
        Tuple {
            line: self.line[skip..].to_vec(),
            history: self.history.clone(),
        }
    }
}

impl From<Vec<Term>> for Tuple {
    fn from(line: Vec<Term>) -> Self {
        Tuple::new(line)
    }
}

impl PartialEq for Tuple {
    fn eq(&self, other: &Self) -> bool {
        self.line == other.line
    }
}

impl Eq for Tuple {}

impl PartialOrd for Tuple {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tuple {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line.cmp(&other.line)
    }
}

impl Hash for Tuple {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.line.hash(state);
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, term) in self.line.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{term}")?;
        }
        write!(f, ")")
    }
}
