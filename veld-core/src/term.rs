//! RDF term - the opaque comparable value type
//!
//! A [`Term`] is an IRI, a blank node, or a literal with an optional language
//! tag. Payloads are `Arc<str>` so clones are cheap and widely shared.
//!
//! ## Ordering
//!
//! Terms use strict total ordering: kind first (IRI < blank node < literal),
//! then lexical payload. This makes statement collections range-scannable.
//!
//! ## Sentinels
//!
//! `Term::min()` provides a lower bound for range scans. It sorts at or
//! before every valid term.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// An RDF term
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Term {
    /// An IRI reference
    Iri(Arc<str>),
    /// A blank node, identified by its label
    Blank(Arc<str>),
    /// A literal with an optional language tag
    Literal {
        lexical: Arc<str>,
        lang: Option<Arc<str>>,
    },
}

impl Term {
    /// Create an IRI term
    pub fn iri(value: impl AsRef<str>) -> Self {
        Term::Iri(Arc::from(value.as_ref()))
    }

    /// Create a blank node term
    pub fn blank(label: impl AsRef<str>) -> Self {
        Term::Blank(Arc::from(label.as_ref()))
    }

    /// Create a plain literal
    pub fn literal(lexical: impl AsRef<str>) -> Self {
        Term::Literal {
            lexical: Arc::from(lexical.as_ref()),
            lang: None,
        }
    }

    /// Create a language-tagged literal
    pub fn lang_literal(lexical: impl AsRef<str>, lang: impl AsRef<str>) -> Self {
        Term::Literal {
            lexical: Arc::from(lexical.as_ref()),
            lang: Some(Arc::from(lang.as_ref())),
        }
    }

    /// Minimum possible term (for range scan lower bounds)
    pub fn min() -> Self {
        Term::Iri(Arc::from(""))
    }

    /// True if this term may appear in subject position (IRI or blank node)
    pub fn is_resource(&self) -> bool {
        matches!(self, Term::Iri(_) | Term::Blank(_))
    }

    /// Lexical form, if this is a literal
    pub fn lexical(&self) -> Option<&str> {
        match self {
            Term::Literal { lexical, .. } => Some(lexical),
            _ => None,
        }
    }

    /// Language tag, if this is a language-tagged literal
    pub fn lang(&self) -> Option<&str> {
        match self {
            Term::Literal { lang, .. } => lang.as_deref(),
            _ => None,
        }
    }

    /// Variant rank used for ordering
    fn rank(&self) -> u8 {
        match self {
            Term::Iri(_) => 0,
            Term::Blank(_) => 1,
            Term::Literal { .. } => 2,
        }
    }
}

impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Term {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.rank().cmp(&other.rank()) {
            Ordering::Equal => {}
            ord => return ord,
        }
        match (self, other) {
            (Term::Iri(a), Term::Iri(b)) => a.cmp(b),
            (Term::Blank(a), Term::Blank(b)) => a.cmp(b),
            (
                Term::Literal {
                    lexical: la,
                    lang: ta,
                },
                Term::Literal {
                    lexical: lb,
                    lang: tb,
                },
            ) => la.cmp(lb).then_with(|| ta.cmp(tb)),
            _ => unreachable!("rank comparison already discriminated variants"),
        }
    }
}

// === Serde: Serialize as a (kind, payload, lang) tuple ===

impl Serialize for Term {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeTuple;
        let (kind, payload, lang): (u8, &str, Option<&str>) = match self {
            Term::Iri(iri) => (0, iri, None),
            Term::Blank(label) => (1, label, None),
            Term::Literal { lexical, lang } => (2, lexical, lang.as_deref()),
        };
        let mut tuple = serializer.serialize_tuple(3)?;
        tuple.serialize_element(&kind)?;
        tuple.serialize_element(payload)?;
        tuple.serialize_element(&lang)?;
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for Term {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (kind, payload, lang): (u8, String, Option<String>) =
            Deserialize::deserialize(deserializer)?;
        match kind {
            0 => Ok(Term::Iri(Arc::from(payload))),
            1 => Ok(Term::Blank(Arc::from(payload))),
            2 => Ok(Term::Literal {
                lexical: Arc::from(payload),
                lang: lang.map(Arc::from),
            }),
            other => Err(serde::de::Error::custom(format!(
                "invalid term kind {other}"
            ))),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{iri}>"),
            Term::Blank(label) => write!(f, "_:{label}"),
            Term::Literal { lexical, lang } => match lang {
                Some(tag) => write!(f, "\"{lexical}\"@{tag}"),
                None => write!(f, "\"{lexical}\""),
            },
        }
    }
}
