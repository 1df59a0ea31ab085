//! Well-known RDF and SHACL vocabulary terms

use crate::term::Term;

/// RDF namespace terms
pub mod rdf {
    use super::Term;

    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

    pub fn type_() -> Term {
        Term::iri(format!("{NS}type"))
    }

    pub fn first() -> Term {
        Term::iri(format!("{NS}first"))
    }

    pub fn rest() -> Term {
        Term::iri(format!("{NS}rest"))
    }

    pub fn nil() -> Term {
        Term::iri(format!("{NS}nil"))
    }
}

/// SHACL namespace terms
pub mod sh {
    use super::Term;

    pub const NS: &str = "http://www.w3.org/ns/shacl#";

    fn term(name: &str) -> Term {
        Term::iri(format!("{NS}{name}"))
    }

    pub fn target_class() -> Term {
        term("targetClass")
    }

    pub fn target_node() -> Term {
        term("targetNode")
    }

    pub fn target_subjects_of() -> Term {
        term("targetSubjectsOf")
    }

    pub fn target_objects_of() -> Term {
        term("targetObjectsOf")
    }

    pub fn property() -> Term {
        term("property")
    }

    pub fn path() -> Term {
        term("path")
    }

    pub fn min_count() -> Term {
        term("minCount")
    }

    pub fn unique_lang() -> Term {
        term("uniqueLang")
    }

    pub fn not() -> Term {
        term("not")
    }

    pub fn or() -> Term {
        term("or")
    }

    pub fn deactivated() -> Term {
        term("deactivated")
    }
}
