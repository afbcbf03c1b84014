//! Well-known vocabulary namespaces.
//!
//! Predicates from these vocabularies are never required to be declared in
//! the ontology, and their prefixes resolve to the standard namespace rather
//! than the configured schema namespace.

pub mod rdf {
    pub const NAMESPACE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
}

pub mod rdfs {
    pub const NAMESPACE: &str = "http://www.w3.org/2000/01/rdf-schema#";
    pub const SUB_CLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
    pub const DOMAIN: &str = "http://www.w3.org/2000/01/rdf-schema#domain";
    pub const RANGE: &str = "http://www.w3.org/2000/01/rdf-schema#range";
}

pub mod owl {
    pub const NAMESPACE: &str = "http://www.w3.org/2002/07/owl#";
}

pub mod skos {
    pub const NAMESPACE: &str = "http://www.w3.org/2004/02/skos/core#";
}

/// Prefix/namespace pairs for the reserved vocabularies.
pub const RESERVED_VOCABULARIES: &[(&str, &str)] = &[
    ("rdf", rdf::NAMESPACE),
    ("rdfs", rdfs::NAMESPACE),
    ("owl", owl::NAMESPACE),
    ("skos", skos::NAMESPACE),
];

/// Namespace bound to a reserved prefix, if any.
pub fn reserved_namespace(prefix: &str) -> Option<&'static str> {
    RESERVED_VOCABULARIES
        .iter()
        .find(|(candidate, _)| *candidate == prefix)
        .map(|(_, namespace)| *namespace)
}

/// Default list of namespaces exempt from the declared-property check.
pub fn default_reserved_namespaces() -> Vec<String> {
    RESERVED_VOCABULARIES
        .iter()
        .map(|(_, namespace)| (*namespace).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_namespace_lookup() {
        assert_eq!(reserved_namespace("rdfs"), Some(rdfs::NAMESPACE));
        assert_eq!(reserved_namespace("skos"), Some(skos::NAMESPACE));
        assert_eq!(reserved_namespace("ex"), None);
        assert_eq!(reserved_namespace(""), None);
    }

    #[test]
    fn test_rdf_namespace_is_well_formed() {
        assert!(rdf::TYPE.starts_with(rdf::NAMESPACE));
        assert!(rdf::NAMESPACE.contains("22-rdf-syntax-ns"));
    }
}
