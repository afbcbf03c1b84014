//! Ontology schema facts used by the validation rules.
//!
//! The schema document is parsed with oxigraph and reduced to four indexes:
//! direct `rdfs:subClassOf` edges, `rdfs:domain` and `rdfs:range` sets per
//! property, and the set of resources carrying an explicit `rdf:type`.
//! Only IRI objects are kept; blank-node class expressions (unions,
//! restrictions) are ignored.

use crate::error::SchemaLoadError;
use oxigraph::io::RdfFormat;
use oxigraph::model::vocab::{rdf, rdfs};
use oxigraph::model::{NamedOrBlankNode, Term};
use oxigraph::store::Store;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Where an ontology document comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SchemaSource {
    Path(PathBuf),
    Url(String),
}

impl SchemaSource {
    /// Interpret a CLI/config value: `http(s)://` values are URLs, anything
    /// else is a filesystem path.
    pub fn parse(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            SchemaSource::Url(value.to_string())
        } else {
            SchemaSource::Path(PathBuf::from(value))
        }
    }

    /// Stable key for caching.
    pub fn cache_key(&self) -> String {
        self.to_string()
    }

    pub async fn load(&self) -> Result<OntologySchema, SchemaLoadError> {
        match self {
            SchemaSource::Path(path) => OntologySchema::load_path(path).await,
            SchemaSource::Url(url) => OntologySchema::fetch(url).await,
        }
    }
}

impl fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaSource::Path(path) => write!(f, "{}", path.display()),
            SchemaSource::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Last path segment of a location, without any query or fragment.
fn file_name(location: &str) -> &str {
    let location = location.split(['?', '#']).next().unwrap_or_default();
    location.rsplit(['/', '\\']).next().unwrap_or(location)
}

fn extension_format(extension: &str) -> Option<RdfFormat> {
    match extension.to_ascii_lowercase().as_str() {
        "owl" => Some(RdfFormat::RdfXml),
        "txt" => Some(RdfFormat::Turtle),
        other => RdfFormat::from_extension(other),
    }
}

/// Pick an RDF serialization from a file extension, defaulting to Turtle
/// when there is none.
pub fn format_for(location: &str) -> Result<RdfFormat, SchemaLoadError> {
    match file_name(location).rsplit_once('.') {
        None => Ok(RdfFormat::Turtle),
        Some((_, extension)) => extension_format(extension)
            .ok_or_else(|| SchemaLoadError::UnsupportedFormat(location.to_string())),
    }
}

/// Serialization named by the extension of a URL's path, if it names one.
///
/// Only the path is inspected, so a bare host such as `https://example.org`
/// or a versioned path like `/onto/v1.0` yields `None`.
pub fn url_format(url: &str) -> Option<RdfFormat> {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let (_, path) = rest.split_once('/')?;
    let (_, extension) = file_name(path).rsplit_once('.')?;
    extension_format(extension)
}

/// Class hierarchy and property declarations of an ontology.
#[derive(Debug, Clone, Default)]
pub struct OntologySchema {
    subclass_edges: HashMap<String, BTreeSet<String>>,
    property_domain: HashMap<String, BTreeSet<String>>,
    property_range: HashMap<String, BTreeSet<String>>,
    declared_properties: HashSet<String>,
}

impl OntologySchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a schema document from disk; the format follows the extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaLoadError> {
        let path = path.as_ref();
        let format = format_for(&path.to_string_lossy())?;
        let content = std::fs::read(path).map_err(|source| SchemaLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_file_contents(path, format, &content)
    }

    /// Async counterpart of [`OntologySchema::from_path`].
    pub async fn load_path(path: impl AsRef<Path>) -> Result<Self, SchemaLoadError> {
        let path = path.as_ref();
        let format = format_for(&path.to_string_lossy())?;
        let content = tokio::fs::read(path)
            .await
            .map_err(|source| SchemaLoadError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_file_contents(path, format, &content)
    }

    fn from_file_contents(
        path: &Path,
        format: RdfFormat,
        content: &[u8],
    ) -> Result<Self, SchemaLoadError> {
        let schema = Self::from_reader(format, content)?;
        tracing::info!(
            path = %path.display(),
            classes = schema.subclass_edges.len(),
            domains = schema.property_domain.len(),
            ranges = schema.property_range.len(),
            declared = schema.declared_properties.len(),
            "ontology schema loaded"
        );
        Ok(schema)
    }

    /// Parse a Turtle document held in memory.
    pub fn from_turtle(turtle: &str) -> Result<Self, SchemaLoadError> {
        Self::from_reader(RdfFormat::Turtle, turtle.as_bytes())
    }

    pub fn from_reader(format: RdfFormat, reader: impl Read) -> Result<Self, SchemaLoadError> {
        let store = Store::new()?;
        store.load_from_reader(format, reader)?;
        Self::from_store(&store)
    }

    /// Download and parse a schema document. Turtle is assumed unless the
    /// URL path ends in a known RDF extension.
    pub async fn fetch(url: &str) -> Result<Self, SchemaLoadError> {
        let fetch_error = |source| SchemaLoadError::Fetch {
            url: url.to_string(),
            source,
        };

        let format = url_format(url).unwrap_or(RdfFormat::Turtle);
        let body = reqwest::get(url)
            .await
            .and_then(|response| response.error_for_status())
            .map_err(fetch_error)?
            .bytes()
            .await
            .map_err(fetch_error)?;

        let schema = Self::from_reader(format, body.as_ref())?;
        tracing::info!(
            url,
            bytes = body.len(),
            format = format.name(),
            declared = schema.declared_properties.len(),
            "ontology schema fetched"
        );
        Ok(schema)
    }

    /// Extract schema facts from every quad in the store.
    pub fn from_store(store: &Store) -> Result<Self, SchemaLoadError> {
        let mut schema = Self::default();

        for quad in store.iter() {
            let quad = quad?;
            let NamedOrBlankNode::NamedNode(subject) = &quad.subject else {
                continue;
            };
            let subject = subject.as_str();
            let predicate = quad.predicate.as_ref();

            if predicate == rdf::TYPE {
                schema.declare_property(subject);
                continue;
            }

            let Term::NamedNode(object) = &quad.object else {
                continue;
            };
            let object = object.as_str();

            if predicate == rdfs::SUB_CLASS_OF {
                schema.add_subclass(subject, object);
            } else if predicate == rdfs::DOMAIN {
                schema.add_domain(subject, object);
            } else if predicate == rdfs::RANGE {
                schema.add_range(subject, object);
            }
        }

        Ok(schema)
    }

    pub fn add_subclass(&mut self, class: &str, superclass: &str) {
        self.subclass_edges
            .entry(class.to_string())
            .or_default()
            .insert(superclass.to_string());
    }

    pub fn add_domain(&mut self, property: &str, class: &str) {
        self.property_domain
            .entry(property.to_string())
            .or_default()
            .insert(class.to_string());
    }

    pub fn add_range(&mut self, property: &str, class: &str) {
        self.property_range
            .entry(property.to_string())
            .or_default()
            .insert(class.to_string());
    }

    /// Mark a resource as explicitly typed in the schema.
    pub fn declare_property(&mut self, property: &str) {
        self.declared_properties.insert(property.to_string());
    }

    /// Direct superclasses of `class`.
    pub fn superclasses(&self, class: &str) -> Option<&BTreeSet<String>> {
        self.subclass_edges.get(class)
    }

    /// Declared domain classes of `property`, if any.
    pub fn domains(&self, property: &str) -> Option<&BTreeSet<String>> {
        self.property_domain.get(property).filter(|set| !set.is_empty())
    }

    /// Declared range classes of `property`, if any.
    pub fn ranges(&self, property: &str) -> Option<&BTreeSet<String>> {
        self.property_range.get(property).filter(|set| !set.is_empty())
    }

    pub fn is_declared(&self, property: &str) -> bool {
        self.declared_properties.contains(property)
    }

    pub fn stats(&self) -> SchemaStats {
        SchemaStats {
            subclass_edges: self.subclass_edges.values().map(BTreeSet::len).sum(),
            properties_with_domain: self.property_domain.len(),
            properties_with_range: self.property_range.len(),
            declared_properties: self.declared_properties.len(),
        }
    }
}

/// Fact counts of a loaded schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct SchemaStats {
    pub subclass_edges: usize,
    pub properties_with_domain: usize,
    pub properties_with_range: usize,
    pub declared_properties: usize,
}
