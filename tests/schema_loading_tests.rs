//! Schema Loading and Configuration Tests
//!
//! Ontology documents from disk and over HTTP, the schema cache, and the
//! layered CLI / environment / file configuration.

use assert_matches::assert_matches;
use axum::Router;
use axum::routing::get;
use bgp_guard::ontology::{SchemaStats, format_for, url_format};
use bgp_guard::{
    CliArgs, FATAL_EXIT_STATUS, GuardConfig, OntologySchema, OutputFormat, SchemaCache,
    SchemaLoadError, SchemaSource, run,
};
use clap::Parser;
use oxigraph::io::RdfFormat;
use serial_test::serial;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::NamedTempFile;

// =============================================================================
// Test Utilities
// =============================================================================

const NS: &str = "http://semanticweb.org/unitedOntology#";

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/ontology/football.ttl")
}

fn iri(local: &str) -> String {
    format!("{}{}", NS, local)
}

fn temp_file(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

// =============================================================================
// Schema Documents
// =============================================================================

#[test]
fn test_fixture_schema_facts() {
    let schema = OntologySchema::from_path(fixture_path()).unwrap();

    assert_eq!(
        schema.stats(),
        SchemaStats {
            subclass_edges: 4,
            properties_with_domain: 11,
            properties_with_range: 11,
            declared_properties: 22,
        }
    );
    assert!(schema.is_declared(&iri("playsFor")));
    assert!(schema.is_declared(&iri("nickname")));
    assert!(!schema.is_declared(&iri("scoredFor")));
    assert!(schema.domains(&iri("nickname")).is_none());
    assert!(
        schema
            .superclasses(&iri("Goalkeeper"))
            .unwrap()
            .contains(&iri("Player"))
    );
    assert!(
        schema
            .ranges(&iri("capacity"))
            .unwrap()
            .contains("http://www.w3.org/2001/XMLSchema#integer")
    );
}

#[test]
fn test_ntriples_document_by_extension() {
    let file = temp_file(
        ".nt",
        "<http://ex.org/#p> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> \
         <http://www.w3.org/1999/02/22-rdf-syntax-ns#Property> .\n\
         <http://ex.org/#p> <http://www.w3.org/2000/01/rdf-schema#domain> <http://ex.org/#A> .\n",
    );

    let schema = OntologySchema::from_path(file.path()).unwrap();
    assert!(schema.is_declared("http://ex.org/#p"));
    assert!(schema.domains("http://ex.org/#p").unwrap().contains("http://ex.org/#A"));
}

#[test]
fn test_malformed_document_is_a_parse_error() {
    let file = temp_file(".ttl", ":Player a owl:Class ;;; <<< not turtle");
    let err = OntologySchema::from_path(file.path()).unwrap_err();
    assert_matches!(err, SchemaLoadError::Parse(_));
}

#[test]
fn test_missing_document_is_a_read_error() {
    let err = OntologySchema::from_path("/definitely/not/here.ttl").unwrap_err();
    assert_matches!(err, SchemaLoadError::Read { ref path, .. } if path.ends_with("here.ttl"));
}

#[test]
fn test_unknown_extension_is_rejected() {
    let file = temp_file(".docx", "");
    let err = OntologySchema::from_path(file.path()).unwrap_err();
    assert_matches!(err, SchemaLoadError::UnsupportedFormat(_));
}

#[test]
fn test_format_selection() {
    assert_eq!(format_for("football.ttl").unwrap(), RdfFormat::Turtle);
    assert_eq!(format_for("football.owl").unwrap(), RdfFormat::RdfXml);
    assert_eq!(format_for("football.rdf").unwrap(), RdfFormat::RdfXml);
    assert_eq!(format_for("football.nt").unwrap(), RdfFormat::NTriples);
    assert_eq!(format_for("ontology.txt").unwrap(), RdfFormat::Turtle);
    assert_eq!(format_for("http://ex.org/ontology").unwrap(), RdfFormat::Turtle);
    assert_eq!(
        format_for("http://ex.org/ontology.ttl?version=2").unwrap(),
        RdfFormat::Turtle
    );
    assert_eq!(url_format("https://example.org"), None);
    assert_eq!(url_format("https://w3id.org/onto/v1.0"), None);
}

#[tokio::test]
async fn test_fetch_schema_over_http() {
    let turtle = std::fs::read_to_string(fixture_path()).unwrap();
    let versioned = turtle.clone();
    let app = Router::new()
        .route(
            "/football.ttl",
            get(move || {
                let turtle = turtle.clone();
                async move { turtle }
            }),
        )
        .route(
            "/onto/v1.0",
            get(move || {
                let turtle = versioned.clone();
                async move { turtle }
            }),
        )
        .route(
            "/missing.ttl",
            get(|| async { axum::http::StatusCode::NOT_FOUND }),
        );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let source = SchemaSource::parse(&format!("http://{}/football.ttl", addr));
    assert_matches!(source, SchemaSource::Url(_));
    let schema = source.load().await.unwrap();
    assert!(schema.is_declared(&iri("playsFor")));

    // No usable extension in the path: parsed as Turtle
    let schema = OntologySchema::fetch(&format!("http://{}/onto/v1.0", addr))
        .await
        .unwrap();
    assert_eq!(schema.stats().declared_properties, 22);

    let err = OntologySchema::fetch(&format!("http://{}/missing.ttl", addr))
        .await
        .unwrap_err();
    assert_matches!(err, SchemaLoadError::Fetch { .. });
}

// =============================================================================
// Schema Cache
// =============================================================================

#[tokio::test]
async fn test_cache_loads_once_per_source() {
    let cache = SchemaCache::new(2);
    let source = SchemaSource::Path(fixture_path());

    let first = cache.get_or_load(&source).await.unwrap();
    let second = cache.get_or_load(&source).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let stats = cache.stats();
    assert_eq!(stats.size, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
}

#[tokio::test]
async fn test_cache_does_not_store_failures() {
    let cache = SchemaCache::new(2);
    let source = SchemaSource::Path(PathBuf::from("/definitely/not/here.ttl"));

    assert!(cache.get_or_load(&source).await.is_err());
    assert_eq!(cache.stats().size, 0);
}

// =============================================================================
// Configuration
// =============================================================================

const CONFIG_VARS: [&str; 7] = [
    "BGP_GUARD_ONTOLOGY",
    "BGP_GUARD_QUERY_FILE",
    "BGP_GUARD_NAMESPACE",
    "BGP_GUARD_ENDPOINT",
    "BGP_GUARD_MAX_ATTEMPTS",
    "BGP_GUARD_FORMAT",
    "BGP_GUARD_RESERVED_NAMESPACES",
];

fn clear_config_env() {
    for var in CONFIG_VARS {
        unsafe {
            std::env::remove_var(var);
        }
    }
}

#[test]
#[serial]
fn test_config_from_environment() {
    clear_config_env();
    unsafe {
        std::env::set_var("BGP_GUARD_ONTOLOGY", fixture_path());
        std::env::set_var("BGP_GUARD_MAX_ATTEMPTS", "5");
        std::env::set_var("BGP_GUARD_FORMAT", "json");
        std::env::set_var(
            "BGP_GUARD_RESERVED_NAMESPACES",
            "http://ex.org/a#,http://ex.org/b#",
        );
    }

    let args = CliArgs::try_parse_from(["bgp-guard"]).unwrap();
    let config = GuardConfig::from_args(args).unwrap();
    clear_config_env();

    assert_eq!(config.ontology, SchemaSource::Path(fixture_path()));
    assert_eq!(config.max_attempts, 5);
    assert_eq!(config.format, OutputFormat::Json);
    assert_eq!(
        config.validator.reserved_namespaces,
        vec!["http://ex.org/a#", "http://ex.org/b#"]
    );
}

#[test]
#[serial]
fn test_cli_overrides_config_file() {
    clear_config_env();
    let file = temp_file(
        ".yaml",
        &format!(
            "ontology: {}\nmax_attempts: 7\nformat: json\nnamespace: \"http://ex.org/football#\"\n",
            fixture_path().display()
        ),
    );

    let args = CliArgs::try_parse_from([
        "bgp-guard",
        "--config",
        file.path().to_str().unwrap(),
        "--max-attempts",
        "2",
    ])
    .unwrap();
    let config = GuardConfig::from_args(args).unwrap();

    assert_eq!(config.max_attempts, 2);
    assert_eq!(config.format, OutputFormat::Json);
    assert_eq!(config.validator.schema_namespace, "http://ex.org/football#");
}

#[test]
#[serial]
fn test_config_rejects_bad_values() {
    clear_config_env();

    let args = CliArgs::try_parse_from(["bgp-guard"]).unwrap();
    assert!(GuardConfig::from_args(args).is_err());

    let ontology = fixture_path();
    let ontology = ontology.to_str().unwrap();
    let args = CliArgs::try_parse_from(["bgp-guard", "--ontology", ontology, "--max-attempts", "0"])
        .unwrap();
    assert!(GuardConfig::from_args(args).is_err());

    let args =
        CliArgs::try_parse_from(["bgp-guard", "--ontology", ontology, "--endpoint", "ftp://x"])
            .unwrap();
    assert!(GuardConfig::from_args(args).is_err());

    assert!(CliArgs::try_parse_from(["bgp-guard", "--format", "xml"]).is_err());
}

// =============================================================================
// Command Line
// =============================================================================

async fn run_with(ontology: &str, query: &str) -> u8 {
    let query_file = temp_file(".rq", query);
    let args = CliArgs::try_parse_from([
        "bgp-guard",
        "--ontology",
        ontology,
        "--query-file",
        query_file.path().to_str().unwrap(),
    ])
    .unwrap();
    run(args).await
}

#[tokio::test]
#[serial]
async fn test_exit_status_per_outcome() {
    clear_config_env();
    let ontology = fixture_path();
    let ontology = ontology.to_str().unwrap();

    assert_eq!(
        run_with(ontology, "SELECT * WHERE { ?p a :Player ; :playsFor ?t }").await,
        0
    );
    assert_eq!(
        run_with(ontology, "SELECT * WHERE { ?s a :Stadium ; :playsFor ?t }").await,
        1
    );
    assert_eq!(run_with(ontology, "no query here, sorry").await, 2);
}

#[tokio::test]
#[serial]
async fn test_fatal_errors_do_not_look_like_violations() {
    clear_config_env();
    assert_eq!(FATAL_EXIT_STATUS, 3);

    let status = run_with("/definitely/not/here.ttl", "SELECT * WHERE { ?a :b ?c }").await;
    assert_eq!(status, FATAL_EXIT_STATUS);

    let broken = temp_file(".ttl", ":Player a owl:Class ;;; <<< not turtle");
    let status = run_with(broken.path().to_str().unwrap(), "SELECT * WHERE { ?a :b ?c }").await;
    assert_eq!(status, FATAL_EXIT_STATUS);

    let args = CliArgs::try_parse_from(["bgp-guard"]).unwrap();
    assert_eq!(run(args).await, FATAL_EXIT_STATUS);
}
