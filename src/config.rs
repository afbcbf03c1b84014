use crate::agent::{DEFAULT_MAX_ATTEMPTS, QueryGenerator, RetryDriver};
use crate::ontology::{OntologySchema, SchemaSource};
use crate::sparql::DEFAULT_SCHEMA_NAMESPACE;
use crate::validator::{QueryValidator, ValidatorConfig};
use crate::vocab;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GuardConfig {
    pub ontology: SchemaSource,
    pub query_file: Option<PathBuf>,
    pub validator: ValidatorConfig,
    pub format: OutputFormat,
    pub max_attempts: u32,
    pub endpoint: Option<String>,
}

impl GuardConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            ontology: cli_ontology,
            query_file: cli_query_file,
            namespace: cli_namespace,
            reserved_namespaces: cli_reserved_namespaces,
            format: cli_format,
            max_attempts: cli_max_attempts,
            endpoint: cli_endpoint,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            ontology: file_ontology,
            query_file: file_query_file,
            namespace: file_namespace,
            reserved_namespaces: file_reserved_namespaces,
            format: file_format,
            max_attempts: file_max_attempts,
            endpoint: file_endpoint,
        } = file_config;

        let ontology = cli_ontology
            .or(file_ontology)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .context("an ontology document is required (--ontology or BGP_GUARD_ONTOLOGY)")?;

        let schema_namespace = cli_namespace
            .or(file_namespace)
            .map(|ns| ns.trim().to_string())
            .unwrap_or_else(|| DEFAULT_SCHEMA_NAMESPACE.to_string());

        let mut reserved_namespaces = cli_reserved_namespaces
            .or(file_reserved_namespaces)
            .unwrap_or_else(vocab::default_reserved_namespaces)
            .into_iter()
            .map(|ns| ns.trim().to_string())
            .filter(|ns| !ns.is_empty())
            .collect::<Vec<_>>();
        reserved_namespaces.sort();
        reserved_namespaces.dedup();

        let config = Self {
            ontology: SchemaSource::parse(&ontology),
            query_file: cli_query_file.or(file_query_file),
            validator: ValidatorConfig {
                schema_namespace,
                reserved_namespaces,
            },
            format: cli_format.or(file_format).unwrap_or_default(),
            max_attempts: cli_max_attempts
                .or(file_max_attempts)
                .unwrap_or(DEFAULT_MAX_ATTEMPTS),
            endpoint: cli_endpoint
                .or(file_endpoint)
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.validator.schema_namespace.is_empty(),
            "schema namespace must not be empty"
        );
        anyhow::ensure!(self.max_attempts >= 1, "max attempts must be at least 1");

        if let SchemaSource::Path(path) = &self.ontology {
            anyhow::ensure!(path.exists(), "ontology file {:?} does not exist", path);
            anyhow::ensure!(path.is_file(), "ontology path {:?} is not a file", path);
        }
        if let Some(query_file) = self.query_file.as_ref() {
            anyhow::ensure!(
                query_file.is_file(),
                "query file {:?} does not exist",
                query_file
            );
        }
        if let Some(endpoint) = self.endpoint.as_ref() {
            anyhow::ensure!(
                endpoint.starts_with("http://") || endpoint.starts_with("https://"),
                "endpoint {:?} is not an http(s) URL",
                endpoint
            );
        }
        Ok(())
    }

    pub fn query_validator(&self, schema: Arc<OntologySchema>) -> QueryValidator {
        QueryValidator::new(schema, self.validator.clone())
    }

    /// Retry loop bounded by the configured number of attempts.
    pub fn retry_driver(
        &self,
        generator: Arc<dyn QueryGenerator>,
        validator: Arc<QueryValidator>,
    ) -> RetryDriver {
        RetryDriver::new(generator, validator).with_max_attempts(self.max_attempts)
    }
}

#[derive(Parser, Debug, Default, Clone)]
#[command(
    name = "bgp-guard",
    about = "Check SPARQL graph patterns against an ontology",
    version
)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)",
        global = true
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "BGP_GUARD_ONTOLOGY",
        value_name = "PATH|URL",
        help = "Ontology document to validate against"
    )]
    pub ontology: Option<String>,

    #[arg(
        long,
        env = "BGP_GUARD_QUERY_FILE",
        value_name = "FILE",
        help = "Read the query from a file instead of stdin"
    )]
    pub query_file: Option<PathBuf>,

    #[arg(
        long,
        env = "BGP_GUARD_NAMESPACE",
        value_name = "IRI",
        help = "Namespace that unprefixed and ':'-prefixed names resolve into"
    )]
    pub namespace: Option<String>,

    #[arg(
        long = "reserved-namespace",
        env = "BGP_GUARD_RESERVED_NAMESPACES",
        value_name = "IRI",
        value_delimiter = ',',
        help = "Namespaces whose predicates need no declaration"
    )]
    pub reserved_namespaces: Option<Vec<String>>,

    #[arg(
        long,
        env = "BGP_GUARD_FORMAT",
        value_enum,
        value_name = "FORMAT",
        help = "Output format (text or json)"
    )]
    pub format: Option<OutputFormat>,

    #[arg(
        long,
        env = "BGP_GUARD_MAX_ATTEMPTS",
        value_name = "N",
        help = "Generation attempts per question",
        value_parser = clap::value_parser!(u32)
    )]
    pub max_attempts: Option<u32>,

    #[arg(
        long,
        env = "BGP_GUARD_ENDPOINT",
        value_name = "URL",
        help = "SPARQL endpoint to run clean queries against"
    )]
    pub endpoint: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    ontology: Option<String>,
    query_file: Option<PathBuf>,
    namespace: Option<String>,
    reserved_namespaces: Option<Vec<String>>,
    format: Option<OutputFormat>,
    max_attempts: Option<u32>,
    endpoint: Option<String>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}
