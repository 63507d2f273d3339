//! Command line entry point a service binary hands its routes to.
//!
//! ```ignore
//! fn main() -> anyhow::Result<()> {
//!     let (_, routes) = product_service::api_router().into_parts();
//!     let forge = ApiForge::new(Arc::new(routes), env!("CARGO_MANIFEST_DIR"))?;
//!     api_kit::command::run(&forge)
//! }
//! ```

use crate::api::{Filter, FilterFactory, RouterScanner};
use crate::config::ApiKitConfig;
use crate::generator::{GeneratorConfig, GeneratorFactory};
use crate::routing::RouteCollection;
use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generates API documents from the routes of this service.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generates a document describing the API.
    Generate {
        /// The generator type, e.g. `openapi` or `spec`.
        #[arg(value_name = "TYPE", default_value = "openapi")]
        kind: String,

        /// The output folder, absolute or relative to the project.
        #[arg(short, long)]
        output: Option<String>,

        /// Name of the filter restricting the described operations.
        #[arg(short, long)]
        filter: Option<String>,

        /// Generator options as a query string, e.g. `title=Shop&version=2`.
        #[arg(short, long)]
        config: Option<String>,

        /// Namespace passed to the generator, ignored when `--config` is given.
        #[arg(short, long)]
        namespace: Option<String>,
    },

    /// Lists the routes and the controller actions they resolve to.
    Routes,
}

/// Everything the commands need: the routes of the service and the
/// generators and filters to choose from.
pub struct ApiForge {
    scanner: RouterScanner,
    generators: GeneratorFactory,
    filters: FilterFactory,
    config: ApiKitConfig,
    project_dir: PathBuf,
}

impl ApiForge {
    /// Reads `[package.metadata.api_kit]` from the project's `Cargo.toml`.
    pub fn new(routes: Arc<RouteCollection>, project_dir: impl Into<PathBuf>) -> Result<Self> {
        let project_dir = project_dir.into();
        let config = ApiKitConfig::from_project(&project_dir)
            .with_context(|| format!("Failed to read the configuration of {}", project_dir.display()))?;
        Ok(Self::with_config(routes, project_dir, config))
    }

    pub fn with_config(
        routes: Arc<RouteCollection>,
        project_dir: impl Into<PathBuf>,
        config: ApiKitConfig,
    ) -> Self {
        Self {
            scanner: RouterScanner::new(routes),
            generators: GeneratorFactory::default(),
            filters: FilterFactory::new(),
            config,
            project_dir: project_dir.into(),
        }
    }

    pub fn generators(mut self, generators: GeneratorFactory) -> Self {
        self.generators = generators;
        self
    }

    pub fn filters(mut self, filters: FilterFactory) -> Self {
        self.filters = filters;
        self
    }

    pub fn config(&self) -> &ApiKitConfig {
        &self.config
    }

    pub fn run(&self, cli: Cli) -> Result<()> {
        match cli.command {
            Commands::Generate {
                kind,
                output,
                filter,
                config,
                namespace,
            } => {
                self.generate(
                    &kind,
                    output.as_deref(),
                    filter.as_deref(),
                    config.as_deref(),
                    namespace.as_deref(),
                )?;
            }
            Commands::Routes => {
                for line in self.route_table() {
                    println!("{}", line);
                }
            }
        }
        Ok(())
    }

    /// Writes `output-{type}[-{filter}].{ext}` into the output folder and
    /// returns its path.
    pub fn generate(
        &self,
        kind: &str,
        output: Option<&str>,
        filter: Option<&str>,
        config: Option<&str>,
        namespace: Option<&str>,
    ) -> Result<PathBuf> {
        let dir = self.output_dir(output.unwrap_or(&self.config.output_dir))?;

        let possible_types = self.generators.possible_types();
        if !possible_types.contains(&kind) {
            bail!(
                "Provided an invalid type, possible values are: {}",
                possible_types.join(", ")
            );
        }

        let options = match config.filter(|c| !c.is_empty()) {
            Some(query) => GeneratorConfig::from_query_string(query),
            None => {
                let mut options = GeneratorConfig::new();
                if let Some(namespace) = namespace.filter(|n| !n.is_empty()) {
                    options.put(GeneratorConfig::NAMESPACE, namespace);
                }
                options
            }
        };

        let filter_name = filter
            .filter(|f| !f.is_empty())
            .or_else(|| self.filters.default_name())
            .or(self.config.default_filter.as_deref());
        let filter: Option<&dyn Filter> = match filter_name {
            Some(name) => Some(
                self.filters
                    .get(name)
                    .ok_or_else(|| anyhow!("Provided an invalid filter name"))?,
            ),
            None => None,
        };

        let generator = self
            .generators
            .get_generator(kind, &self.config, &options)
            .ok_or_else(|| anyhow!("Provided an invalid type"))?;

        println!("Generating ...");

        let specification = self
            .scanner
            .generate(filter)
            .context("Failed to scan the registered routes")?;
        let content = generator
            .generate(&specification)
            .with_context(|| format!("Failed to generate {}", kind))?;

        let file = match filter_name {
            Some(name) => format!("output-{}-{}.{}", kind, name, generator.file_extension()),
            None => format!("output-{}.{}", kind, generator.file_extension()),
        };
        let path = dir.join(file);
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;

        println!("Successful!");
        Ok(path)
    }

    /// One line per route: verbs, path and the action it resolved to.
    pub fn route_table(&self) -> Vec<String> {
        self.scanner
            .routes()
            .iter()
            .map(|route| {
                let methods: Vec<&str> = route.methods().iter().map(|m| m.as_str()).collect();
                let target = route
                    .target()
                    .map(|t| format!("{}@{}", t.controller, t.action))
                    .unwrap_or_else(|| "-".to_string());
                format!("{:<12} {:<32} {}", methods.join("|"), route.path(), target)
            })
            .collect()
    }

    fn output_dir(&self, dir: &str) -> Result<PathBuf> {
        let direct = Path::new(dir);
        if direct.is_dir() {
            return Ok(direct.to_path_buf());
        }

        let relative = self.project_dir.join(dir);
        if relative.is_dir() {
            return Ok(relative);
        }

        bail!(
            "The folder {} does not exist, please create it in order to generate the SDK",
            dir
        )
    }
}

pub fn run_with_args<I, T>(forge: &ApiForge, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args)?;
    forge.run(cli)
}

pub fn run(forge: &ApiForge) -> Result<()> {
    forge.run(Cli::parse())
}
