//! Project level settings, read from `[package.metadata.api_kit]`.
//!
//! ```toml
//! [package.metadata.api_kit]
//! title = "Product Service"
//! base-url = "http://localhost:3000"
//! output-dir = "generated"
//! supported-writers = ["json", "jsonp"]
//! ```

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

pub const BASE_URL_ENV: &str = "API_KIT_BASE_URL";
pub const OUTPUT_DIR_ENV: &str = "API_KIT_OUTPUT_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ApiKitConfig {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
    pub base_url: Option<String>,
    pub output_dir: String,
    pub default_filter: Option<String>,
    /// Writers considered during `Accept` negotiation, in priority order.
    pub supported_writers: Vec<String>,
}

impl Default for ApiKitConfig {
    fn default() -> Self {
        Self {
            title: "API".to_string(),
            version: "0.1.0".to_string(),
            description: None,
            base_url: None,
            output_dir: "output".to_string(),
            default_filter: None,
            supported_writers: vec!["json".to_string(), "jsonp".to_string()],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct Manifest {
    package: Option<Package>,
}

#[derive(Debug, Default, Deserialize)]
struct Package {
    name: Option<String>,
    version: Option<toml::Value>,
    description: Option<String>,
    metadata: Option<toml::Table>,
}

impl ApiKitConfig {
    /// Reads `Cargo.toml` in the project directory, then applies the
    /// environment overrides. A missing manifest yields the defaults.
    pub fn from_project(project_dir: &Path) -> Result<Self> {
        let manifest_path = project_dir.join("Cargo.toml");
        let config = if manifest_path.is_file() {
            let content = std::fs::read_to_string(&manifest_path)?;
            Self::from_manifest_str(&content)?
        } else {
            tracing::debug!(path = %manifest_path.display(), "no manifest found, using defaults");
            Self::default()
        };
        Ok(config.apply_env())
    }

    /// Title, version and description fall back to the package's own.
    pub fn from_manifest_str(content: &str) -> Result<Self> {
        let manifest: Manifest = toml::from_str(content)?;
        let package = manifest.package.unwrap_or_default();

        let table = package
            .metadata
            .as_ref()
            .and_then(|metadata| metadata.get("api_kit"))
            .cloned();
        let explicit = table
            .as_ref()
            .and_then(|t| t.as_table())
            .map(|t| (t.contains_key("title"), t.contains_key("version"), t.contains_key("description")))
            .unwrap_or_default();

        let mut config = match table {
            Some(value) => value
                .try_into::<ApiKitConfig>()
                .map_err(|e| Error::Config(format!("invalid [package.metadata.api_kit]: {}", e)))?,
            None => Self::default(),
        };

        if !explicit.0 {
            if let Some(name) = package.name {
                config.title = name;
            }
        }
        if !explicit.1 {
            // `version.workspace = true` has no literal value here.
            if let Some(version) = package.version.as_ref().and_then(|v| v.as_str()) {
                config.version = version.to_string();
            }
        }
        if !explicit.2 && package.description.is_some() {
            config.description = package.description;
        }

        Ok(config)
    }

    pub fn apply_env(self) -> Self {
        self.apply_overrides(
            std::env::var(BASE_URL_ENV).ok(),
            std::env::var(OUTPUT_DIR_ENV).ok(),
        )
    }

    fn apply_overrides(mut self, base_url: Option<String>, output_dir: Option<String>) -> Self {
        if let Some(base_url) = base_url.filter(|v| !v.is_empty()) {
            self.base_url = Some(base_url);
        }
        if let Some(output_dir) = output_dir.filter(|v| !v.is_empty()) {
            self.output_dir = output_dir;
        }
        self
    }
}
