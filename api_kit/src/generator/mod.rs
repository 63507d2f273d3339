//! Documents generated from a [`Specification`](crate::api::Specification).

pub mod openapi;
pub mod spec;

pub use openapi::{to_openapi_path, OpenApiGenerator, SchemaMetadata};
pub use spec::SpecGenerator;

use crate::api::Specification;
use crate::config::ApiKitConfig;
use crate::error::Result;
use std::collections::BTreeMap;
use std::fmt;

pub trait Generator {
    fn generate(&self, specification: &Specification) -> Result<String>;

    fn file_extension(&self) -> &'static str;
}

/// Free-form generator options, usually given as a query string
/// (`title=Shop&base_url=http://localhost`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorConfig {
    values: BTreeMap<String, String>,
}

impl GeneratorConfig {
    pub const NAMESPACE: &'static str = "namespace";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_query_string(query: &str) -> Self {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).unwrap_or_default();
        Self {
            values: pairs.into_iter().collect(),
        }
    }

    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

type CreateGenerator = Box<dyn Fn(&ApiKitConfig, &GeneratorConfig) -> Box<dyn Generator> + Send + Sync>;

/// Generators selectable by type name.
pub struct GeneratorFactory {
    generators: Vec<(String, CreateGenerator)>,
}

impl Default for GeneratorFactory {
    fn default() -> Self {
        Self::new()
            .register("openapi", |config, options| {
                Box::new(OpenApiGenerator::from_config(config, options))
            })
            .register("spec", |_, _| Box::new(SpecGenerator::new()))
    }
}

impl GeneratorFactory {
    pub fn new() -> Self {
        Self {
            generators: Vec::new(),
        }
    }

    pub fn register<F>(mut self, name: impl Into<String>, create: F) -> Self
    where
        F: Fn(&ApiKitConfig, &GeneratorConfig) -> Box<dyn Generator> + Send + Sync + 'static,
    {
        let name = name.into();
        self.generators.retain(|(existing, _)| *existing != name);
        self.generators.push((name, Box::new(create)));
        self
    }

    pub fn possible_types(&self) -> Vec<&str> {
        self.generators.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn get_generator(
        &self,
        name: &str,
        config: &ApiKitConfig,
        options: &GeneratorConfig,
    ) -> Option<Box<dyn Generator>> {
        self.generators
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, create)| create(config, options))
    }
}

impl fmt::Debug for GeneratorFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorFactory")
            .field("generators", &self.possible_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Count;

    impl Generator for Count {
        fn generate(&self, specification: &Specification) -> Result<String> {
            Ok(specification.len().to_string())
        }

        fn file_extension(&self) -> &'static str {
            "txt"
        }
    }

    #[test]
    fn test_factory_registration() {
        let factory = GeneratorFactory::default().register("count", |_, _| Box::new(Count));
        assert_eq!(factory.possible_types(), vec!["openapi", "spec", "count"]);

        let config = ApiKitConfig::default();
        let generator = factory
            .get_generator("count", &config, &GeneratorConfig::new())
            .unwrap();
        assert_eq!(generator.generate(&Specification::new()).unwrap(), "0");
        assert!(factory
            .get_generator("typescript", &config, &GeneratorConfig::new())
            .is_none());
    }

    #[test]
    fn test_config_from_query_string() {
        let config = GeneratorConfig::from_query_string("namespace=Acme%5CSdk&title=Shop");
        assert_eq!(config.get(GeneratorConfig::NAMESPACE), Some("Acme\\Sdk"));
        assert_eq!(config.get("title"), Some("Shop"));
        assert_eq!(config.get("missing"), None);
    }
}
