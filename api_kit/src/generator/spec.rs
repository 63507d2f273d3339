use super::Generator;
use crate::api::Specification;
use crate::error::Result;

/// Writes the specification itself as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpecGenerator;

impl SpecGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Generator for SpecGenerator {
    fn generate(&self, specification: &Specification) -> Result<String> {
        Ok(serde_json::to_string_pretty(specification)?)
    }

    fn file_extension(&self) -> &'static str {
        "json"
    }
}
