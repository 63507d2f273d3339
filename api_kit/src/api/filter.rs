use super::descriptor::Descriptor;
use std::fmt;

/// Restricts which operations end up in a generated specification.
pub trait Filter: Send + Sync {
    fn matches(&self, descriptor: &Descriptor) -> bool;
}

impl<F> Filter for F
where
    F: Fn(&Descriptor) -> bool + Send + Sync,
{
    fn matches(&self, descriptor: &Descriptor) -> bool {
        self(descriptor)
    }
}

/// Keeps operations whose normalized path starts with the prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixFilter {
    prefix: String,
}

impl PathPrefixFilter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Filter for PathPrefixFilter {
    fn matches(&self, descriptor: &Descriptor) -> bool {
        descriptor.path().starts_with(&self.prefix)
    }
}

/// Keeps operations carrying the tag.
#[derive(Debug, Clone)]
pub struct TagFilter {
    tag: String,
}

impl TagFilter {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

impl Filter for TagFilter {
    fn matches(&self, descriptor: &Descriptor) -> bool {
        descriptor.tags().any(|tag| tag == self.tag)
    }
}

/// Named filters selectable from the command line.
#[derive(Default)]
pub struct FilterFactory {
    filters: Vec<(String, Box<dyn Filter>)>,
    default: Option<String>,
}

impl FilterFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a filter, replacing one registered under the same name.
    pub fn register(mut self, name: impl Into<String>, filter: impl Filter + 'static) -> Self {
        let name = name.into();
        self.filters.retain(|(existing, _)| *existing != name);
        self.filters.push((name, Box::new(filter)));
        self
    }

    pub fn with_default(mut self, name: impl Into<String>) -> Self {
        self.default = Some(name.into());
        self
    }

    pub fn default_name(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Filter> {
        self.filters
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, filter)| filter.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.filters.iter().map(|(name, _)| name.as_str())
    }
}

impl fmt::Debug for FilterFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterFactory")
            .field("filters", &self.names().collect::<Vec<_>>())
            .field("default", &self.default)
            .finish()
    }
}
