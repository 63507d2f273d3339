use super::descriptor::{Descriptor, OperationKey};
use serde::Serialize;
use std::collections::HashMap;

/// All operations known for a service, keyed by method and path.
///
/// Entries keep their insertion order. A key that is already present is never
/// overwritten: when two sources describe the same operation the first one
/// wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Specification {
    #[serde(rename = "operations")]
    entries: Vec<Descriptor>,
    #[serde(skip)]
    index: HashMap<OperationKey, usize>,
}

impl Specification {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the descriptor unless its key is taken. Returns whether it was added.
    pub fn insert(&mut self, descriptor: Descriptor) -> bool {
        let key = descriptor.key();
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.entries.len());
        self.entries.push(descriptor);
        true
    }

    pub fn merge(&mut self, other: Specification) {
        for descriptor in other.entries {
            if !self.insert(descriptor) {
                tracing::debug!("skipped duplicate operation while merging specification");
            }
        }
    }

    pub fn get(&self, key: &OperationKey) -> Option<&Descriptor> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, key: &OperationKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[Descriptor] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Descriptor> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Specification {
    type Item = &'a Descriptor;
    type IntoIter = std::slice::Iter<'a, Descriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Descriptor> for Specification {
    fn from_iter<I: IntoIterator<Item = Descriptor>>(iter: I) -> Self {
        let mut spec = Specification::new();
        for descriptor in iter {
            spec.insert(descriptor);
        }
        spec
    }
}
