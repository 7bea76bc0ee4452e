//! Discovery of installed plugins.
//!
//! The system registry is an external collaborator; implementors only supply
//! the raw component list and get the filtered queries for free.

use crate::descriptor::PluginDescriptor;
use plughost_core::PluginCategory;
use std::collections::BTreeMap;

pub trait PluginRegistry {
    /// Every component the registry knows of, in any order, duplicates allowed.
    fn components(&self) -> Vec<PluginDescriptor>;

    /// Components of `category`, sorted by name, unique by name.
    ///
    /// Of several components sharing a name the first reported wins.
    fn enumerate(&self, category: PluginCategory) -> Vec<PluginDescriptor> {
        let mut found: Vec<PluginDescriptor> = Vec::new();
        for desc in self.components() {
            if desc.category == category && !found.iter().any(|d| d.name == desc.name) {
                found.push(desc);
            }
        }
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found
    }

    /// `enumerate` for every category. Categories with no components are omitted.
    fn scan_all(&self) -> BTreeMap<PluginCategory, Vec<PluginDescriptor>> {
        let mut all = BTreeMap::new();
        for category in PluginCategory::ALL {
            let found = self.enumerate(category);
            if !found.is_empty() {
                all.insert(category, found);
            }
        }
        tracing::debug!(
            categories = all.len(),
            components = all.values().map(Vec::len).sum::<usize>(),
            "registry scanned"
        );
        all
    }

    fn find(&self, name: &str) -> Option<PluginDescriptor> {
        self.components().into_iter().find(|d| d.name == name)
    }
}

/// A fixed list of components.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    components: Vec<PluginDescriptor>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, descriptor: PluginDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    pub fn register(&mut self, descriptor: PluginDescriptor) {
        self.components.push(descriptor);
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl PluginRegistry for StaticRegistry {
    fn components(&self) -> Vec<PluginDescriptor> {
        self.components.clone()
    }
}

impl FromIterator<PluginDescriptor> for StaticRegistry {
    fn from_iter<T: IntoIterator<Item = PluginDescriptor>>(iter: T) -> Self {
        Self {
            components: iter.into_iter().collect(),
        }
    }
}
