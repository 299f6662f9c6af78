//! Capability registry: four independent, ordered catalogs.
//!
//! Each [`Category`] is its own namespace, so a tool and a resource may share
//! a literal name. Registration rejects duplicates eagerly; listing preserves
//! registration order. The registry is built once and then shared read-only
//! (behind an `Arc`) by every connection.

use std::collections::HashMap;
use std::sync::Arc;

use crate::capability::Capability;
use crate::error::RegistryError;
use crate::protocol::{CapabilityDefinition, Category};

#[derive(Debug, Clone, Default)]
struct Catalog {
    entries: Vec<Arc<Capability>>,
    index: HashMap<String, usize>,
}

impl Catalog {
    fn insert(&mut self, capability: Capability) -> Result<(), RegistryError> {
        if self.index.contains_key(capability.key()) {
            return Err(RegistryError::Duplicate {
                category: capability.category(),
                key: capability.key().to_string(),
            });
        }
        self.index
            .insert(capability.key().to_string(), self.entries.len());
        self.entries.push(Arc::new(capability));
        Ok(())
    }
}

/// Registry of every capability the server exposes
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    tools: Catalog,
    resources: Catalog,
    prompts: Catalog,
    samples: Catalog,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn catalog(&self, category: Category) -> &Catalog {
        match category {
            Category::Tool => &self.tools,
            Category::Resource => &self.resources,
            Category::PromptTemplate => &self.prompts,
            Category::Sample => &self.samples,
        }
    }

    fn catalog_mut(&mut self, category: Category) -> &mut Catalog {
        match category {
            Category::Tool => &mut self.tools,
            Category::Resource => &mut self.resources,
            Category::PromptTemplate => &mut self.prompts,
            Category::Sample => &mut self.samples,
        }
    }

    /// Register a capability in its category.
    ///
    /// Fails with [`RegistryError::Duplicate`] if the name or uri is taken.
    pub fn register(&mut self, capability: Capability) -> Result<(), RegistryError> {
        tracing::debug!(
            category = %capability.category(),
            key = capability.key(),
            "Registering capability"
        );
        self.catalog_mut(capability.category()).insert(capability)
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, capability: Capability) -> Result<Self, RegistryError> {
        self.register(capability)?;
        Ok(self)
    }

    /// Public metadata of every capability in `category`, in registration order
    pub fn list(&self, category: Category) -> Vec<CapabilityDefinition> {
        self.catalog(category)
            .entries
            .iter()
            .map(|c| c.definition())
            .collect()
    }

    /// Look up a capability by name or uri
    pub fn lookup(&self, category: Category, key: &str) -> Result<&Arc<Capability>, RegistryError> {
        let catalog = self.catalog(category);
        catalog
            .index
            .get(key)
            .map(|&i| &catalog.entries[i])
            .ok_or_else(|| RegistryError::NotFound {
                category,
                key: key.to_string(),
            })
    }

    pub fn len(&self, category: Category) -> usize {
        self.catalog(category).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|&c| self.len(c) == 0)
    }
}
