// SPDX-License-Identifier: MIT OR Apache-2.0
//! Registry mapping declared node types to constructors.

use crate::behavior::LangNode;
use crate::error::GraphError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared node type: name plus hierarchical category path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeTypeKey {
    /// Type name, e.g. `"Entry"`
    pub name: String,
    /// Category path, e.g. `"UNLang/"`
    pub category: String,
}

impl NodeTypeKey {
    /// Create a new type key
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
        }
    }
}

impl fmt::Display for NodeTypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.category, self.name)
    }
}

/// Constructor for a node behaviour
pub type NodeFactory = Box<dyn Fn() -> Box<dyn LangNode>>;

/// Registered node type
pub struct NodeTypeInfo {
    /// Type key
    pub key: NodeTypeKey,
    /// Description
    pub description: String,
    factory: NodeFactory,
}

impl NodeTypeInfo {
    /// Build a fresh behaviour
    pub fn create(&self) -> Box<dyn LangNode> {
        (self.factory)()
    }
}

impl fmt::Debug for NodeTypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeTypeInfo")
            .field("key", &self.key)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Registry of available node types
#[derive(Debug, Default)]
pub struct NodeRegistry {
    types: IndexMap<NodeTypeKey, NodeTypeInfo>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node type, replacing any previous constructor for the key
    pub fn register<F>(&mut self, key: NodeTypeKey, description: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn LangNode> + 'static,
    {
        tracing::trace!(node_type = %key, "registered node type");
        self.types.insert(
            key.clone(),
            NodeTypeInfo {
                key,
                description: description.into(),
                factory: Box::new(factory),
            },
        );
    }

    /// Get a node type by key
    pub fn get(&self, key: &NodeTypeKey) -> Option<&NodeTypeInfo> {
        self.types.get(key)
    }

    /// Check whether a key is registered
    pub fn contains(&self, key: &NodeTypeKey) -> bool {
        self.types.contains_key(key)
    }

    /// Get all registered types in registration order
    pub fn types(&self) -> impl Iterator<Item = &NodeTypeInfo> {
        self.types.values()
    }

    /// Get types whose category path starts with `prefix`
    pub fn types_in_category<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a NodeTypeInfo> + 'a {
        self.types
            .values()
            .filter(move |t| t.key.category.starts_with(prefix))
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Build a behaviour for `key`
    pub fn create(&self, key: &NodeTypeKey) -> Result<Box<dyn LangNode>, GraphError> {
        self.get(key)
            .map(NodeTypeInfo::create)
            .ok_or_else(|| GraphError::UnknownNodeType(key.clone()))
    }
}
