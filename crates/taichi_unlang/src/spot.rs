// SPDX-License-Identifier: MIT OR Apache-2.0
//! Spot (port) definitions for node inputs/outputs.

use crate::error::GraphError;
use crate::link::LinkId;
use crate::node::NodeKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Spot direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpotDirection {
    /// Receives signals
    In,
    /// Emits signals
    Out,
}

impl SpotDirection {
    /// The direction a linked spot must have
    pub fn opposite(self) -> Self {
        match self {
            Self::In => Self::Out,
            Self::Out => Self::In,
        }
    }
}

/// Type-compatibility tag of a spot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpotCategory {
    /// Links to any category
    Any,
    /// Host object handle
    Object,
    /// Floating point value
    Float,
    /// Integer value
    Int,
    /// Boolean value
    Bool,
    /// String value
    String,
    /// Running instance reference
    Instance,
    /// Custom category, matched by name
    Custom(String),
}

impl SpotCategory {
    /// Check if a spot of this category may link to one of `other`
    pub fn can_link_to(&self, other: &SpotCategory) -> bool {
        if matches!(self, Self::Any) || matches!(other, Self::Any) {
            return true;
        }

        if self == other {
            return true;
        }

        matches!((self, other), (Self::Int, Self::Float) | (Self::Float, Self::Int))
    }
}

impl fmt::Display for SpotCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("Any"),
            Self::Object => f.write_str("Object"),
            Self::Float => f.write_str("Float"),
            Self::Int => f.write_str("Int"),
            Self::Bool => f.write_str("Bool"),
            Self::String => f.write_str("String"),
            Self::Instance => f.write_str("Instance"),
            Self::Custom(name) => write!(f, "Custom({name})"),
        }
    }
}

/// Maximum number of links a spot accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Arity {
    /// No limit
    #[default]
    Unbounded,
    /// Hard cap
    AtMost(u32),
}

impl Arity {
    /// Convert the raw integer form: `-1` is unbounded, `N > 0` caps at `N`
    pub fn from_raw(raw: i32) -> Result<Self, GraphError> {
        match raw {
            -1 => Ok(Self::Unbounded),
            n if n > 0 => Ok(Self::AtMost(n as u32)),
            n => Err(GraphError::ConstraintViolation(format!(
                "arity must be -1 or positive, got {n}"
            ))),
        }
    }

    /// Raw integer form
    pub fn to_raw(self) -> i32 {
        match self {
            Self::Unbounded => -1,
            Self::AtMost(n) => i32::try_from(n).unwrap_or(i32::MAX),
        }
    }

    /// Whether a spot may hold `count` links
    pub fn admits(self, count: usize) -> bool {
        match self {
            Self::Unbounded => true,
            Self::AtMost(n) => count <= n as usize,
        }
    }
}

/// Declaration of a spot, handed to [`Node::add`](crate::node::Node::add)
/// during `init`
#[derive(Debug, Clone, PartialEq)]
pub struct SpotDecl {
    /// ID, unique within the node
    pub id: String,
    /// Display name
    pub name: String,
    /// Direction
    pub direction: SpotDirection,
    /// Compatibility tag
    pub category: SpotCategory,
    /// Link cap
    pub arity: Arity,
}

impl SpotDecl {
    /// Declare an unbounded input spot; the name defaults to the ID
    pub fn input(id: impl Into<String>, category: SpotCategory) -> Self {
        Self::new(id, SpotDirection::In, category)
    }

    /// Declare an unbounded output spot; the name defaults to the ID
    pub fn output(id: impl Into<String>, category: SpotCategory) -> Self {
        Self::new(id, SpotDirection::Out, category)
    }

    fn new(id: impl Into<String>, direction: SpotDirection, category: SpotCategory) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            direction,
            category,
            arity: Arity::Unbounded,
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the link cap
    pub fn with_arity(mut self, arity: Arity) -> Self {
        self.arity = arity;
        self
    }
}

/// Non-owning handle to a spot: owning node plus position in its spot list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpotRef {
    /// Owning node
    pub node: NodeKey,
    /// Index into the node's spots
    pub index: usize,
}

impl SpotRef {
    /// Create a new spot handle
    pub fn new(node: NodeKey, index: usize) -> Self {
        Self { node, index }
    }
}

impl fmt::Display for SpotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.node, self.index)
    }
}

/// A spot on a node
#[derive(Debug, Clone)]
pub struct Spot {
    /// ID, unique within the owner
    pub id: String,
    /// Display name
    pub name: String,
    /// Direction
    pub direction: SpotDirection,
    /// Compatibility tag
    pub category: SpotCategory,
    /// Link cap
    pub arity: Arity,
    owner: NodeKey,
    links: Vec<LinkId>,
}

impl Spot {
    pub(crate) fn from_decl(decl: SpotDecl, owner: NodeKey) -> Self {
        Self {
            id: decl.id,
            name: decl.name,
            direction: decl.direction,
            category: decl.category,
            arity: decl.arity,
            owner,
            links: Vec::new(),
        }
    }

    /// Node this spot belongs to
    pub fn owner(&self) -> NodeKey {
        self.owner
    }

    /// Number of live links
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Live links in insertion order
    pub fn links(&self) -> &[LinkId] {
        &self.links
    }

    /// Whether the spot has room for one more link
    pub fn has_capacity(&self) -> bool {
        self.arity.admits(self.links.len() + 1)
    }

    /// Check that a link from this spot to `other` would be valid
    pub fn check_link(&self, other: &Spot) -> Result<(), GraphError> {
        if self.direction == other.direction {
            return Err(GraphError::ConstraintViolation(format!(
                "spots '{}' and '{}' are both {:?}",
                self.id, other.id, self.direction
            )));
        }

        if !self.category.can_link_to(&other.category) {
            return Err(GraphError::ConstraintViolation(format!(
                "category {} of '{}' cannot link to category {} of '{}'",
                self.category, self.id, other.category, other.id
            )));
        }

        for spot in [self, other] {
            if !spot.has_capacity() {
                return Err(GraphError::ConstraintViolation(format!(
                    "spot '{}' already holds {} links (arity {})",
                    spot.id,
                    spot.link_count(),
                    spot.arity.to_raw()
                )));
            }
        }

        Ok(())
    }

    pub(crate) fn attach(&mut self, link: LinkId) {
        self.links.push(link);
    }

    pub(crate) fn detach(&mut self, link: LinkId) -> bool {
        match self.links.iter().position(|l| *l == link) {
            Some(pos) => {
                self.links.remove(pos);
                true
            }
            None => false,
        }
    }
}
