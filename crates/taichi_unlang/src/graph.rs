// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph arena holding nodes, spots and links, plus signal propagation.

use crate::behavior::{LangNode, LoadContext, Runtime, SignalContext};
use crate::error::{GraphError, LangError};
use crate::link::{Link, LinkId};
use crate::node::{Node, NodeKey};
use crate::registry::NodeTypeKey;
use crate::signal::SignalValue;
use crate::spot::{Spot, SpotRef};
use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;

struct NodeSlot {
    node: Node,
    /// Shared so a hook keeps its behaviour alive across graph edits
    behavior: Rc<dyn LangNode>,
}

/// A UNLang node graph.
///
/// Nodes and links live in arenas addressed by [`NodeKey`] and [`LinkId`];
/// spots refer back to their owner and links refer to spots through those
/// handles only.
pub struct Graph {
    /// Graph name
    pub name: String,
    nodes: Vec<Option<NodeSlot>>,
    links: Vec<Option<Link>>,
    /// Node IDs in insertion order
    ids: IndexMap<String, NodeKey>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            links: Vec::new(),
            ids: IndexMap::new(),
        }
    }

    /// Add a node and run its `init` hook
    pub fn add_node(
        &mut self,
        id: impl Into<String>,
        tag: impl Into<String>,
        type_key: NodeTypeKey,
        mut behavior: Box<dyn LangNode>,
    ) -> Result<NodeKey, GraphError> {
        let id = id.into();
        if self.ids.contains_key(&id) {
            return Err(GraphError::DuplicateKey(format!("node '{id}'")));
        }

        let key = NodeKey(u32::try_from(self.nodes.len()).map_err(|_| {
            GraphError::InvalidOperation("node arena is full".to_string())
        })?);
        let mut node = Node::new(key, id.clone(), tag, type_key);
        behavior.init(&mut node)?;

        tracing::debug!(node = %id, spots = node.spot_count(), "added node");
        self.nodes.push(Some(NodeSlot {
            node,
            behavior: Rc::from(behavior),
        }));
        self.ids.insert(id, key);
        Ok(key)
    }

    /// Remove a node, disposing every link on its spots first
    pub fn remove_node(&mut self, key: NodeKey) -> Result<Node, GraphError> {
        let links: Vec<LinkId> = self
            .node_or_err(key)?
            .spots()
            .flat_map(|s| s.links().iter().copied())
            .collect();
        for link in links {
            // a link between two spots of the same node shows up twice
            if self.get_link(link).is_some() {
                self.dispose_link(link)?;
            }
        }

        let slot = self.nodes[key.0 as usize]
            .take()
            .ok_or_else(|| GraphError::NodeNotFound(key.to_string()))?;
        self.ids.shift_remove(&slot.node.id);
        tracing::debug!(node = %slot.node.id, "removed node");
        Ok(slot.node)
    }

    fn slot(&self, key: NodeKey) -> Option<&NodeSlot> {
        self.nodes.get(key.0 as usize).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, key: NodeKey) -> Option<&mut NodeSlot> {
        self.nodes.get_mut(key.0 as usize).and_then(Option::as_mut)
    }

    /// Get a node by key
    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        self.slot(key).map(|s| &s.node)
    }

    /// Get a node by key, failing with `NodeNotFound`
    pub fn node_or_err(&self, key: NodeKey) -> Result<&Node, GraphError> {
        self.node(key)
            .ok_or_else(|| GraphError::NodeNotFound(key.to_string()))
    }

    /// ID of a node, or its key when the node is gone
    pub(crate) fn node_id(&self, key: NodeKey) -> String {
        self.node(key)
            .map_or_else(|| key.to_string(), |n| n.id.clone())
    }

    /// Find a node by ID
    pub fn find(&self, id: &str) -> Option<NodeKey> {
        self.ids.get(id).copied()
    }

    /// Get all nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.ids.values().filter_map(|key| self.node(*key))
    }

    /// Get all node keys in insertion order
    pub fn node_keys(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.ids.values().copied()
    }

    /// Keys of every node built from `type_key`, in insertion order
    pub fn nodes_of_type<'a>(
        &'a self,
        type_key: &'a NodeTypeKey,
    ) -> impl Iterator<Item = NodeKey> + 'a {
        self.nodes()
            .filter(move |n| n.type_key == *type_key)
            .map(Node::key)
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    /// Behaviour attached to a node
    pub fn behavior(&self, key: NodeKey) -> Option<&dyn LangNode> {
        self.slot(key).map(|s| &*s.behavior)
    }

    /// Exclusive access to a behaviour; fails while one of its hooks runs
    pub(crate) fn behavior_mut(&mut self, key: NodeKey) -> Result<&mut (dyn LangNode + 'static), GraphError> {
        let slot = self
            .slot_mut(key)
            .ok_or_else(|| GraphError::NodeNotFound(key.to_string()))?;
        let id = &slot.node.id;
        Rc::get_mut(&mut slot.behavior)
            .ok_or_else(|| GraphError::InvalidOperation(format!("node '{id}' is running")))
    }

    /// Get a spot through its handle
    pub fn spot(&self, spot: SpotRef) -> Result<&Spot, GraphError> {
        self.node_or_err(spot.node)?.get_at(spot.index)
    }

    fn spot_mut(&mut self, spot: SpotRef) -> Result<&mut Spot, GraphError> {
        self.slot_mut(spot.node)
            .ok_or_else(|| GraphError::NodeNotFound(spot.node.to_string()))?
            .node
            .get_at_mut(spot.index)
    }

    /// Resolve a spot by node ID and spot ID
    pub fn resolve(&self, node_id: &str, spot_id: &str) -> Result<SpotRef, GraphError> {
        let key = self
            .find(node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))?;
        let index = self
            .node_or_err(key)?
            .spot_index(spot_id)
            .ok_or_else(|| GraphError::SpotNotFound {
                node: node_id.to_string(),
                spot: spot_id.to_string(),
            })?;
        Ok(SpotRef::new(key, index))
    }

    /// Link two spots.
    ///
    /// The spots must have opposite directions and compatible categories,
    /// both must have room under their arity, and they must not already be
    /// linked to each other.
    pub fn link(&mut self, a: SpotRef, b: SpotRef) -> Result<LinkId, GraphError> {
        let spot_a = self.spot(a)?;
        let spot_b = self.spot(b)?;
        spot_a.check_link(spot_b)?;

        if self.links_of(a)?.any(|l| l.involves_spot(b)) {
            return Err(GraphError::ConstraintViolation(format!(
                "spots '{}' and '{}' are already linked",
                spot_a.id, spot_b.id
            )));
        }

        let id = LinkId(u32::try_from(self.links.len()).map_err(|_| {
            GraphError::InvalidOperation("link arena is full".to_string())
        })?);
        self.links.push(Some(Link::new(id, a, b)));
        self.spot_mut(a)?.attach(id);
        self.spot_mut(b)?.attach(id);

        tracing::debug!(%id, from = %a, to = %b, "linked spots");
        Ok(id)
    }

    /// Dispose a link, removing it from both endpoints
    pub fn dispose_link(&mut self, id: LinkId) -> Result<Link, GraphError> {
        let link = self
            .links
            .get_mut(id.0 as usize)
            .and_then(Option::take)
            .ok_or_else(|| GraphError::InvalidOperation(format!("{id} is not live")))?;

        for end in [link.a, link.b] {
            if let Ok(spot) = self.spot_mut(end) {
                spot.detach(id);
            }
        }

        tracing::debug!(%id, "disposed link");
        Ok(link)
    }

    /// Get a live link
    pub fn get_link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Get all live links in creation order
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter().flatten()
    }

    /// Get the number of live links
    pub fn link_count(&self) -> usize {
        self.links().count()
    }

    /// Links of a spot in insertion order
    pub fn links_of(&self, spot: SpotRef) -> Result<impl Iterator<Item = &Link>, GraphError> {
        let ids = self.spot(spot)?.links();
        Ok(ids.iter().filter_map(|id| self.get_link(*id)))
    }

    pub(crate) fn run_loaded(&self) -> Result<(), GraphError> {
        for key in self.node_keys() {
            if let Some(slot) = self.slot(key) {
                slot.behavior.loaded(&LoadContext { graph: self, node: key })?;
            }
        }
        Ok(())
    }

    fn shared_behavior(&self, key: NodeKey) -> Result<Rc<dyn LangNode>, GraphError> {
        self.slot(key)
            .map(|s| Rc::clone(&s.behavior))
            .ok_or_else(|| GraphError::NodeNotFound(key.to_string()))
    }

    /// Run a node's `on_begin` hook
    pub(crate) fn begin_node(&mut self, key: NodeKey, rt: &mut Runtime<'_>) -> Result<(), LangError> {
        let behavior = self.shared_behavior(key)?;
        let mut ctx = SignalContext {
            graph: &mut *self,
            rt: rt.reborrow(),
            node: key,
            source: None,
        };
        behavior.on_begin(&mut ctx)
    }

    /// Deliver `args` from `from` to every linked spot, in link insertion
    /// order, depth first. Loops are followed as far as the nodes signal;
    /// with the cycle guard on, a link crossed twice from the same end in
    /// one wave fails with `CycleDetected`.
    pub(crate) fn propagate(
        &mut self,
        from: SpotRef,
        args: &[SignalValue],
        rt: &mut Runtime<'_>,
    ) -> Result<(), LangError> {
        let links = self.spot(from)?.links().to_vec();
        for id in links {
            // disposed by a node earlier in this wave
            let Some(link) = self.get_link(id) else {
                continue;
            };
            let to = link.linked_spot(from)?;
            self.deliver(id, from, to, args, rt)?;
        }
        Ok(())
    }

    fn deliver(
        &mut self,
        link: LinkId,
        from: SpotRef,
        to: SpotRef,
        args: &[SignalValue],
        rt: &mut Runtime<'_>,
    ) -> Result<(), LangError> {
        tracing::trace!(%link, %from, %to, args = args.len(), "signal");
        if let Some(visited) = rt.visited.as_deref_mut() {
            if !visited.insert((link, from)) {
                let node = self.node_id(to.node);
                tracing::warn!(%link, node = %node, "cycle detected");
                return Err(LangError::CycleDetected { link, node });
            }
        }

        let behavior = self.shared_behavior(to.node)?;
        let result = {
            let mut ctx = SignalContext {
                graph: &mut *self,
                rt: rt.reborrow(),
                node: to.node,
                source: Some(from),
            };
            behavior.on_signal(&mut ctx, to.index, args)
        };

        if let Err(e) = &result {
            tracing::debug!(%link, node = %self.node_id(to.node), "signal failed: {e}");
        }
        result
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("name", &self.name)
            .field("nodes", &self.node_count())
            .field("links", &self.link_count())
            .finish()
    }
}
