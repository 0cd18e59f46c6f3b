// SPDX-License-Identifier: MIT OR Apache-2.0
//! Propagation sources: the Entry node and the per-tick Update node.

use crate::behavior::{LangNode, SignalContext};
use crate::error::{GraphError, LangError};
use crate::instance::InstanceId;
use crate::node::Node;
use crate::registry::{NodeRegistry, NodeTypeKey};
use crate::signal::SignalValue;
use crate::spot::{SpotCategory, SpotDecl};
use std::cell::Cell;

use super::UNLANG_CATEGORY;

pub(crate) fn register(registry: &mut NodeRegistry) {
    registry.register(
        Entry::type_key(),
        "Start of execution, signalled once when the instance begins",
        || Box::new(Entry::default()),
    );
    registry.register(
        Update::type_key(),
        "Signalled on every host tick with the tick delta",
        || Box::new(Update::default()),
    );
}

/// Start of execution.
///
/// Has a single unbounded `out` spot of category Any. When the instance
/// begins it remembers the instance and signals `[Instance]`.
#[derive(Debug, Default)]
pub struct Entry {
    out: usize,
    instance: Cell<Option<InstanceId>>,
}

impl Entry {
    /// Registry key
    pub fn type_key() -> NodeTypeKey {
        NodeTypeKey::new("Entry", UNLANG_CATEGORY)
    }

    /// Instance this entry was begun by
    pub fn instance(&self) -> Option<InstanceId> {
        self.instance.get()
    }
}

impl LangNode for Entry {
    fn init(&mut self, node: &mut Node) -> Result<(), GraphError> {
        self.out = node.add(SpotDecl::output("out", SpotCategory::Any).with_name("Out"))?;
        Ok(())
    }

    fn on_begin(&self, ctx: &mut SignalContext<'_>) -> Result<(), LangError> {
        let id = ctx.instance_id();
        self.instance.set(Some(id));
        ctx.signal(self.out, &[SignalValue::Instance(id)])
    }

    fn on_signal(
        &self,
        _ctx: &mut SignalContext<'_>,
        _spot: usize,
        _args: &[SignalValue],
    ) -> Result<(), LangError> {
        Ok(())
    }
}

/// Per-tick source; signals `[Instance, Float(delta)]` on every tick
#[derive(Debug, Default)]
pub struct Update {
    out: usize,
}

impl Update {
    /// Registry key
    pub fn type_key() -> NodeTypeKey {
        NodeTypeKey::new("Update", UNLANG_CATEGORY)
    }
}

impl LangNode for Update {
    fn init(&mut self, node: &mut Node) -> Result<(), GraphError> {
        self.out = node.add(SpotDecl::output("out", SpotCategory::Any).with_name("Out"))?;
        Ok(())
    }

    fn on_begin(&self, ctx: &mut SignalContext<'_>) -> Result<(), LangError> {
        let args = [
            SignalValue::Instance(ctx.instance_id()),
            SignalValue::Float(ctx.state().delta_time),
        ];
        ctx.signal(self.out, &args)
    }

    fn on_signal(
        &self,
        _ctx: &mut SignalContext<'_>,
        _spot: usize,
        _args: &[SignalValue],
    ) -> Result<(), LangError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::instance::LangInstance;
    use crate::spot::{Arity, SpotDirection};

    #[test]
    fn test_entry_spot_shape() {
        let mut graph = Graph::new("entry");
        let key = graph
            .add_node("entry", "Entry", Entry::type_key(), Box::new(Entry::default()))
            .unwrap();
        let node = graph.node(key).unwrap();

        assert_eq!(node.spot_count(), 1);
        let out = node.get_at(0).unwrap();
        assert_eq!(out.direction, SpotDirection::Out);
        assert_eq!(out.category, SpotCategory::Any);
        assert_eq!(out.arity, Arity::Unbounded);
    }

    #[test]
    fn test_entry_redeclare_is_duplicate() {
        let mut graph = Graph::new("entry");
        let key = graph
            .add_node("entry", "Entry", Entry::type_key(), Box::new(Entry::default()))
            .unwrap();
        let mut node = graph.node(key).unwrap().clone();

        let mut entry = Entry::default();
        assert_eq!(entry.instance(), None);
        assert!(matches!(entry.init(&mut node), Err(GraphError::DuplicateKey(_))));
    }

    #[test]
    fn test_update_without_links_is_silent() {
        let mut graph = Graph::new("update");
        graph
            .add_node("entry", "Entry", Entry::type_key(), Box::new(Entry::default()))
            .unwrap();
        graph
            .add_node("update", "Update", Update::type_key(), Box::new(Update::default()))
            .unwrap();
        let mut instance = LangInstance::with_tracing(graph).unwrap();
        instance.begin().unwrap();
        instance.tick(1.0 / 60.0).unwrap();
        assert_eq!(instance.state().frame, 1);
    }
}
