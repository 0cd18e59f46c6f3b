// SPDX-License-Identifier: MIT OR Apache-2.0
//! Time nodes.

use crate::behavior::{LangNode, SignalContext};
use crate::error::{GraphError, LangError};
use crate::node::Node;
use crate::registry::{NodeRegistry, NodeTypeKey};
use crate::signal::SignalValue;
use crate::spot::{SpotCategory, SpotDecl};

pub(crate) fn register(registry: &mut NodeRegistry) {
    registry.register(
        DeltaTime::type_key(),
        "Appends the current tick delta to the signal",
        || Box::new(DeltaTime::default()),
    );
}

/// Forwards its input with the current delta time appended
#[derive(Debug, Default)]
pub struct DeltaTime {
    out: usize,
}

impl DeltaTime {
    /// Registry key
    pub fn type_key() -> NodeTypeKey {
        NodeTypeKey::new("DeltaTime", "UNLang/Time/")
    }
}

impl LangNode for DeltaTime {
    fn init(&mut self, node: &mut Node) -> Result<(), GraphError> {
        node.add(SpotDecl::input("in", SpotCategory::Any).with_name("In"))?;
        self.out = node.add(SpotDecl::output("out", SpotCategory::Any).with_name("Out"))?;
        Ok(())
    }

    fn on_signal(
        &self,
        ctx: &mut SignalContext<'_>,
        _spot: usize,
        args: &[SignalValue],
    ) -> Result<(), LangError> {
        let mut next = args.to_vec();
        next.push(SignalValue::Float(ctx.state().delta_time));
        ctx.signal(self.out, &next)
    }
}
