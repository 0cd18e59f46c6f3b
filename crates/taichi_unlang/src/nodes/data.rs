// SPDX-License-Identifier: MIT OR Apache-2.0
//! Instance variable nodes.

use crate::behavior::{LangNode, SignalContext};
use crate::error::{GraphError, LangError, PersistError};
use crate::node::Node;
use crate::registry::{NodeRegistry, NodeTypeKey};
use crate::signal::SignalValue;
use crate::spot::{SpotCategory, SpotDecl};

pub(crate) fn register(registry: &mut NodeRegistry) {
    registry.register(
        SetVariable::type_key(),
        "Stores the last signal argument in an instance variable",
        || Box::new(SetVariable::default()),
    );
}

/// Stores the last argument of each signal in the instance variable named
/// by its persisted `variable`, then forwards the signal
#[derive(Debug, Default)]
pub struct SetVariable {
    variable: String,
    out: usize,
}

impl SetVariable {
    /// Registry key
    pub fn type_key() -> NodeTypeKey {
        NodeTypeKey::new("SetVariable", "UNLang/Data/")
    }

    /// Create a node writing to `variable`
    pub fn named(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            out: 0,
        }
    }

    /// Target variable name
    pub fn variable(&self) -> &str {
        &self.variable
    }
}

impl LangNode for SetVariable {
    fn init(&mut self, node: &mut Node) -> Result<(), GraphError> {
        node.add(SpotDecl::input("in", SpotCategory::Any).with_name("In"))?;
        self.out = node.add(SpotDecl::output("out", SpotCategory::Any).with_name("Out"))?;
        Ok(())
    }

    fn export(&self) -> Result<Vec<u8>, PersistError> {
        Ok(bincode::serialize(&self.variable)?)
    }

    fn import(&mut self, data: &[u8]) -> Result<(), PersistError> {
        self.variable = bincode::deserialize(data)?;
        Ok(())
    }

    fn on_signal(
        &self,
        ctx: &mut SignalContext<'_>,
        _spot: usize,
        args: &[SignalValue],
    ) -> Result<(), LangError> {
        if self.variable.is_empty() {
            return Err(ctx.fail("variable name is not set"));
        }
        let Some(value) = args.last() else {
            return Err(ctx.fail("signal carries no value to store"));
        };

        ctx.state_mut().set_var(self.variable.clone(), value.clone());
        ctx.signal(self.out, args)
    }
}
