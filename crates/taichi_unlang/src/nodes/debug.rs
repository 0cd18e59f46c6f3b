// SPDX-License-Identifier: MIT OR Apache-2.0
//! Debug output nodes.

use crate::behavior::{LangNode, SignalContext};
use crate::error::{GraphError, LangError};
use crate::log::LogLevel;
use crate::node::Node;
use crate::registry::{NodeRegistry, NodeTypeKey};
use crate::signal::SignalValue;
use crate::spot::{SpotCategory, SpotDecl};

pub(crate) fn register(registry: &mut NodeRegistry) {
    registry.register(
        Console::type_key(),
        "Writes the signal to the host log, then forwards it",
        || Box::new(Console::default()),
    );
}

/// Logs every signal at info level as `arg, arg, ...` and forwards it
/// unchanged
#[derive(Debug, Default)]
pub struct Console {
    out: usize,
}

impl Console {
    /// Registry key
    pub fn type_key() -> NodeTypeKey {
        NodeTypeKey::new("Console", "UNLang/Debug/")
    }

    /// Render a payload the way it is logged
    pub fn format_args(args: &[SignalValue]) -> String {
        args.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl LangNode for Console {
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
        ctx.log(LogLevel::Info, &Self::format_args(args));
        ctx.signal(self.out, args)
    }
}
