// SPDX-License-Identifier: MIT OR Apache-2.0
//! Arithmetic nodes.

use crate::behavior::{LangNode, SignalContext};
use crate::error::{GraphError, LangError, PersistError};
use crate::node::Node;
use crate::registry::{NodeRegistry, NodeTypeKey};
use crate::signal::SignalValue;
use crate::spot::{SpotCategory, SpotDecl};
use serde::{Deserialize, Serialize};
use std::cell::Cell;

pub(crate) fn register(registry: &mut NodeRegistry) {
    registry.register(
        Counter::type_key(),
        "Counts signals and appends the running count",
        || Box::new(Counter::default()),
    );
}

/// Persisted state of a [`Counter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterState {
    /// Current count
    pub count: i64,
    /// Added on every signal
    pub step: i64,
}

impl Default for CounterState {
    fn default() -> Self {
        Self { count: 0, step: 1 }
    }
}

/// Adds `step` to its count on every signal and forwards the input with the
/// new count appended
#[derive(Debug, Default)]
pub struct Counter {
    state: Cell<CounterState>,
    out: usize,
}

impl Counter {
    /// Registry key
    pub fn type_key() -> NodeTypeKey {
        NodeTypeKey::new("Counter", "UNLang/Math/")
    }

    /// Create a counter with a custom step
    pub fn with_step(step: i64) -> Self {
        Self {
            state: Cell::new(CounterState { count: 0, step }),
            out: 0,
        }
    }

    /// Current state
    pub fn state(&self) -> CounterState {
        self.state.get()
    }
}

impl LangNode for Counter {
    fn init(&mut self, node: &mut Node) -> Result<(), GraphError> {
        node.add(SpotDecl::input("in", SpotCategory::Any).with_name("In"))?;
        self.out = node.add(SpotDecl::output("out", SpotCategory::Any).with_name("Out"))?;
        Ok(())
    }

    fn export(&self) -> Result<Vec<u8>, PersistError> {
        Ok(bincode::serialize(&self.state.get())?)
    }

    fn import(&mut self, data: &[u8]) -> Result<(), PersistError> {
        self.state.set(bincode::deserialize(data)?);
        Ok(())
    }

    fn on_signal(
        &self,
        ctx: &mut SignalContext<'_>,
        _spot: usize,
        args: &[SignalValue],
    ) -> Result<(), LangError> {
        let mut state = self.state.get();
        state.count = state
            .count
            .checked_add(state.step)
            .ok_or_else(|| ctx.fail("counter overflow"))?;
        self.state.set(state);

        let mut next = args.to_vec();
        next.push(SignalValue::Int(state.count));
        ctx.signal(self.out, &next)
    }
}
