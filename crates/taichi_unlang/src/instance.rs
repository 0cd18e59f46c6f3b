// SPDX-License-Identifier: MIT OR Apache-2.0
//! Runtime instance driving one graph.

use crate::behavior::{Runtime, VisitedEdges};
use crate::error::{GraphError, LangError};
use crate::graph::Graph;
use crate::log::{LogSink, TracingSink};
use crate::node::NodeKey;
use crate::nodes::{Entry, Update};
use crate::signal::SignalValue;
use crate::spot::SpotRef;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a running instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub Uuid);

impl InstanceId {
    /// Create a new random instance ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Mutable state shared by every node of a running instance
#[derive(Debug, Clone, Default)]
pub struct InstanceState {
    /// Script variables in first-assignment order
    pub variables: IndexMap<String, SignalValue>,
    /// Delta of the current tick, in seconds
    pub delta_time: f32,
    /// Total ticked time, in seconds
    pub elapsed: f64,
    /// Number of ticks so far
    pub frame: u64,
}

impl InstanceState {
    /// Get a variable
    pub fn get_var(&self, name: &str) -> Option<&SignalValue> {
        self.variables.get(name)
    }

    /// Set a variable, returning the previous value
    pub fn set_var(&mut self, name: impl Into<String>, value: SignalValue) -> Option<SignalValue> {
        self.variables.insert(name.into(), value)
    }
}

/// A graph bound to its Entry node, ready to run.
///
/// Execution is single threaded: the host calls [`begin`](Self::begin)
/// once, then [`tick`](Self::tick) from one driving loop.
///
/// Loops in the graph are followed for as long as their nodes keep
/// signalling. The optional cycle guard (see
/// [`set_cycle_guard`](Self::set_cycle_guard)) turns a link crossed twice
/// from the same end within one wave into [`LangError::CycleDetected`]; it is
/// meant for catching accidental cycles while debugging, and it also stops
/// deliberate loops that repeat an edge.
pub struct LangInstance {
    id: InstanceId,
    graph: Graph,
    state: InstanceState,
    log: Box<dyn LogSink>,
    entry: NodeKey,
    started: bool,
    cycle_guard: bool,
}

impl LangInstance {
    /// Bind a graph to its unique Entry node
    pub fn new(graph: Graph, log: Box<dyn LogSink>) -> Result<Self, GraphError> {
        let entry_key = Entry::type_key();
        let entries: Vec<NodeKey> = graph.nodes_of_type(&entry_key).collect();
        let entry = match entries.as_slice() {
            [] => return Err(GraphError::MissingEntry),
            [entry] => *entry,
            many => return Err(GraphError::MultipleEntries(many.len())),
        };

        let id = InstanceId::new();
        tracing::debug!(instance = %id, graph = %graph.name, "created instance");
        Ok(Self {
            id,
            graph,
            state: InstanceState::default(),
            log,
            entry,
            started: false,
            cycle_guard: false,
        })
    }

    /// Bind a graph, logging node messages through `tracing`
    pub fn with_tracing(graph: Graph) -> Result<Self, GraphError> {
        Self::new(graph, Box::new(TracingSink))
    }

    /// Instance ID
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Key of the Entry node
    pub fn entry(&self) -> NodeKey {
        self.entry
    }

    /// Whether [`begin`](Self::begin) has run
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// The graph
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Mutable graph, for host-side editing between ticks
    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    /// Instance state
    pub fn state(&self) -> &InstanceState {
        &self.state
    }

    /// Mutable instance state
    pub fn state_mut(&mut self) -> &mut InstanceState {
        &mut self.state
    }

    /// Tear down the instance and keep the graph
    pub fn into_graph(self) -> Graph {
        self.graph
    }

    /// Whether the per-wave cycle guard is on
    pub fn cycle_guard(&self) -> bool {
        self.cycle_guard
    }

    /// Turn the per-wave cycle guard on or off. Off by default.
    pub fn set_cycle_guard(&mut self, enabled: bool) {
        self.cycle_guard = enabled;
    }

    /// Builder form of [`set_cycle_guard`](Self::set_cycle_guard)
    pub fn with_cycle_guard(mut self, enabled: bool) -> Self {
        self.cycle_guard = enabled;
        self
    }

    /// Split into the graph and the runtime for one propagation wave
    fn runtime<'a>(
        &'a mut self,
        visited: &'a mut VisitedEdges,
    ) -> (&'a mut Graph, Runtime<'a>) {
        visited.clear();
        let visited = self.cycle_guard.then_some(visited);
        (
            &mut self.graph,
            Runtime {
                state: &mut self.state,
                log: self.log.as_ref(),
                instance: self.id,
                visited,
            },
        )
    }

    /// Start execution at the Entry node.
    ///
    /// Runs the whole signal cascade before returning. The first error
    /// raised by a node unwinds to here; signals delivered before it stay
    /// delivered.
    pub fn begin(&mut self) -> Result<(), LangError> {
        if self.started {
            return Err(GraphError::InvalidOperation(format!(
                "instance {} already began",
                self.id
            ))
            .into());
        }
        self.started = true;

        tracing::debug!(instance = %self.id, "begin");
        let entry = self.entry;
        let mut visited = VisitedEdges::default();
        let (graph, mut rt) = self.runtime(&mut visited);
        graph.begin_node(entry, &mut rt)
    }

    /// Advance time by `delta` seconds and fire every Update node in graph
    /// order
    pub fn tick(&mut self, delta: f32) -> Result<(), LangError> {
        if !self.started {
            return Err(GraphError::InvalidOperation(format!(
                "instance {} ticked before begin",
                self.id
            ))
            .into());
        }

        self.state.delta_time = delta;
        self.state.elapsed += f64::from(delta);
        self.state.frame += 1;

        let update_key = Update::type_key();
        let updates: Vec<NodeKey> = self.graph.nodes_of_type(&update_key).collect();
        let mut visited = VisitedEdges::default();
        for key in updates {
            let (graph, mut rt) = self.runtime(&mut visited);
            graph.begin_node(key, &mut rt)?;
        }
        Ok(())
    }

    /// Signal a spot from outside the graph, as a host event source
    pub fn signal(&mut self, spot: SpotRef, args: &[SignalValue]) -> Result<(), LangError> {
        let mut visited = VisitedEdges::default();
        let (graph, mut rt) = self.runtime(&mut visited);
        graph.propagate(spot, args, &mut rt)
    }
}

impl fmt::Debug for LangInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LangInstance")
            .field("id", &self.id)
            .field("graph", &self.graph)
            .field("state", &self.state)
            .field("entry", &self.entry)
            .field("started", &self.started)
            .field("cycle_guard", &self.cycle_guard)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::{LangNode, SignalContext};
    use crate::log::LogLevel;
    use crate::node::Node;
    use crate::nodes::{Console, DeltaTime};
    use crate::registry::NodeTypeKey;
    use crate::spot::{SpotCategory, SpotDecl};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Lines(Rc<RefCell<Vec<(String, String)>>>);

    impl LogSink for Lines {
        fn log(&self, _level: LogLevel, source: &str, message: &str) {
            self.0.borrow_mut().push((source.to_string(), message.to_string()));
        }
    }

    type Calls = Rc<RefCell<Vec<(String, Vec<SignalValue>)>>>;

    /// Records every signal, then forwards it with its name appended
    struct Probe {
        name: &'static str,
        calls: Calls,
        out: usize,
    }

    impl LangNode for Probe {
        fn init(&mut self, node: &mut Node) -> Result<(), GraphError> {
            node.add(SpotDecl::input("in", SpotCategory::Any))?;
            self.out = node.add(SpotDecl::output("out", SpotCategory::Any))?;
            Ok(())
        }

        fn on_signal(
            &self,
            ctx: &mut SignalContext<'_>,
            _spot: usize,
            args: &[SignalValue],
        ) -> Result<(), LangError> {
            self.calls.borrow_mut().push((self.name.to_string(), args.to_vec()));
            let mut next = args.to_vec();
            next.push(SignalValue::from(self.name));
            ctx.signal(self.out, &next)
        }
    }

    /// Fails on every signal
    struct Faulty;

    impl LangNode for Faulty {
        fn init(&mut self, node: &mut Node) -> Result<(), GraphError> {
            node.add(SpotDecl::input("in", SpotCategory::Any))?;
            Ok(())
        }

        fn on_signal(
            &self,
            ctx: &mut SignalContext<'_>,
            _spot: usize,
            _args: &[SignalValue],
        ) -> Result<(), LangError> {
            Err(ctx.fail("boom"))
        }
    }

    fn probe(graph: &mut Graph, name: &'static str, calls: &Calls) -> NodeKey {
        graph
            .add_node(
                name,
                name,
                NodeTypeKey::new("Probe", "Tests/"),
                Box::new(Probe { name, calls: calls.clone(), out: 0 }),
            )
            .unwrap()
    }

    fn entry(graph: &mut Graph) -> NodeKey {
        graph
            .add_node("entry", "Entry", Entry::type_key(), Box::new(Entry::default()))
            .unwrap()
    }

    fn wire(graph: &mut Graph, from: &str, to: &str) {
        let a = graph.resolve(from, "out").unwrap();
        let b = graph.resolve(to, "in").unwrap();
        graph.link(a, b).unwrap();
    }

    #[test]
    fn test_entry_delta_console_scenario() {
        let mut graph = Graph::new("scenario");
        entry(&mut graph);
        graph
            .add_node("dt", "DeltaTime", DeltaTime::type_key(), Box::new(DeltaTime::default()))
            .unwrap();
        graph
            .add_node("console", "Console", Console::type_key(), Box::new(Console::default()))
            .unwrap();
        wire(&mut graph, "entry", "dt");
        wire(&mut graph, "dt", "console");

        let lines = Lines::default();
        let mut instance = LangInstance::new(graph, Box::new(lines.clone())).unwrap();
        instance.state_mut().delta_time = 0.5;
        instance.begin().unwrap();

        let lines = lines.0.borrow();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, "Console");
        assert_eq!(lines[0].1, format!("instance:{}, 0.5", instance.id()));
    }

    #[test]
    fn test_propagation_order_and_args() {
        let calls = Calls::default();
        let mut graph = Graph::new("fanout");
        entry(&mut graph);
        for name in ["a", "b", "c"] {
            probe(&mut graph, name, &calls);
        }
        wire(&mut graph, "entry", "a");
        wire(&mut graph, "entry", "c");
        wire(&mut graph, "a", "b");

        let mut instance = LangInstance::new(graph, Box::new(Lines::default())).unwrap();
        let id = SignalValue::Instance(instance.id());
        instance.begin().unwrap();

        // depth first: a, then a's child b, then c
        let calls = calls.borrow();
        let names: Vec<&str> = calls.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(calls[0].1, vec![id.clone()]);
        assert_eq!(calls[1].1, vec![id.clone(), SignalValue::from("a")]);
        assert_eq!(calls[2].1, vec![id]);
    }

    #[test]
    fn test_error_unwinds_without_rollback() {
        let calls = Calls::default();
        let mut graph = Graph::new("faulty");
        entry(&mut graph);
        probe(&mut graph, "first", &calls);
        graph
            .add_node("bad", "Bad", NodeTypeKey::new("Faulty", "Tests/"), Box::new(Faulty))
            .unwrap();
        probe(&mut graph, "never", &calls);
        wire(&mut graph, "entry", "first");
        wire(&mut graph, "entry", "bad");
        wire(&mut graph, "entry", "never");

        let mut instance = LangInstance::new(graph, Box::new(Lines::default())).unwrap();
        let err = instance.begin().unwrap_err();

        assert!(matches!(err, LangError::Node { ref node, .. } if node == "bad"));
        let names: Vec<String> = calls.borrow().iter().map(|(n, _)| n.clone()).collect();
        assert_eq!(names, ["first"]);

        // every behaviour is back in place after the unwind
        let graph = instance.graph();
        assert!(graph.node_keys().all(|k| graph.behavior(k).is_some()));
    }

    /// Re-signals `out` from its `back` spot until `remaining` runs out
    struct Looper {
        remaining: Cell<u32>,
        back_hits: Rc<Cell<u32>>,
        back: usize,
        out: usize,
    }

    impl LangNode for Looper {
        fn init(&mut self, node: &mut Node) -> Result<(), GraphError> {
            node.add(SpotDecl::input("in", SpotCategory::Any))?;
            self.back = node.add(SpotDecl::input("back", SpotCategory::Any))?;
            self.out = node.add(SpotDecl::output("out", SpotCategory::Any))?;
            Ok(())
        }

        fn on_signal(
            &self,
            ctx: &mut SignalContext<'_>,
            spot: usize,
            args: &[SignalValue],
        ) -> Result<(), LangError> {
            if spot == self.back {
                self.back_hits.set(self.back_hits.get() + 1);
                let left = self.remaining.get();
                if left == 0 {
                    return Ok(());
                }
                self.remaining.set(left - 1);
            }
            ctx.signal(self.out, args)
        }
    }

    /// entry -> l.in, l.out -> e.in, e.out -> l.back
    fn feedback_graph(remaining: u32, calls: &Calls, back_hits: &Rc<Cell<u32>>) -> Graph {
        let mut graph = Graph::new("feedback");
        entry(&mut graph);
        graph
            .add_node(
                "l",
                "Looper",
                NodeTypeKey::new("Looper", "Tests/"),
                Box::new(Looper {
                    remaining: Cell::new(remaining),
                    back_hits: back_hits.clone(),
                    back: 0,
                    out: 0,
                }),
            )
            .unwrap();
        probe(&mut graph, "e", calls);
        wire(&mut graph, "entry", "l");
        wire(&mut graph, "l", "e");
        let from = graph.resolve("e", "out").unwrap();
        let back = graph.resolve("l", "back").unwrap();
        graph.link(from, back).unwrap();
        graph
    }

    #[test]
    fn test_feedback_into_running_node() {
        for guard in [false, true] {
            let calls = Calls::default();
            let back_hits = Rc::new(Cell::new(0));
            let graph = feedback_graph(0, &calls, &back_hits);

            let mut instance = LangInstance::new(graph, Box::new(Lines::default()))
                .unwrap()
                .with_cycle_guard(guard);
            instance.begin().unwrap();

            assert_eq!(back_hits.get(), 1);
            assert_eq!(calls.borrow().len(), 1);
        }
    }

    #[test]
    fn test_deliberate_loop_runs_until_node_stops() {
        let calls = Calls::default();
        let back_hits = Rc::new(Cell::new(0));
        let graph = feedback_graph(3, &calls, &back_hits);

        let mut instance = LangInstance::new(graph, Box::new(Lines::default())).unwrap();
        assert!(!instance.cycle_guard());
        instance.begin().unwrap();

        assert_eq!(back_hits.get(), 4);
        assert_eq!(calls.borrow().len(), 4);
    }

    #[test]
    fn test_cycle_guard_flags_repeated_link() {
        let calls = Calls::default();
        let back_hits = Rc::new(Cell::new(0));
        let graph = feedback_graph(3, &calls, &back_hits);
        let repeated = graph
            .links_of(graph.resolve("l", "out").unwrap())
            .unwrap()
            .next()
            .unwrap()
            .id;

        let mut instance = LangInstance::new(graph, Box::new(Lines::default())).unwrap();
        instance.set_cycle_guard(true);
        let err = instance.begin().unwrap_err();

        assert!(matches!(
            err,
            LangError::CycleDetected { link, ref node } if link == repeated && node == "e"
        ));
        assert_eq!(calls.borrow().len(), 1);
        assert_eq!(back_hits.get(), 1);
    }

    #[test]
    fn test_cycle_guard_resets_between_waves() {
        let calls = Calls::default();
        let mut graph = Graph::new("waves");
        entry(&mut graph);
        graph
            .add_node("update", "Update", Update::type_key(), Box::new(Update::default()))
            .unwrap();
        probe(&mut graph, "a", &calls);
        wire(&mut graph, "update", "a");

        let mut instance = LangInstance::new(graph, Box::new(Lines::default()))
            .unwrap()
            .with_cycle_guard(true);
        instance.begin().unwrap();
        instance.tick(0.1).unwrap();
        instance.tick(0.1).unwrap();
        assert_eq!(calls.borrow().len(), 2);
    }

    #[test]
    fn test_missing_and_multiple_entries() {
        let graph = Graph::new("empty");
        assert!(matches!(
            LangInstance::with_tracing(graph),
            Err(GraphError::MissingEntry)
        ));

        let mut graph = Graph::new("two");
        entry(&mut graph);
        graph
            .add_node("entry2", "Entry", Entry::type_key(), Box::new(Entry::default()))
            .unwrap();
        assert!(matches!(
            LangInstance::with_tracing(graph),
            Err(GraphError::MultipleEntries(2))
        ));
    }

    #[test]
    fn test_begin_once_and_tick_after_begin() {
        let mut graph = Graph::new("ticks");
        entry(&mut graph);
        let mut instance = LangInstance::with_tracing(graph).unwrap();

        assert!(matches!(
            instance.tick(0.1),
            Err(LangError::Graph(GraphError::InvalidOperation(_)))
        ));
        instance.begin().unwrap();
        assert!(matches!(
            instance.begin(),
            Err(LangError::Graph(GraphError::InvalidOperation(_)))
        ));

        instance.tick(0.25).unwrap();
        instance.tick(0.25).unwrap();
        assert_eq!(instance.state().frame, 2);
        assert!((instance.state().elapsed - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_update_fires_each_tick() {
        let calls = Calls::default();
        let mut graph = Graph::new("update");
        entry(&mut graph);
        graph
            .add_node("update", "Update", Update::type_key(), Box::new(Update::default()))
            .unwrap();
        probe(&mut graph, "p", &calls);
        wire(&mut graph, "update", "p");

        let mut instance = LangInstance::with_tracing(graph).unwrap();
        instance.begin().unwrap();
        assert!(calls.borrow().is_empty());

        instance.tick(0.5).unwrap();
        instance.tick(0.25).unwrap();
        let calls = calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].1[1], SignalValue::Float(0.25));
    }

    #[test]
    fn test_external_signal() {
        let calls = Calls::default();
        let mut graph = Graph::new("external");
        entry(&mut graph);
        probe(&mut graph, "a", &calls);
        probe(&mut graph, "b", &calls);
        wire(&mut graph, "a", "b");

        let mut instance = LangInstance::with_tracing(graph).unwrap();
        let out = instance.graph().resolve("a", "out").unwrap();
        instance.signal(out, &[SignalValue::Int(7)]).unwrap();

        let calls = calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], ("b".to_string(), vec![SignalValue::Int(7)]));
    }
}
