// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host driving loop.
//!
//! Begins the instance once, then ticks it a fixed number of times with a
//! fixed delta. Everything runs on the calling thread.

use crate::error::HostError;
use crate::settings::HostSettings;
use std::path::Path;
use taichi_unlang::{
    Graph, GraphDocument, LangInstance, LogSink, NodeRegistry, SignalValue, TracingSink,
};

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Ticks completed after `begin`
    pub frames: u64,
    /// Simulated seconds
    pub elapsed: f64,
    /// Instance variables at the end of the run
    pub variables: Vec<(String, SignalValue)>,
}

/// Read and parse a graph document
pub fn read_document(path: &Path) -> Result<GraphDocument, HostError> {
    let text = std::fs::read_to_string(path).map_err(|e| HostError::io(path, e))?;
    Ok(GraphDocument::from_ron(&text)?)
}

/// One instance plus the loop settings driving it
pub struct HostLoop {
    instance: LangInstance,
    ticks: u32,
    fixed_delta: f32,
}

impl HostLoop {
    /// Wrap an already loaded graph
    pub fn new(graph: Graph, log: Box<dyn LogSink>, settings: &HostSettings) -> Result<Self, HostError> {
        Ok(Self {
            instance: LangInstance::new(graph, log)?.with_cycle_guard(settings.cycle_guard),
            ticks: settings.ticks,
            fixed_delta: settings.fixed_delta,
        })
    }

    /// Load the graph named by `settings`, logging node output via `tracing`
    pub fn load(settings: &HostSettings, registry: &NodeRegistry) -> Result<Self, HostError> {
        let doc = read_document(&settings.graph)?;
        let graph = Graph::load(&doc, registry)?;
        Self::new(graph, Box::new(TracingSink), settings)
    }

    /// The running instance
    pub fn instance(&self) -> &LangInstance {
        &self.instance
    }

    /// Begin, then tick until the configured count is reached
    pub fn run(&mut self) -> Result<RunReport, HostError> {
        tracing::info!(
            graph = %self.instance.graph().name,
            ticks = self.ticks,
            "starting instance {}",
            self.instance.id()
        );
        self.instance.begin()?;

        for _ in 0..self.ticks {
            self.instance.tick(self.fixed_delta)?;
        }

        let state = self.instance.state();
        Ok(RunReport {
            frames: state.frame,
            elapsed: state.elapsed,
            variables: state
                .variables
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        })
    }

    /// Write a snapshot of the graph, node state included
    pub fn export(&self, path: &Path) -> Result<(), HostError> {
        let text = self.instance.graph().to_document()?.to_ron()?;
        std::fs::write(path, text).map_err(|e| HostError::io(path, e))?;
        tracing::info!(path = %path.display(), "exported graph");
        Ok(())
    }
}

/// Load, run and optionally export, as configured
pub fn run(settings: &HostSettings, registry: &NodeRegistry) -> Result<RunReport, HostError> {
    let mut host = HostLoop::load(settings, registry)?;
    let report = host.run()?;
    if let Some(path) = &settings.export_path {
        host.export(path)?;
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use taichi_unlang::{builtin_registry, GraphError, LangError, LogLevel};

    const TICKING: &str = r#"(
        name: "ticking",
        nodes: [
            (id: "entry", tag: "Entry", type_key: (name: "Entry", category: "UNLang/")),
            (id: "update", tag: "Update", type_key: (name: "Update", category: "UNLang/")),
            (id: "count", tag: "Counter", type_key: (name: "Counter", category: "UNLang/Math/")),
            (id: "console", tag: "Console", type_key: (name: "Console", category: "UNLang/Debug/")),
        ],
        links: [
            (a: (node: "update", spot: "out"), b: (node: "count", spot: "in")),
            (a: (node: "count", spot: "out"), b: (node: "console", spot: "in")),
        ],
    )"#;

    #[derive(Clone, Default)]
    struct Lines(Rc<RefCell<Vec<String>>>);

    impl LogSink for Lines {
        fn log(&self, _level: LogLevel, _source: &str, message: &str) {
            self.0.borrow_mut().push(message.to_string());
        }
    }

    #[test]
    fn test_run_ticks() {
        let doc = GraphDocument::from_ron(TICKING).unwrap();
        let graph = Graph::load(&doc, &builtin_registry()).unwrap();
        let settings = HostSettings {
            ticks: 4,
            fixed_delta: 0.5,
            ..HostSettings::default()
        };

        let lines = Lines::default();
        let mut host = HostLoop::new(graph, Box::new(lines.clone()), &settings).unwrap();
        let report = host.run().unwrap();

        assert_eq!(report.frames, 4);
        assert!((report.elapsed - 2.0).abs() < 1e-9);
        let lines = lines.0.borrow();
        assert_eq!(lines.len(), 4);
        assert!(lines[3].ends_with("0.5, 4"));
    }

    #[test]
    fn test_cycle_guard_setting_reaches_instance() {
        let doc = GraphDocument::from_ron(TICKING).unwrap();
        let graph = Graph::load(&doc, &builtin_registry()).unwrap();
        let settings = HostSettings {
            cycle_guard: true,
            ..HostSettings::default()
        };

        let host = HostLoop::new(graph, Box::new(Lines::default()), &settings).unwrap();
        assert!(host.instance().cycle_guard());
    }

    #[test]
    fn test_run_from_files_with_export() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ticking.ron"), TICKING).unwrap();
        let mut settings = HostSettings::for_graph(dir.path().join("ticking.ron"));
        settings.ticks = 2;
        settings.export_path = Some(dir.path().join("snapshot.ron"));

        let report = run(&settings, &builtin_registry()).unwrap();
        assert_eq!(report.frames, 2);

        let snapshot = read_document(&dir.path().join("snapshot.ron")).unwrap();
        let counter = snapshot.nodes.iter().find(|n| n.id == "count").unwrap();
        assert!(!counter.state.is_empty());
        assert_eq!(snapshot.links.len(), 2);
    }

    #[test]
    fn test_unknown_node_type_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.ron");
        std::fs::write(
            &path,
            r#"(name: "bad", nodes: [(id: "x", tag: "X", type_key: (name: "Nope", category: "UNLang/"))])"#,
        )
        .unwrap();

        let err = HostLoop::load(&HostSettings::for_graph(&path), &builtin_registry()).err();
        assert!(matches!(
            err,
            Some(HostError::Lang(LangError::Graph(GraphError::UnknownNodeType(_))))
        ));
    }
}
