// SPDX-License-Identifier: MIT OR Apache-2.0
//! `unlang` command line host.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use taichi_unlang::{builtin_registry, Graph};
use taichi_unlang_host::settings::SETTINGS_FILE_NAME;
use taichi_unlang_host::{driver, inspect, logging, HostError, HostSettings};

#[derive(Parser)]
#[command(name = "unlang")]
#[command(about = "Load and run UNLang node graphs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the graph named by a settings file
    Run {
        /// Settings file
        #[arg(default_value = SETTINGS_FILE_NAME)]
        settings: PathBuf,
    },

    /// Print the nodes, spots and links of a graph document
    Inspect {
        /// Graph document
        graph: PathBuf,
    },

    /// Write a default settings file
    InitSettings {
        /// Where to write the settings
        #[arg(default_value = SETTINGS_FILE_NAME)]
        path: PathBuf,

        /// Graph document the settings should point at
        #[arg(long)]
        graph: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match execute(cli.cmd) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn execute(cmd: Commands) -> Result<(), HostError> {
    match cmd {
        Commands::Run { settings } => {
            let settings = HostSettings::load(&settings)?;
            logging::init(&settings.log_filter)?;

            let report = driver::run(&settings, &builtin_registry())?;
            tracing::info!(
                frames = report.frames,
                elapsed = report.elapsed,
                "run finished"
            );
            for (name, value) in &report.variables {
                println!("{name} = {value}");
            }
        }
        Commands::Inspect { graph } => {
            logging::init("warn")?;
            let doc = driver::read_document(&graph)?;
            let graph = Graph::load(&doc, &builtin_registry())?;
            print!("{}", inspect::describe(&graph));
        }
        Commands::InitSettings { path, graph } => {
            logging::init("info")?;
            let settings = graph.map(HostSettings::for_graph).unwrap_or_default();
            settings.save(&path)?;
            tracing::info!(path = %path.display(), "wrote settings");
        }
    }
    Ok(())
}
