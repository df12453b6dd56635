//! Demo CLI driving a single reconciliation pass over a JSON-described
//! scenario. Not a production SCM entry point: the real handler is
//! invoked in-process by the replication manager's dispatcher. This
//! binary exists to exercise the library end to end from the command
//! line.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use serde::Deserialize;

use ratis_reconcile::config::HandlerConfig;
use ratis_reconcile::model::{HealthResult, PendingOp};
use ratis_reconcile::placement::RoundRobinPlacementPolicy;
use ratis_reconcile::replication_manager::FakeReplicationManager;
use ratis_reconcile::metrics::ReconciliationMetrics;
use ratis_reconcile::orchestrator::process_and_send_commands;

#[derive(Parser, Debug)]
#[command(name = "reconcile-demo")]
#[command(version, about = "Run a single reconciliation pass over a scenario file", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a reconciliation pass over a scenario JSON file.
    Run {
        /// Path to the scenario file.
        #[arg(long)]
        scenario: PathBuf,

        /// Path to the handler configuration file. Defaults are used
        /// when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// On-disk shape of a scenario file: the pieces `process_and_send_commands`
/// needs, plus the datanode pool the fake placement policy draws from.
#[derive(Debug, Deserialize)]
struct Scenario {
    health_result: HealthResult,
    replicas: Vec<ratis_reconcile::model::ContainerReplica>,
    #[serde(default)]
    pending_ops: Vec<PendingOp>,
    #[serde(default)]
    node_statuses: Vec<NodeStatusEntry>,
    #[serde(default)]
    placement_pool: Vec<ratis_reconcile::model::DatanodeId>,
}

#[derive(Debug, Deserialize)]
struct NodeStatusEntry {
    datanode_id: ratis_reconcile::model::DatanodeId,
    status: ratis_reconcile::model::DatanodeStatus,
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Command::Run { scenario, config } => run(scenario, config),
    }
}

fn run(scenario_path: PathBuf, config_path: Option<PathBuf>) {
    let config = match config_path {
        Some(path) => HandlerConfig::load(&path),
        None => Ok(HandlerConfig::default()),
    };

    let config = match config {
        Ok(config) => config,
        Err(err) => fail(&err.to_string()),
    };

    let content = match std::fs::read_to_string(&scenario_path) {
        Ok(content) => content,
        Err(err) => fail(&format!("failed to read scenario: {err}")),
    };

    let scenario: Scenario = match serde_json::from_str(&content) {
        Ok(scenario) => scenario,
        Err(err) => fail(&format!("invalid scenario JSON: {err}")),
    };

    let mut manager = FakeReplicationManager::new();
    for entry in scenario.node_statuses {
        manager = manager.with_status(entry.datanode_id, entry.status);
    }

    let policy = RoundRobinPlacementPolicy::new(scenario.placement_pool);
    let metrics = ReconciliationMetrics::new();

    let result = process_and_send_commands(
        &manager,
        &policy,
        &metrics,
        &config,
        &scenario.replicas,
        &scenario.pending_ops,
        &scenario.health_result,
    );

    match result {
        Ok(count) => {
            let output = serde_json::json!({ "status": "ok", "commands_emitted": count });
            println!("{output}");
        }
        Err(err) => fail(&err.to_string()),
    }
}

/// Print a structured JSON error to stderr and exit non-zero. Built with
/// `serde_json::json!` rather than hand-interpolated string formatting
/// so an error message containing quotes still produces valid JSON.
fn fail(message: &str) -> ! {
    let error_json = serde_json::json!({ "status": "error", "message": message });
    eprintln!("{error_json}");
    process::exit(1);
}
