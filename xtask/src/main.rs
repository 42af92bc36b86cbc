use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};
use headscale_provision_core::provisioning_graph::{headscale_stack_graph, NodeKind};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the headscale provisioning workspace",
    long_about = "A unified CLI for CI checks and for inspecting the stack's\n\
                  provisioning order."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI checks (fmt, clippy, tests)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::All)]
        job: CiJob,
    },
    /// Print the order in which the orchestrator provisions the stack
    Graph {
        /// Print teardown order instead of creation order
        #[arg(long)]
        teardown: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting and clippy
    Lint,
    /// Unit and integration tests
    Test,
    /// Run lint + test
    All,
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_lint() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);
}

fn ci_test() {
    step("Test headscale_provision_core");
    run_cargo(&["test", "-p", "headscale_provision_core"]);

    step("Test headscale_provision_lambda");
    run_cargo(&["test", "-p", "headscale_provision_lambda"]);
}

// ── graph ──────────────────────────────────────────────────────────

fn print_graph(teardown: bool) {
    let graph = match headscale_stack_graph() {
        Ok(graph) => graph,
        Err(error) => {
            eprintln!("invalid stack graph: {error}");
            exit(1);
        }
    };
    let order = if teardown {
        graph.deletion_order()
    } else {
        graph.creation_order()
    };
    let order = match order {
        Ok(order) => order,
        Err(error) => {
            eprintln!("invalid stack graph: {error}");
            exit(1);
        }
    };

    for (position, logical_id) in order.iter().enumerate() {
        let Some(node) = graph.node(logical_id) else {
            continue;
        };
        let marker = match node.kind {
            NodeKind::Resource => String::new(),
            NodeKind::Reconciliation(kind) => format!("  [reconciler: {kind}]"),
        };
        println!("{:>2}. {logical_id}{marker}", position + 1);
        for binding in &node.consumes {
            println!("      <- {}.{}", binding.source, binding.attribute);
        }
    }
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { job } => {
            match job {
                CiJob::Lint => ci_lint(),
                CiJob::Test => ci_test(),
                CiJob::All => {
                    ci_lint();
                    ci_test();
                }
            }
            eprintln!("\nCI job passed.");
        }
        Commands::Graph { teardown } => print_graph(teardown),
    }
}
