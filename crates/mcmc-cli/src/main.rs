// SPDX-License-Identifier: Apache-2.0
//! mcmc-cli: runs a reference clamped-normal model and prints operator
//! acceptance statistics.
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    // This binary's entire purpose is to print a table to stdout.
    clippy::print_stdout,
    // Not published; no repository/readme to declare.
    clippy::cargo_common_metadata
)]
// `mcmc-cli` is a binary crate; `missing_docs` would otherwise require
// module-level docs on `main`, which other CLI binaries in this style
// leave undocumented.
#![allow(missing_docs)]

mod config;

use std::path::PathBuf;

use clap::Parser;
use comfy_table::Table;
use mcmc_core::{ChainConfig, Dag, Mcmc, NodeValue, RandomSchedule};
use mcmc_demo::{ConsoleMonitor, Normal, ScaleMove, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

use config::RunConfig;

/// Runs a clamped-normal posterior-mean demo chain.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Path to a JSON run configuration file; defaults are used if absent.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Observed value clamped onto the demo model's likelihood node.
    #[arg(long, default_value_t = 2.0)]
    observation: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let run_config = match &cli.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };

    let mut dag = Dag::new();
    let mean = dag.add_constant("mean", NodeValue::from(0.0));
    let sd = dag.add_stochastic(
        "sd",
        Box::new(Uniform::new(0.01, 5.0)),
        &[],
        NodeValue::from(1.0),
    );
    let obs = dag.add_stochastic(
        "obs",
        Box::new(Normal::new()),
        &[mean, sd],
        NodeValue::from(cli.observation),
    );
    dag.clamp(obs, NodeValue::from(cli.observation));

    let scale_move: Box<dyn mcmc_core::Move> = Box::new(ScaleMove::new(
        "sd_scale",
        sd,
        run_config.initial_lambda,
        1.0,
    ));
    let monitor: Box<dyn mcmc_core::Monitor> = Box::new(ConsoleMonitor::new(
        run_config.monitor_interval,
        true,
        vec![("sd".to_string(), sd)],
    ));
    let rng = Box::new(StdRng::seed_from_u64(run_config.seed));

    let mut chain = Mcmc::new(
        &dag,
        vec![scale_move],
        vec![monitor],
        Box::new(RandomSchedule::new()),
        ChainConfig {
            chain_heat: run_config.chain_heat,
            chain_idx: 0,
            chain_active: true,
            rng,
        },
    )?;

    chain.burnin(run_config.burnin_generations, run_config.tuning_interval)?;
    chain.run(run_config.generations)?;

    print_operator_summary(&chain);
    Ok(())
}

fn print_operator_summary(chain: &Mcmc) {
    let mut table = Table::new();
    table.set_header(vec!["Move", "Weight", "Tried", "Accepted", "Rate", "Tuning"]);
    for stat in chain.operator_summary() {
        #[allow(clippy::cast_precision_loss)]
        let rate = if stat.num_tried == 0 {
            0.0
        } else {
            stat.num_accepted as f64 / stat.num_tried as f64
        };
        table.add_row(vec![
            stat.name,
            format!("{:.2}", stat.weight),
            stat.num_tried.to_string(),
            stat.num_accepted.to_string(),
            format!("{rate:.3}"),
            stat.tuning_parameter
                .map_or_else(|| "-".to_string(), |t| format!("{t:.4}")),
        ]);
    }
    println!("{table}");
}
