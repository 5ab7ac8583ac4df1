// SPDX-License-Identifier: Apache-2.0
//! mcmc-demo: reference distributions, moves, and monitors built against
//! mcmc-core's traits.
#![forbid(unsafe_code)]
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
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::suboptimal_flops,
    // Not published; no repository/readme to declare.
    clippy::cargo_common_metadata
)]

mod distributions;
mod monitor;
mod moves;

/// Reference priors: `Uniform` and parent-parameterized `Normal`.
pub use distributions::{Normal, Uniform};
/// Logs generation/posterior/node-value rows through `tracing`, or appends
/// them to a file.
pub use monitor::{ConsoleMonitor, FileMonitor};
/// The canonical multiplicative scale move.
pub use moves::ScaleMove;
