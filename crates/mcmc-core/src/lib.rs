// SPDX-License-Identifier: Apache-2.0
//! mcmc-core: the DAG substrate and Metropolis-Hastings driver for a
//! Bayesian inference engine.
//!
//! This crate fixes the change-tracking protocol (`touch`/`keep`/`restore`),
//! the Move/Schedule/Monitor interfaces a host implements proposal kernels
//! and observers against, and the chain driver that ties them together.
//! Concrete probability distributions and deterministic transforms are a
//! collaborator concern, supplied by the host through the [`Distribution`]
//! and [`Transform`] traits.
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
    clippy::return_self_not_must_use,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::use_self,
    clippy::suboptimal_flops,
    // Not published; no repository/readme to declare.
    clippy::cargo_common_metadata
)]

mod dag;
mod distribution;
mod driver;
mod error;
mod ident;
mod model;
mod monitor;
mod moves;
mod node;
mod schedule;
mod transform;
mod value;

/// The DAG arena and `touch`/`keep`/`restore` change-tracking protocol.
pub use dag::Dag;
/// The contract a stochastic node's density and prior draw must honor.
pub use distribution::{Distribution, DistributionClone};
/// The Metropolis-Hastings chain driver.
pub use driver::{ChainConfig, Mcmc, OperatorStat, DRIFT_TOLERANCE, LN_R_REJECT_FLOOR, MAX_INIT_TRIES};
/// The error taxonomy surfaced to the host.
pub use error::{InitializationError, McmcError, NumericError, RebindingError};
/// Stable arena-index identifiers for DAG nodes.
pub use ident::NodeId;
/// Detached model cloning and name-based rebinding.
pub use model::Model;
/// The Monitor protocol: periodic observation of node or joint state.
pub use monitor::{Monitor, MonitorClone};
/// The Move protocol: proposal kernels that perturb stochastic nodes.
pub use moves::{Move, MoveClone, MoveStats};
/// The DAG node type and its tagged-variant payload.
pub use node::{DagNode, NodeKind};
/// Proposal scheduling: `RandomSchedule` and `SequentialSchedule`.
pub use schedule::{RandomSchedule, Schedule, SequentialSchedule};
/// The contract a deterministic node's recompute function must honor.
pub use transform::{Transform, TransformClone};
/// The scalar value type carried by DAG nodes.
pub use value::NodeValue;
