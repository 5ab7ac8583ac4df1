// SPDX-License-Identifier: Apache-2.0
//! Reference `Monitor` implementations: `ConsoleMonitor` and `FileMonitor`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use mcmc_core::{Dag, NodeId};

/// Logs generation, optionally the joint posterior, and a list of named
/// node values, at a fixed interval, through `tracing` rather than raw
/// stdout.
#[derive(Debug, Clone)]
pub struct ConsoleMonitor {
    interval: u64,
    track_posterior: bool,
    nodes: Vec<(String, NodeId)>,
}

impl ConsoleMonitor {
    /// Creates a monitor observing `nodes` (display name paired with node
    /// id) every `interval` generations.
    #[must_use]
    pub fn new(interval: u64, track_posterior: bool, nodes: Vec<(String, NodeId)>) -> Self {
        Self {
            interval,
            track_posterior,
            nodes,
        }
    }

    fn header_columns(&self) -> Vec<&str> {
        let mut columns = vec!["Gen"];
        if self.track_posterior {
            columns.push("Posterior");
        }
        columns.extend(self.nodes.iter().map(|(name, _)| name.as_str()));
        columns
    }
}

impl mcmc_core::Monitor for ConsoleMonitor {
    fn observed_nodes(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|(_, id)| *id).collect()
    }

    fn swap_node(&mut self, old: NodeId, new: NodeId) {
        for (_, id) in &mut self.nodes {
            if *id == old {
                *id = new;
            }
        }
    }

    fn printing_interval(&self) -> u64 {
        self.interval
    }

    fn print_header(&mut self) {
        tracing::info!(columns = self.header_columns().join("\t"), "monitor header");
    }

    fn monitor(&mut self, generation: u64, dag: &mut Dag) {
        let mut row = vec![generation.to_string()];
        if self.track_posterior {
            row.push(format!("{:.6}", dag.sum_ln_probability()));
        }
        for (_, id) in &self.nodes {
            row.push(format!("{:.6}", dag.value_of(*id).get()));
        }
        tracing::info!(generation, row = row.join("\t"), "monitor sample");
    }
}

/// Writes the same tab-separated rows as [`ConsoleMonitor`] to a file
/// instead of the log, through a shared, cloneable writer.
///
/// The writer is behind an `Arc<Mutex<_>>` rather than a bare `BufWriter`
/// because cloning a monitor (when its owning model is cloned per chain)
/// must not open a second handle onto the same log file.
#[derive(Debug, Clone)]
pub struct FileMonitor {
    writer: Arc<Mutex<BufWriter<File>>>,
    interval: u64,
    track_posterior: bool,
    nodes: Vec<(String, NodeId)>,
}

impl FileMonitor {
    /// Creates a monitor that appends tab-separated rows to `path`,
    /// truncating any existing file.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if `path` cannot be created.
    pub fn new(
        path: impl AsRef<Path>,
        interval: u64,
        track_posterior: bool,
        nodes: Vec<(String, NodeId)>,
    ) -> std::io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: Arc::new(Mutex::new(BufWriter::new(file))),
            interval,
            track_posterior,
            nodes,
        })
    }

    fn header_columns(&self) -> Vec<&str> {
        let mut columns = vec!["Gen"];
        if self.track_posterior {
            columns.push("Posterior");
        }
        columns.extend(self.nodes.iter().map(|(name, _)| name.as_str()));
        columns
    }

    fn write_line(&self, line: &str) {
        let mut writer = self.writer.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Err(error) = writeln!(writer, "{line}").and_then(|()| writer.flush()) {
            tracing::error!(%error, "failed to write monitor log line");
        }
    }
}

impl mcmc_core::Monitor for FileMonitor {
    fn observed_nodes(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|(_, id)| *id).collect()
    }

    fn swap_node(&mut self, old: NodeId, new: NodeId) {
        for (_, id) in &mut self.nodes {
            if *id == old {
                *id = new;
            }
        }
    }

    fn printing_interval(&self) -> u64 {
        self.interval
    }

    fn print_header(&mut self) {
        let header = self.header_columns().join("\t");
        self.write_line(&header);
    }

    fn monitor(&mut self, generation: u64, dag: &mut Dag) {
        let mut row = vec![generation.to_string()];
        if self.track_posterior {
            row.push(format!("{:.6}", dag.sum_ln_probability()));
        }
        for (_, id) in &self.nodes {
            row.push(format!("{:.6}", dag.value_of(*id).get()));
        }
        let line = row.join("\t");
        self.write_line(&line);
    }
}
