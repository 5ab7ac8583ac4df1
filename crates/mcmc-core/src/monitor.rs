// SPDX-License-Identifier: Apache-2.0
//! The Monitor protocol: periodic observation of node or joint state.

use std::fmt::Debug;

use crate::dag::Dag;
use crate::ident::NodeId;

/// An observer invoked by the driver every `printing_interval` generations.
///
/// A monitor never mutates the model; it only reads node values and
/// densities through the [`Dag`] it is given.
pub trait Monitor: Debug + MonitorClone {
    /// The nodes this monitor observes, used by the driver to resolve
    /// rebinding when this monitor is cloned alongside a
    /// [`crate::model::Model`] clone.
    fn observed_nodes(&self) -> Vec<NodeId>;

    /// Rebinds an observed reference from `old` to `new`.
    fn swap_node(&mut self, old: NodeId, new: NodeId);

    /// Number of generations between successive [`Monitor::monitor`] calls.
    fn printing_interval(&self) -> u64;

    /// Writes a header line, called once before generation `0` fires.
    fn print_header(&mut self);

    /// Records the current state at `generation`.
    fn monitor(&mut self, generation: u64, dag: &mut Dag);
}

/// Object-safe cloning for `Box<dyn Monitor>`, needed because the driver
/// clones a host-supplied monitor per chain and rebinds the clone.
pub trait MonitorClone {
    /// Clones this monitor into a fresh box.
    fn clone_monitor(&self) -> Box<dyn Monitor>;
}

impl<T> MonitorClone for T
where
    T: 'static + Monitor + Clone,
{
    fn clone_monitor(&self) -> Box<dyn Monitor> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn Monitor> {
    fn clone(&self) -> Self {
        self.clone_monitor()
    }
}
