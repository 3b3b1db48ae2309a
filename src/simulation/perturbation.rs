use crate::graph::location::LocationId;
use crate::graph::network::Network;
use crate::graph::pipe::PipeId;
use log::debug;

/// Temporary capacity change on a network.
///
/// Every pipe touched through the perturbation has its capacity saved the
/// first time it is touched; all of them are put back when the
/// perturbation is dropped, whether the probe returned normally, bailed
/// out with `?` or panicked. Holding the perturbation borrows the network
/// exclusively, so a second probe cannot start before the first restored.
///
/// Structural edits (adding or removing pipes) through [`Self::network`]
/// are not supported while the perturbation is alive.
pub struct CapacityPerturbation<'a> {
    network: &'a mut Network,
    saved: Vec<(PipeId, f64)>,
}

impl<'a> CapacityPerturbation<'a> {
    pub fn new(network: &'a mut Network) -> Self {
        Self {
            network,
            saved: Vec::new(),
        }
    }

    fn set(&mut self, id: PipeId, capacity: f64) {
        if !self.saved.iter().any(|(p, _)| *p == id) {
            self.saved.push((id, self.network.pipe(id).capacity()));
        }
        self.network.pipe_mut(id).set_capacity(capacity);
    }

    /// Zeroes a pipe and its reverse partner.
    pub fn zero_pipe(&mut self, id: PipeId) {
        self.set(id, 0.0);
        if let Some(reverse) = self.network.pipe(id).reverse() {
            self.set(reverse, 0.0);
        }
    }

    /// Zeroes every pipe leaving `location`.
    pub fn zero_outgoing(&mut self, location: LocationId) {
        let pipes = self.network.outgoing(location).to_vec();
        pipes.into_iter().for_each(|p| self.zero_pipe(p));
    }

    pub fn network(&mut self) -> &mut Network {
        &mut *self.network
    }

    pub fn affected(&self) -> impl Iterator<Item = PipeId> + '_ {
        self.saved.iter().map(|(p, _)| *p)
    }

    /// Ends the perturbation now instead of at scope exit.
    pub fn restore(self) {}
}

impl Drop for CapacityPerturbation<'_> {
    fn drop(&mut self) {
        let saved = std::mem::take(&mut self.saved);
        for (id, capacity) in saved.iter().rev() {
            if let Some(pipe) = self.network.try_pipe_mut(*id) {
                pipe.set_capacity(*capacity);
            }
        }
        debug!("restored capacity of {} pipes", saved.len());
    }
}
