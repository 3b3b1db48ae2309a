//! Breadth-first augmenting path search over residual capacities.
//!
//! From a location `v`, a pipe `v -> w` can be followed forward while
//! `capacity - flow > 0`, and a pipe `u -> v` can be followed backward
//! (reaching `u`) while `flow > 0`. The per-search registers live in a
//! [`SearchContext`] owned by the caller, so the network itself only holds
//! topology, capacities and flows.

use crate::graph::location::LocationId;
use crate::graph::network::Network;
use crate::graph::pipe::PipeId;
use std::collections::VecDeque;

/// Residual amounts at or below this are treated as exhausted.
pub const EPSILON: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Pipe used to reach a location, and which way it was traversed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathStep {
    pub pipe: PipeId,
    pub direction: Direction,
}

impl PathStep {
    /// Location this step was taken from.
    pub fn predecessor(&self, network: &Network) -> LocationId {
        let pipe = network.pipe(self.pipe);
        match self.direction {
            Direction::Forward => pipe.from(),
            Direction::Backward => pipe.to(),
        }
    }

    pub fn residual(&self, network: &Network) -> f64 {
        let pipe = network.pipe(self.pipe);
        match self.direction {
            Direction::Forward => pipe.residual(),
            Direction::Backward => pipe.flow(),
        }
    }
}

#[derive(Debug, Default)]
pub struct SearchContext {
    visited: Vec<bool>,
    parent: Vec<Option<PathStep>>,
    queue: VecDeque<LocationId>,
}

impl SearchContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset(&mut self, slots: usize) {
        self.visited.clear();
        self.visited.resize(slots, false);
        self.parent.clear();
        self.parent.resize(slots, None);
        self.queue.clear();
    }

    pub fn is_visited(&self, id: LocationId) -> bool {
        self.visited.get(id.index()).copied().unwrap_or(false)
    }

    pub fn parent(&self, id: LocationId) -> Option<PathStep> {
        self.parent.get(id.index()).copied().flatten()
    }

    fn try_visit(&mut self, id: LocationId, step: PathStep, residual: f64) {
        if !self.visited[id.index()] && residual > EPSILON {
            self.visited[id.index()] = true;
            self.parent[id.index()] = Some(step);
            self.queue.push_back(id);
        }
    }

    /// Steps of the last found path, ordered from sink back to source.
    pub fn path(&self, network: &Network, source: LocationId, sink: LocationId) -> Vec<PathStep> {
        let mut steps = Vec::new();
        let mut v = sink;
        while v != source {
            match self.parent(v) {
                Some(step) => {
                    steps.push(step);
                    v = step.predecessor(network);
                }
                None => return Vec::new(),
            }
        }
        steps
    }
}

/// Returns whether `sink` is reachable from `source` in the residual graph.
/// On success `ctx` holds the parent step of every reached location.
pub fn find_augmenting_path(
    network: &Network,
    source: LocationId,
    sink: LocationId,
    ctx: &mut SearchContext,
) -> bool {
    ctx.reset(network.location_slots());
    ctx.visited[source.index()] = true;
    ctx.queue.push_back(source);

    while let Some(v) = ctx.queue.pop_front() {
        if ctx.visited[sink.index()] {
            break;
        }
        for &p in network.outgoing(v) {
            let pipe = network.pipe(p);
            let step = PathStep {
                pipe: p,
                direction: Direction::Forward,
            };
            ctx.try_visit(pipe.to(), step, pipe.residual());
        }
        for &p in network.incoming(v) {
            let pipe = network.pipe(p);
            let step = PathStep {
                pipe: p,
                direction: Direction::Backward,
            };
            ctx.try_visit(pipe.from(), step, pipe.flow());
        }
    }
    ctx.visited[sink.index()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::location::LocationKind;

    fn chain() -> Network {
        let mut network = Network::new();
        for code in ["A", "B", "C"] {
            network
                .add_location(code, 0, code, LocationKind::Relay)
                .unwrap();
        }
        network.add_pipe("A", "B", 5.0).unwrap();
        network.add_pipe("B", "C", 5.0).unwrap();
        network
    }

    #[test]
    fn test_forward_path_found() {
        let network = chain();
        let a = network.location_id("A").unwrap();
        let c = network.location_id("C").unwrap();
        let mut ctx = SearchContext::new();

        assert!(find_augmenting_path(&network, a, c, &mut ctx));
        let path = ctx.path(&network, a, c);
        assert_eq!(2, path.len());
        assert!(path.iter().all(|s| s.direction == Direction::Forward));
    }

    #[test]
    fn test_saturated_pipe_blocks_path() {
        let mut network = chain();
        let bc = network.find_pipe("B", "C").unwrap();
        network.pipe_mut(bc).set_flow(5.0);
        let a = network.location_id("A").unwrap();
        let c = network.location_id("C").unwrap();
        let mut ctx = SearchContext::new();

        assert!(!find_augmenting_path(&network, a, c, &mut ctx));
        assert!(ctx.is_visited(network.location_id("B").unwrap()));
        assert!(ctx.path(&network, a, c).is_empty());
    }

    #[test]
    fn test_backward_traversal_uses_flow() {
        // A -> B carries flow, so C can reach A through B backwards.
        let mut network = chain();
        network.add_pipe("C", "B", 5.0).unwrap();
        let ab = network.find_pipe("A", "B").unwrap();
        network.pipe_mut(ab).set_flow(3.0);
        let a = network.location_id("A").unwrap();
        let c = network.location_id("C").unwrap();
        let mut ctx = SearchContext::new();

        assert!(find_augmenting_path(&network, c, a, &mut ctx));
        let step = ctx.parent(a).unwrap();
        assert_eq!(ab, step.pipe);
        assert_eq!(Direction::Backward, step.direction);
        assert_eq!(3.0, step.residual(&network));
    }

    #[test]
    fn test_context_is_reset_between_searches() {
        let network = chain();
        let a = network.location_id("A").unwrap();
        let c = network.location_id("C").unwrap();
        let mut ctx = SearchContext::new();

        assert!(find_augmenting_path(&network, a, c, &mut ctx));
        assert!(!find_augmenting_path(&network, c, a, &mut ctx));
        assert!(ctx.parent(c).is_none());
        assert!(!ctx.is_visited(a));
    }
}
