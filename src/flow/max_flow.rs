use crate::error::{Result, SupplyError};
use crate::flow::search::{Direction, SearchContext, find_augmenting_path};
use crate::graph::location::LocationId;
use crate::graph::network::Network;
use log::debug;

/// Max flow between two locations given by code.
pub fn edmonds_karp(network: &mut Network, source: &str, sink: &str) -> Result<f64> {
    let invalid = || SupplyError::InvalidEndpoints {
        source_code: source.to_string(),
        sink_code: sink.to_string(),
    };
    let s = network.location_id(source).ok_or_else(invalid)?;
    let t = network.location_id(sink).ok_or_else(invalid)?;
    solve(network, s, t)
}

/// Resets every pipe's flow, then saturates augmenting paths from `source`
/// to `sink` until none is left. Returns the value of the resulting flow.
pub fn solve(network: &mut Network, source: LocationId, sink: LocationId) -> Result<f64> {
    let exists = |id: LocationId| network.get_location(id).is_some();
    if source == sink || !exists(source) || !exists(sink) {
        let code = |id: LocationId| {
            network
                .get_location(id)
                .map_or_else(|| format!("#{}", id.index()), |l| l.code().to_string())
        };
        return Err(SupplyError::InvalidEndpoints {
            source_code: code(source),
            sink_code: code(sink),
        });
    }

    network.reset_flows();
    let mut ctx = SearchContext::new();
    let mut augmentations = 0usize;

    while find_augmenting_path(network, source, sink, &mut ctx) {
        let path = ctx.path(network, source, sink);
        let bottleneck = path
            .iter()
            .map(|step| step.residual(network))
            .fold(f64::INFINITY, f64::min);

        path.iter().for_each(|step| {
            let pipe = network.pipe_mut(step.pipe);
            let flow = match step.direction {
                Direction::Forward => (pipe.flow() + bottleneck).min(pipe.capacity()),
                Direction::Backward => (pipe.flow() - bottleneck).max(0.0),
            };
            pipe.set_flow(flow);
        });
        augmentations += 1;
        debug!(
            "augmentation {}: pushed {} over {} pipes",
            augmentations,
            bottleneck,
            path.len()
        );
    }

    let value = flow_value(network, source);
    debug!("max flow {} after {} augmentations", value, augmentations);
    Ok(value)
}

/// Net flow leaving `id`.
pub fn flow_value(network: &Network, id: LocationId) -> f64 {
    let out: f64 = network
        .outgoing(id)
        .iter()
        .map(|p| network.pipe(*p).flow())
        .sum();
    let inc: f64 = network
        .incoming(id)
        .iter()
        .map(|p| network.pipe(*p).flow())
        .sum();
    out - inc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::search::EPSILON;
    use crate::graph::location::LocationKind;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn relays(codes: &[&str]) -> Network {
        let mut network = Network::new();
        for code in codes {
            network
                .add_location(*code, 0, *code, LocationKind::Relay)
                .unwrap();
        }
        network
    }

    // CLRS figure 26.1, max flow 23
    fn textbook() -> Network {
        let mut network = relays(&["s", "a", "b", "c", "d", "t"]);
        let pipes = [
            ("s", "a", 16.0),
            ("s", "c", 13.0),
            ("c", "a", 4.0),
            ("a", "c", 10.0),
            ("a", "b", 12.0),
            ("b", "c", 9.0),
            ("c", "d", 14.0),
            ("d", "b", 7.0),
            ("b", "t", 20.0),
            ("d", "t", 4.0),
        ];
        for (f, t, c) in pipes {
            network.add_pipe(f, t, c).unwrap();
        }
        network
    }

    fn random_network(seed: u64) -> Network {
        let mut rng = StdRng::seed_from_u64(seed);
        let codes = (0..12).map(|i| format!("N{}", i)).collect::<Vec<_>>();
        let mut network = relays(&codes.iter().map(String::as_str).collect::<Vec<_>>());
        for _ in 0..40 {
            let f = rng.gen_range(0..codes.len());
            let t = rng.gen_range(0..codes.len());
            if f != t {
                let capacity = rng.gen_range(0..30) as f64;
                network.add_pipe(&codes[f], &codes[t], capacity).unwrap();
            }
        }
        network
    }

    fn assert_feasible(network: &Network, source: LocationId, sink: LocationId) {
        for pipe in network.pipes() {
            assert!(pipe.flow() >= 0.0);
            assert!(pipe.flow() <= pipe.capacity() + EPSILON);
        }
        for location in network.locations() {
            if location.id() == source || location.id() == sink {
                continue;
            }
            assert!(flow_value(network, location.id()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_textbook_max_flow() {
        let mut network = textbook();
        let value = edmonds_karp(&mut network, "s", "t").unwrap();
        assert_relative_eq!(23.0, value);
        let s = network.location_id("s").unwrap();
        let t = network.location_id("t").unwrap();
        assert_feasible(&network, s, t);
        assert_relative_eq!(-23.0, flow_value(&network, t));
    }

    #[test]
    fn test_rerun_gives_same_value() {
        let mut network = textbook();
        let first = edmonds_karp(&mut network, "s", "t").unwrap();
        let second = edmonds_karp(&mut network, "s", "t").unwrap();
        assert_relative_eq!(first, second);
    }

    #[test]
    fn test_invalid_endpoints() {
        let mut network = textbook();
        assert!(matches!(
            edmonds_karp(&mut network, "s", "s"),
            Err(SupplyError::InvalidEndpoints { .. })
        ));
        assert!(matches!(
            edmonds_karp(&mut network, "s", "x"),
            Err(SupplyError::InvalidEndpoints { .. })
        ));
        let s = network.location_id("s").unwrap();
        assert!(solve(&mut network, s, LocationId(99)).is_err());
    }

    #[test]
    fn test_unreachable_sink_yields_zero() {
        let mut network = relays(&["a", "b"]);
        assert_relative_eq!(0.0, edmonds_karp(&mut network, "a", "b").unwrap());
    }

    #[test]
    fn test_random_networks_are_feasible() {
        for seed in 0..20 {
            let mut network = random_network(seed);
            let s = network.location_id("N0").unwrap();
            let t = network.location_id("N11").unwrap();
            let value = solve(&mut network, s, t).unwrap();
            assert!(value >= 0.0);
            assert_feasible(&network, s, t);

            let again = solve(&mut network, s, t).unwrap();
            assert_relative_eq!(value, again, epsilon = 1e-9);
        }
    }
}
