use crate::error::Result;
use crate::graph::location::LocationKind;
use crate::graph::network::Network;
use crate::scenario::scenario::Scenario;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::collections::HashSet;

/// Layered supply -> relay -> demand network drawn from a seeded generator.
/// Every relay is fed by some reservoir and every city by some relay.
pub struct RandomScenario {
    seed: u64,
    reservoirs: usize,
    stations: usize,
    cities: usize,
}

impl RandomScenario {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            reservoirs: 4,
            stations: 12,
            cities: 20,
        }
    }

    pub fn with_size(seed: u64, reservoirs: usize, stations: usize, cities: usize) -> Self {
        Self {
            seed,
            reservoirs: reservoirs.max(1),
            stations: stations.max(1),
            cities,
        }
    }
}

impl Scenario for RandomScenario {
    fn name(&self) -> &str {
        "random"
    }

    fn build(&self) -> Result<Network> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut network = Network::new();

        let sizes = [40.0, 80.0, 160.0];

        let reservoir_codes = (1..=self.reservoirs)
            .map(|i| format!("R_{}", i))
            .collect::<Vec<_>>();
        let station_codes = (1..=self.stations)
            .map(|i| format!("PS_{}", i))
            .collect::<Vec<_>>();
        let city_codes = (1..=self.cities)
            .map(|i| format!("C_{}", i))
            .collect::<Vec<_>>();

        for (i, code) in reservoir_codes.iter().enumerate() {
            network.add_location(
                code.as_str(),
                (i + 1) as u32,
                format!("Reservoir {}", i + 1),
                LocationKind::Supply {
                    max_delivery: sizes[i % sizes.len()] * 2.0,
                    municipality: format!("Municipality {}", i % 3 + 1),
                },
            )?;
        }
        for (i, code) in station_codes.iter().enumerate() {
            network.add_location(
                code.as_str(),
                (i + 1) as u32,
                code.as_str(),
                LocationKind::Relay,
            )?;
        }
        for (i, code) in city_codes.iter().enumerate() {
            network.add_location(
                code.as_str(),
                (i + 1) as u32,
                format!("City {}", i + 1),
                LocationKind::Demand {
                    demand: rng.gen_range(10..60) as f64,
                    population: rng.gen_range(1_000..100_000) as f64,
                },
            )?;
        }

        let mut connected = HashSet::new();
        let mut add_pipe = |network: &mut Network, from: &str, to: &str, capacity: f64| {
            if from == to || !connected.insert((from.to_string(), to.to_string())) {
                return Ok(());
            }
            network.add_pipe(from, to, capacity).map(|_| ())
        };

        for station in &station_codes {
            let reservoir = &reservoir_codes[rng.gen_range(0..reservoir_codes.len())];
            let capacity = sizes[rng.gen_range(0..sizes.len())];
            add_pipe(&mut network, reservoir, station, capacity)?;
        }
        for city in &city_codes {
            let station = &station_codes[rng.gen_range(0..station_codes.len())];
            add_pipe(&mut network, station, city, rng.gen_range(10..80) as f64)?;
        }

        let extra = self.stations + self.cities;
        for _ in 0..extra {
            let station = &station_codes[rng.gen_range(0..station_codes.len())];
            if !city_codes.is_empty() && rng.gen_range(0..2) == 0 {
                let city = &city_codes[rng.gen_range(0..city_codes.len())];
                add_pipe(&mut network, station, city, rng.gen_range(5..40) as f64)?;
            } else {
                let reservoir = &reservoir_codes[rng.gen_range(0..reservoir_codes.len())];
                let capacity = sizes[rng.gen_range(0..sizes.len())];
                add_pipe(&mut network, reservoir, station, capacity)?;
            }
        }

        // A few two-way links between stations.
        for _ in 0..self.stations / 3 {
            let a = rng.gen_range(0..station_codes.len());
            let b = rng.gen_range(0..station_codes.len());
            let (a, b) = (&station_codes[a], &station_codes[b]);
            if a != b && network.find_pipe(a, b).is_none() && network.find_pipe(b, a).is_none() {
                network.add_bidirectional_pipe(a, b, rng.gen_range(5..30) as f64)?;
            }
        }

        Ok(network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::sensitivity::probe_location_failure;
    use crate::flow::aggregate::compute_aggregate_flow;
    use approx::assert_relative_eq;

    #[test]
    fn test_same_seed_same_network() {
        let a = RandomScenario::new(3).build().unwrap();
        let b = RandomScenario::new(3).build().unwrap();
        assert_eq!(a.pipe_count(), b.pipe_count());
        let caps = |n: &Network| n.pipes().map(|p| p.capacity()).collect::<Vec<_>>();
        assert_eq!(caps(&a), caps(&b));
    }

    #[test]
    fn test_every_city_has_a_feeder() {
        let network = RandomScenario::new(11).build().unwrap();
        for city in network.demand_points() {
            assert!(!network.incoming(city.id()).is_empty(), "{}", city.code());
        }
    }

    #[test]
    fn test_station_probes_restore_random_network() {
        for seed in 0..5 {
            let mut network = RandomScenario::with_size(seed, 3, 6, 8).build().unwrap();
            let baseline = compute_aggregate_flow(&mut network).unwrap();
            for i in 1..=6 {
                let report =
                    probe_location_failure(&mut network, &baseline, &format!("PS_{}", i))
                        .unwrap()
                        .unwrap();
                assert!(report.affected().iter().all(|a| a.new_flow() < a.old_flow()));
            }
            assert!(network.is_pristine());
            let after = compute_aggregate_flow(&mut network).unwrap();
            assert_relative_eq!(baseline.total(), after.total(), epsilon = 1e-9);
        }
    }
}
