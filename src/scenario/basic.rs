use crate::error::Result;
use crate::graph::location::LocationKind;
use crate::graph::network::Network;
use crate::scenario::scenario::Scenario;

/// Two reservoirs feeding three cities through a pair of pumping stations.
pub struct BasicScenario;

impl Scenario for BasicScenario {
    fn name(&self) -> &str {
        "basic"
    }

    fn build(&self) -> Result<Network> {
        let mut network = Network::new();

        let reservoirs = [
            ("R_1", 1, "Lake Alto", "Serra", 80.0),
            ("R_2", 2, "Dam Baixo", "Vale", 40.0),
        ];
        for (code, number, name, municipality, max_delivery) in reservoirs {
            network.add_location(
                code,
                number,
                name,
                LocationKind::Supply {
                    max_delivery,
                    municipality: municipality.into(),
                },
            )?;
        }

        for (code, number) in [("PS_1", 1), ("PS_2", 2)] {
            network.add_location(code, number, code, LocationKind::Relay)?;
        }

        let cities = [
            ("C_1", 1, "Porto", 50.0, 230_000.0),
            ("C_2", 2, "Braga", 30.0, 190_000.0),
            ("C_3", 3, "Aveiro", 35.0, 80_000.0),
        ];
        for (code, number, name, demand, population) in cities {
            network.add_location(
                code,
                number,
                name,
                LocationKind::Demand { demand, population },
            )?;
        }

        let pipes = [
            ("R_1", "PS_1", 60.0),
            ("R_1", "PS_2", 30.0),
            ("R_2", "PS_2", 40.0),
            ("PS_1", "C_1", 45.0),
            ("PS_1", "C_3", 10.0),
            ("PS_2", "C_2", 30.0),
            ("PS_2", "C_3", 25.0),
        ];
        for (from, to, capacity) in pipes {
            network.add_pipe(from, to, capacity)?;
        }
        network.add_bidirectional_pipe("PS_1", "PS_2", 15.0)?;

        Ok(network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::aggregate::{compute_aggregate_flow, compute_deficits};
    use approx::assert_relative_eq;

    #[test]
    fn test_basic_network_flow() {
        let mut network = BasicScenario.build().unwrap();
        assert_eq!(7, network.location_count());
        assert_eq!(9, network.pipe_count());

        let flows = compute_aggregate_flow(&mut network).unwrap();
        assert_relative_eq!(110.0, flows.total());

        let deficits = compute_deficits(&network, &flows);
        assert_eq!(1, deficits.len());
        assert_eq!("Porto", deficits[0].name);
        assert_relative_eq!(5.0, deficits[0].deficit);
    }
}
