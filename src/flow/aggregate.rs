//! Flow from every supply point to every demand point at once.
//!
//! A virtual super-source feeds each supply point up to its maximum
//! delivery and each demand point drains into a virtual super-sink up to
//! its demand. One max-flow run over that instance yields the water each
//! city can receive. The virtual pipes are removed before returning; the
//! two virtual locations stay behind as inert placeholders.

use crate::error::Result;
use crate::flow::max_flow::solve;
use crate::flow::search::EPSILON;
use crate::graph::location::{LocationId, LocationKind};
use crate::graph::network::Network;
use crate::graph::pipe::PipeId;
use log::debug;
use std::collections::BTreeMap;

pub const SUPER_SOURCE: &str = "SUPER_SOURCE";
pub const SUPER_SINK: &str = "SUPER_SINK";

#[derive(Clone, Debug, PartialEq)]
pub struct DeliveredFlow {
    code: String,
    name: String,
    flow: f64,
}

impl DeliveredFlow {
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flow(&self) -> f64 {
        self.flow
    }
}

/// Delivered flow per demand point, in demand point order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlowMap {
    entries: BTreeMap<LocationId, DeliveredFlow>,
}

impl FlowMap {
    pub fn get(&self, id: LocationId) -> Option<&DeliveredFlow> {
        self.entries.get(&id)
    }

    /// Delivered flow of `id`, zero when it is not a known demand point.
    pub fn flow(&self, id: LocationId) -> f64 {
        self.get(id).map_or(0.0, DeliveredFlow::flow)
    }

    /// Finds an entry by code, then by display name.
    pub fn lookup(&self, code_or_name: &str) -> Option<&DeliveredFlow> {
        self.entries
            .values()
            .find(|e| e.code == code_or_name)
            .or_else(|| self.entries.values().find(|e| e.name == code_or_name))
    }

    pub fn total(&self) -> f64 {
        self.entries.values().map(DeliveredFlow::flow).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LocationId, &DeliveredFlow)> {
        self.entries.iter().map(|(id, e)| (*id, e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn lookup_flow(flows: &FlowMap, code_or_name: &str) -> Option<f64> {
    flows.lookup(code_or_name).map(DeliveredFlow::flow)
}

pub fn compute_aggregate_flow(network: &mut Network) -> Result<FlowMap> {
    let source = network.ensure_virtual(SUPER_SOURCE);
    let sink = network.ensure_virtual(SUPER_SINK);

    let bindings = network
        .locations()
        .filter_map(|l| match l.kind() {
            LocationKind::Supply { max_delivery, .. } => Some((l.id(), *max_delivery, true)),
            LocationKind::Demand { demand, .. } => Some((l.id(), *demand, false)),
            LocationKind::Relay | LocationKind::Virtual => None,
        })
        .collect::<Vec<_>>();

    let mut virtual_pipes: Vec<PipeId> = Vec::with_capacity(bindings.len());
    let mut drains: Vec<(LocationId, PipeId)> = Vec::new();
    for (id, capacity, is_supply) in bindings {
        if is_supply {
            virtual_pipes.push(network.attach_pipe(source, id, capacity));
        } else {
            let pipe = network.attach_pipe(id, sink, capacity);
            virtual_pipes.push(pipe);
            drains.push((id, pipe));
        }
    }

    let solved = solve(network, source, sink);
    let entries = drains
        .iter()
        .map(|(id, pipe)| {
            let location = network.location(*id);
            let delivered = DeliveredFlow {
                code: location.code().to_string(),
                name: location.name().to_string(),
                flow: network.pipe(*pipe).flow(),
            };
            (*id, delivered)
        })
        .collect::<BTreeMap<_, _>>();

    virtual_pipes
        .iter()
        .rev()
        .for_each(|p| network.detach_pipe(*p));

    let value = solved?;
    debug!(
        "aggregate flow {} over {} demand points",
        value,
        entries.len()
    );
    Ok(FlowMap { entries })
}

#[derive(Clone, Debug, PartialEq)]
pub struct Deficit {
    pub code: String,
    pub name: String,
    pub demand: f64,
    pub flow: f64,
    pub deficit: f64,
}

/// Demand points receiving less than they require.
pub fn compute_deficits(network: &Network, flows: &FlowMap) -> Vec<Deficit> {
    flows
        .iter()
        .filter_map(|(_, entry)| {
            let location = network.find_location(entry.code())?;
            match location.kind() {
                LocationKind::Demand { demand, .. } => {
                    let deficit = demand - entry.flow();
                    (deficit > EPSILON).then(|| Deficit {
                        code: entry.code().to_string(),
                        name: entry.name().to_string(),
                        demand: *demand,
                        flow: entry.flow(),
                        deficit,
                    })
                }
                LocationKind::Supply { .. } | LocationKind::Relay | LocationKind::Virtual => None,
            }
        })
        .collect()
}
