//! What-if analysis: remove a component, recompute, diff, restore.
//!
//! Every probe perturbs capacities through a [`CapacityPerturbation`], runs
//! a full aggregate flow computation and compares each demand point with
//! the baseline. The perturbation is released before the probe returns, so
//! the network is back at its original capacities on every exit path.
//! Pipe flows are left holding the solution of the perturbed run.
//!
//! A component that does not exist yields `Ok(None)`; errors only come from
//! the flow computation itself.

use crate::analysis::report::{AffectedPoint, EssentialPipe, FailedComponent, ProbeReport};
use crate::error::Result;
use crate::flow::aggregate::{FlowMap, compute_aggregate_flow};
use crate::flow::search::EPSILON;
use crate::graph::location::{LocationId, LocationKind};
use crate::graph::network::Network;
use crate::graph::pipe::PipeId;
use crate::simulation::perturbation::CapacityPerturbation;
use log::{debug, info};

fn demand_of(network: &Network, id: LocationId) -> Option<f64> {
    match network.get_location(id)?.kind() {
        LocationKind::Demand { demand, .. } => Some(*demand),
        LocationKind::Supply { .. } | LocationKind::Relay | LocationKind::Virtual => None,
    }
}

/// Demand points whose deficit changed, is still nonzero, and whose flow
/// strictly decreased.
fn diff(network: &Network, baseline: &FlowMap, after: &FlowMap) -> Vec<AffectedPoint> {
    baseline
        .iter()
        .filter_map(|(id, old)| {
            let demand = demand_of(network, id)?;
            let new_flow = after.flow(id);
            let old_deficit = demand - old.flow();
            let new_deficit = demand - new_flow;
            let delta = old.flow() - new_flow;

            let changed = (new_deficit - old_deficit).abs() > EPSILON;
            let short = new_deficit.abs() > EPSILON;
            (changed && short && delta > EPSILON).then(|| {
                AffectedPoint::new(
                    old.code().to_string(),
                    old.name().to_string(),
                    old.flow(),
                    new_flow,
                    old_deficit,
                    new_deficit,
                )
            })
        })
        .collect()
}

/// Simulates the loss of a reservoir or pumping station by closing every
/// pipe leaving it. `None` when no location has `code`.
pub fn probe_location_failure(
    network: &mut Network,
    baseline: &FlowMap,
    code: &str,
) -> Result<Option<ProbeReport>> {
    let Some(location) = network.find_location(code) else {
        debug!("no location {}", code);
        return Ok(None);
    };
    let id = location.id();
    let component = match location.kind() {
        LocationKind::Supply { .. } => FailedComponent::Reservoir(code.to_string()),
        LocationKind::Relay => FailedComponent::PumpingStation(code.to_string()),
        LocationKind::Demand { .. } => FailedComponent::City(code.to_string()),
        LocationKind::Virtual => return Ok(None),
    };

    let mut perturbation = CapacityPerturbation::new(network);
    perturbation.zero_outgoing(id);
    let after = compute_aggregate_flow(perturbation.network())?;
    let affected = diff(perturbation.network(), baseline, &after);
    perturbation.restore();

    let report = ProbeReport::new(component, affected);
    info!("{}", report.summary());
    Ok(Some(report))
}

/// Simulates ruptures of the given pipes, each with its reverse partner.
/// All pipes are resolved before anything is touched; `None` when any of
/// them does not exist.
pub fn probe_pipe_failure(
    network: &mut Network,
    baseline: &FlowMap,
    pipes: &[(String, String)],
) -> Result<Option<ProbeReport>> {
    let Some(ids) = pipes
        .iter()
        .map(|(from, to)| network.find_pipe(from, to))
        .collect::<Option<Vec<PipeId>>>()
    else {
        debug!("unknown pipe among {:?}", pipes);
        return Ok(None);
    };

    let mut perturbation = CapacityPerturbation::new(network);
    ids.into_iter().for_each(|p| perturbation.zero_pipe(p));
    let after = compute_aggregate_flow(perturbation.network())?;
    let affected = diff(perturbation.network(), baseline, &after);
    perturbation.restore();

    let report = ProbeReport::new(FailedComponent::Pipes(pipes.to_vec()), affected);
    info!("{}", report.summary());
    Ok(Some(report))
}

pub fn essential_pipes_for(
    network: &mut Network,
    baseline: &FlowMap,
    city: &str,
) -> Result<Option<Vec<EssentialPipe>>> {
    essential_pipes_with(network, baseline, city, |_, _| true)
}

/// Tries every pipe in turn and keeps those whose rupture lowers the flow
/// reaching `city`. A bidirectional pair is tried once. `on_step` runs after
/// each pipe with `(done, total)`; returning `false` stops the sweep early
/// with the pipes found so far. `None` when `city` names no demand point.
pub fn essential_pipes_with(
    network: &mut Network,
    baseline: &FlowMap,
    city: &str,
    mut on_step: impl FnMut(usize, usize) -> bool,
) -> Result<Option<Vec<EssentialPipe>>> {
    let Some(target) = network.resolve(city) else {
        debug!("no location {}", city);
        return Ok(None);
    };
    let (target_id, target_code) = (target.id(), target.code().to_string());
    let Some(demand) = demand_of(network, target_id) else {
        debug!("{} is not a demand point", target_code);
        return Ok(None);
    };

    let old_flow = baseline.flow(target_id);
    let old_deficit = demand - old_flow;
    let candidates = network
        .pipes()
        .filter(|p| p.reverse().is_none_or(|r| r > p.id()))
        .map(|p| p.id())
        .collect::<Vec<PipeId>>();
    let total = candidates.len();

    let mut essential = Vec::new();
    for (done, pipe) in candidates.into_iter().enumerate() {
        let mut perturbation = CapacityPerturbation::new(network);
        perturbation.zero_pipe(pipe);
        let after = compute_aggregate_flow(perturbation.network())?;
        perturbation.restore();

        let new_flow = after.flow(target_id);
        let delta = old_flow - new_flow;
        if delta > EPSILON {
            let p = network.pipe(pipe);
            let from = network.location(p.from()).code().to_string();
            let to = network.location(p.to()).code().to_string();
            debug!("pipe {} -> {} is essential to {}", from, to, target_code);
            essential.push(EssentialPipe::new(
                from,
                to,
                old_deficit,
                demand - new_flow,
                delta,
            ));
        }

        if !on_step(done + 1, total) {
            info!("essential pipe sweep stopped after {} of {} pipes", done + 1, total);
            break;
        }
    }
    info!("{} essential pipes for {}", essential.len(), target_code);
    Ok(Some(essential))
}
