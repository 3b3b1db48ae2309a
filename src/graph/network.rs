use crate::error::{Result, SupplyError};
use crate::graph::location::{Location, LocationId, LocationKind};
use crate::graph::pipe::{Pipe, PipeId};
use std::collections::HashMap;

/// Locations and pipes of a water supply network.
///
/// Both live in arenas addressed by [`LocationId`] and [`PipeId`]. Removed
/// entries leave an empty slot, and a slot that ever held a pipe added
/// through [`Network::add_pipe`] is never handed out again, so a stale
/// handle can only refer to nothing. Only the slots of temporary pipes
/// above `pipe_floor` are reclaimed, which keeps the arena from growing
/// across repeated aggregate flow computations.
///
/// Virtual locations live in their own index, apart from the codes of
/// real locations, so any code is free for a real location.
#[derive(Clone, Debug, Default)]
pub struct Network {
    locations: Vec<Option<Location>>,
    pipes: Vec<Option<Pipe>>,
    outgoing: Vec<Vec<PipeId>>,
    incoming: Vec<Vec<PipeId>>,
    index: HashMap<String, LocationId>,
    virtuals: HashMap<String, LocationId>,
    pipe_floor: usize,
}

fn check_amount(code: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SupplyError::InvalidDelivery {
            code: code.to_string(),
            value,
        })
    }
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_location(
        &mut self,
        code: impl Into<String>,
        number: u32,
        name: impl Into<String>,
        kind: LocationKind,
    ) -> Result<LocationId> {
        let code = code.into();
        if self.index.contains_key(&code) {
            return Err(SupplyError::DuplicateLocation(code));
        }
        match &kind {
            LocationKind::Supply { max_delivery, .. } => check_amount(&code, *max_delivery)?,
            LocationKind::Demand { demand, population } => {
                check_amount(&code, *demand)?;
                check_amount(&code, *population)?;
            }
            LocationKind::Relay | LocationKind::Virtual => {}
        }

        let id = LocationId(self.locations.len());
        self.index.insert(code.clone(), id);
        self.locations
            .push(Some(Location::new(id, code, number, name, kind)));
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        Ok(id)
    }

    /// Returns the virtual location with `code`, creating it if needed.
    /// Real locations sharing the code are left alone.
    pub(crate) fn ensure_virtual(&mut self, code: &str) -> LocationId {
        match self.virtuals.get(code) {
            Some(id) => *id,
            None => {
                let id = LocationId(self.locations.len());
                self.virtuals.insert(code.to_string(), id);
                self.locations.push(Some(Location::new(
                    id,
                    code,
                    0,
                    code,
                    LocationKind::Virtual,
                )));
                self.outgoing.push(Vec::new());
                self.incoming.push(Vec::new());
                id
            }
        }
    }

    /// Removes a location together with every pipe touching it.
    pub fn remove_location(&mut self, code: &str) -> Result<()> {
        let id = self
            .location_id(code)
            .ok_or_else(|| SupplyError::UnknownLocation(code.to_string()))?;
        let incident = self.outgoing[id.index()]
            .iter()
            .chain(self.incoming[id.index()].iter())
            .copied()
            .collect::<Vec<PipeId>>();
        incident.into_iter().for_each(|p| self.detach_pipe(p));
        self.index.remove(code);
        self.locations[id.index()] = None;
        Ok(())
    }

    pub fn add_pipe(&mut self, from: &str, to: &str, capacity: f64) -> Result<PipeId> {
        let (f, t) = self.endpoints(from, to)?;
        if !capacity.is_finite() || capacity < 0.0 {
            return Err(SupplyError::InvalidCapacity {
                from: from.to_string(),
                to: to.to_string(),
                capacity,
            });
        }
        let id = self.attach_pipe(f, t, capacity);
        self.pipe_floor = self.pipes.len();
        Ok(id)
    }

    /// Adds two opposite pipes of equal capacity that know about each other.
    pub fn add_bidirectional_pipe(
        &mut self,
        a: &str,
        b: &str,
        capacity: f64,
    ) -> Result<(PipeId, PipeId)> {
        let forward = self.add_pipe(a, b, capacity)?;
        let backward = self.add_pipe(b, a, capacity)?;
        self.pipe_mut(forward).set_reverse(Some(backward));
        self.pipe_mut(backward).set_reverse(Some(forward));
        Ok((forward, backward))
    }

    pub(crate) fn attach_pipe(&mut self, from: LocationId, to: LocationId, capacity: f64) -> PipeId {
        let id = PipeId(self.pipes.len());
        self.pipes.push(Some(Pipe::new(id, from, to, capacity)));
        self.outgoing[from.index()].push(id);
        self.incoming[to.index()].push(id);
        id
    }

    /// Removes the pipe `from -> to`. Its reverse partner, if any, stays
    /// but is no longer paired.
    pub fn remove_pipe(&mut self, from: &str, to: &str) -> Result<()> {
        let id = self.find_pipe(from, to).ok_or_else(|| SupplyError::UnknownPipe {
            from: from.to_string(),
            to: to.to_string(),
        })?;
        self.detach_pipe(id);
        Ok(())
    }

    pub(crate) fn detach_pipe(&mut self, id: PipeId) {
        let Some(pipe) = self.pipes.get_mut(id.index()).and_then(Option::take) else {
            return;
        };
        self.outgoing[pipe.from().index()].retain(|p| *p != id);
        self.incoming[pipe.to().index()].retain(|p| *p != id);
        if let Some(partner) = pipe
            .reverse()
            .and_then(|r| self.pipes.get_mut(r.index()))
            .and_then(Option::as_mut)
        {
            partner.set_reverse(None);
        }
        while self.pipes.len() > self.pipe_floor && matches!(self.pipes.last(), Some(None)) {
            self.pipes.pop();
        }
    }

    fn endpoints(&self, from: &str, to: &str) -> Result<(LocationId, LocationId)> {
        let f = self
            .location_id(from)
            .ok_or_else(|| SupplyError::UnknownLocation(from.to_string()))?;
        let t = self
            .location_id(to)
            .ok_or_else(|| SupplyError::UnknownLocation(to.to_string()))?;
        Ok((f, t))
    }

    pub fn location_id(&self, code: &str) -> Option<LocationId> {
        self.index.get(code).copied()
    }

    pub fn virtual_location(&self, code: &str) -> Option<LocationId> {
        self.virtuals.get(code).copied()
    }

    pub fn find_location(&self, code: &str) -> Option<&Location> {
        self.location_id(code).map(|id| self.location(id))
    }

    /// Resolves a location by code, falling back to its display name.
    pub fn resolve(&self, code_or_name: &str) -> Option<&Location> {
        self.find_location(code_or_name)
            .or_else(|| {
                self.locations()
                    .find(|l| !l.is_virtual() && l.name() == code_or_name)
            })
    }

    pub fn get_location(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(id.index()).and_then(Option::as_ref)
    }

    pub fn location(&self, id: LocationId) -> &Location {
        self.locations[id.index()]
            .as_ref()
            .expect("location handle refers to a removed location")
    }

    pub fn find_pipe(&self, from: &str, to: &str) -> Option<PipeId> {
        let (f, t) = self.endpoints(from, to).ok()?;
        self.outgoing[f.index()]
            .iter()
            .copied()
            .find(|p| self.pipe(*p).to() == t)
    }

    pub fn pipe(&self, id: PipeId) -> &Pipe {
        self.pipes[id.index()]
            .as_ref()
            .expect("pipe handle refers to a removed pipe")
    }

    pub(crate) fn pipe_mut(&mut self, id: PipeId) -> &mut Pipe {
        self.pipes[id.index()]
            .as_mut()
            .expect("pipe handle refers to a removed pipe")
    }

    pub(crate) fn try_pipe_mut(&mut self, id: PipeId) -> Option<&mut Pipe> {
        self.pipes.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn outgoing(&self, id: LocationId) -> &[PipeId] {
        &self.outgoing[id.index()]
    }

    pub fn incoming(&self, id: LocationId) -> &[PipeId] {
        &self.incoming[id.index()]
    }

    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter().flatten()
    }

    pub fn pipes(&self) -> impl Iterator<Item = &Pipe> {
        self.pipes.iter().flatten()
    }

    pub fn pipe_ids(&self) -> Vec<PipeId> {
        self.pipes().map(|p| p.id()).collect()
    }

    /// Upper bound on location indices, including removed slots.
    pub fn location_slots(&self) -> usize {
        self.locations.len()
    }

    pub fn location_count(&self) -> usize {
        self.locations().filter(|l| !l.is_virtual()).count()
    }

    pub fn pipe_count(&self) -> usize {
        self.pipes().count()
    }

    pub fn demand_points(&self) -> impl Iterator<Item = &Location> {
        self.locations()
            .filter(|l| matches!(l.kind(), LocationKind::Demand { .. }))
    }

    /// Sets the capacity of `from -> to` and of its reverse partner.
    pub fn set_capacity(&mut self, from: &str, to: &str, capacity: f64) -> Result<()> {
        let id = self.find_pipe(from, to).ok_or_else(|| SupplyError::UnknownPipe {
            from: from.to_string(),
            to: to.to_string(),
        })?;
        if !capacity.is_finite() || capacity < 0.0 {
            return Err(SupplyError::InvalidCapacity {
                from: from.to_string(),
                to: to.to_string(),
                capacity,
            });
        }
        self.pipe_mut(id).set_capacity(capacity);
        if let Some(r) = self.pipe(id).reverse() {
            self.pipe_mut(r).set_capacity(capacity);
        }
        Ok(())
    }

    pub fn restore_capacities(&mut self) {
        self.pipes.iter_mut().flatten().for_each(|p| {
            let original = p.original_capacity();
            p.set_capacity(original);
        });
    }

    /// True when every pipe runs at its original capacity.
    pub fn is_pristine(&self) -> bool {
        self.pipes().all(|p| p.capacity() == p.original_capacity())
    }

    pub(crate) fn reset_flows(&mut self) {
        self.pipes.iter_mut().flatten().for_each(|p| p.set_flow(0.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn town() -> Network {
        let mut network = Network::new();
        network
            .add_location(
                "R_1",
                1,
                "Lake",
                LocationKind::Supply {
                    max_delivery: 50.0,
                    municipality: "Hill".into(),
                },
            )
            .unwrap();
        network
            .add_location("PS_1", 1, "PS_1", LocationKind::Relay)
            .unwrap();
        network
            .add_location(
                "C_1",
                1,
                "Porto",
                LocationKind::Demand {
                    demand: 20.0,
                    population: 1000.0,
                },
            )
            .unwrap();
        network.add_pipe("R_1", "PS_1", 50.0).unwrap();
        network.add_bidirectional_pipe("PS_1", "C_1", 20.0).unwrap();
        network
    }

    #[test]
    fn test_lookup_returns_same_identity() {
        let network = town();
        let a = network.find_location("PS_1").unwrap().id();
        let b = network.find_location("PS_1").unwrap().id();
        assert_eq!(a, b);
        assert!(network.find_location("PS_9").is_none());
        assert_eq!("C_1", network.resolve("Porto").unwrap().code());
    }

    #[test]
    fn test_pipe_to_unknown_location_is_rejected() {
        let mut network = town();
        assert!(matches!(
            network.add_pipe("R_1", "C_9", 10.0),
            Err(SupplyError::UnknownLocation(code)) if code == "C_9"
        ));
        assert_eq!(3, network.pipe_count());
    }

    #[test]
    fn test_negative_capacity_is_rejected() {
        let mut network = town();
        assert!(matches!(
            network.add_pipe("R_1", "C_1", -1.0),
            Err(SupplyError::InvalidCapacity { .. })
        ));
        assert!(matches!(
            network.add_location(
                "C_2",
                2,
                "Braga",
                LocationKind::Demand {
                    demand: -5.0,
                    population: 0.0
                }
            ),
            Err(SupplyError::InvalidDelivery { .. })
        ));
    }

    #[test]
    fn test_duplicate_location_is_rejected() {
        let mut network = town();
        assert!(matches!(
            network.add_location("PS_1", 2, "PS_1", LocationKind::Relay),
            Err(SupplyError::DuplicateLocation(_))
        ));
    }

    #[test]
    fn test_bidirectional_capacity_edit_touches_both() {
        let mut network = town();
        network.set_capacity("C_1", "PS_1", 5.0).unwrap();
        let forward = network.find_pipe("PS_1", "C_1").unwrap();
        let backward = network.find_pipe("C_1", "PS_1").unwrap();
        assert_eq!(5.0, network.pipe(forward).capacity());
        assert_eq!(5.0, network.pipe(backward).capacity());
        assert!(!network.is_pristine());

        network.restore_capacities();
        assert!(network.is_pristine());
        assert_eq!(20.0, network.pipe(forward).capacity());
    }

    #[test]
    fn test_remove_pipe_unpairs_reverse() {
        let mut network = town();
        network.remove_pipe("PS_1", "C_1").unwrap();
        let backward = network.find_pipe("C_1", "PS_1").unwrap();
        assert_eq!(None, network.pipe(backward).reverse());
        assert!(network.find_pipe("PS_1", "C_1").is_none());
        assert!(network.remove_pipe("PS_1", "C_1").is_err());
    }

    #[test]
    fn test_remove_location_drops_incident_pipes() {
        let mut network = town();
        network.remove_location("PS_1").unwrap();
        assert_eq!(0, network.pipe_count());
        assert_eq!(2, network.location_count());
        assert!(network.find_location("PS_1").is_none());
        let lake = network.find_location("R_1").unwrap().id();
        assert!(network.outgoing(lake).is_empty());
    }

    #[test]
    fn test_removed_pipe_id_is_not_reused() {
        let mut network = town();
        let last = network.find_pipe("C_1", "PS_1").unwrap();
        network.remove_pipe("C_1", "PS_1").unwrap();
        let added = network.add_pipe("R_1", "C_1", 5.0).unwrap();

        assert_ne!(last, added);
        assert!(network.try_pipe_mut(last).is_none());
        assert_eq!(3, network.pipe_count());
    }

    #[test]
    fn test_virtual_code_does_not_shadow_real_location() {
        let mut network = town();
        let sink = network.ensure_virtual("C_1");
        let city = network.location_id("C_1").unwrap();

        assert_ne!(sink, city);
        assert_eq!(Some(sink), network.virtual_location("C_1"));
        assert_eq!("Porto", network.find_location("C_1").unwrap().name());
        assert!(network.resolve("C_1").is_some_and(|l| !l.is_virtual()));
        assert_eq!(3, network.location_count());
    }

    #[test]
    fn test_trailing_pipe_slots_are_reclaimed() {
        let mut network = town();
        let sink = network.ensure_virtual("SINK");
        let city = network.location_id("C_1").unwrap();
        let before = network.pipes.len();
        let temp = network.attach_pipe(city, sink, 20.0);
        network.detach_pipe(temp);
        assert_eq!(before, network.pipes.len());
        assert_eq!(sink, network.ensure_virtual("SINK"));
    }
}
