use crate::graph::location::LocationId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PipeId(pub usize);

impl PipeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
pub struct Pipe {
    id: PipeId,
    from: LocationId,
    to: LocationId,
    /// capacity >= 0.0, zeroed while a failure is simulated
    capacity: f64,
    original_capacity: f64,
    /// 0.0 <= flow <= capacity after a completed max-flow run
    flow: f64,
    reverse: Option<PipeId>,
}

impl Pipe {
    pub fn new(id: PipeId, from: LocationId, to: LocationId, capacity: f64) -> Self {
        Self {
            id,
            from,
            to,
            capacity,
            original_capacity: capacity,
            flow: 0.0,
            reverse: None,
        }
    }

    pub fn id(&self) -> PipeId {
        self.id
    }

    pub fn from(&self) -> LocationId {
        self.from
    }

    pub fn to(&self) -> LocationId {
        self.to
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn original_capacity(&self) -> f64 {
        self.original_capacity
    }

    pub fn flow(&self) -> f64 {
        self.flow
    }

    /// Paired pipe in the opposite direction, for bidirectional pipes.
    pub fn reverse(&self) -> Option<PipeId> {
        self.reverse
    }

    pub fn residual(&self) -> f64 {
        self.capacity - self.flow
    }

    pub(crate) fn set_capacity(&mut self, capacity: f64) {
        self.capacity = capacity;
    }

    pub(crate) fn set_flow(&mut self, flow: f64) {
        self.flow = flow;
    }

    pub(crate) fn set_reverse(&mut self, reverse: Option<PipeId>) {
        self.reverse = reverse;
    }
}
