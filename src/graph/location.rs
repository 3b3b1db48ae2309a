#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocationId(pub usize);

impl LocationId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Role of a location in the supply network.
#[derive(Clone, Debug, PartialEq)]
pub enum LocationKind {
    /// Reservoir delivering at most `max_delivery`.
    Supply {
        max_delivery: f64,
        municipality: String,
    },
    /// Pumping station, only forwards water.
    Relay,
    /// City requiring `demand`.
    Demand { demand: f64, population: f64 },
    /// Super-source or super-sink used by the aggregate flow computation.
    Virtual,
}

impl LocationKind {
    pub fn label(&self) -> &'static str {
        match self {
            LocationKind::Supply { .. } => "supply",
            LocationKind::Relay => "relay",
            LocationKind::Demand { .. } => "demand",
            LocationKind::Virtual => "virtual",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Location {
    id: LocationId,
    code: String,
    number: u32,
    name: String,
    kind: LocationKind,
}

impl Location {
    pub fn new(
        id: LocationId,
        code: impl Into<String>,
        number: u32,
        name: impl Into<String>,
        kind: LocationKind,
    ) -> Self {
        Self {
            id,
            code: code.into(),
            number,
            name: name.into(),
            kind,
        }
    }

    pub fn id(&self) -> LocationId {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Numeric id as declared by the loader. Not guaranteed contiguous.
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &LocationKind {
        &self.kind
    }

    pub fn demand(&self) -> Option<f64> {
        match self.kind {
            LocationKind::Demand { demand, .. } => Some(demand),
            _ => None,
        }
    }

    pub fn max_delivery(&self) -> Option<f64> {
        match self.kind {
            LocationKind::Supply { max_delivery, .. } => Some(max_delivery),
            _ => None,
        }
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self.kind, LocationKind::Virtual)
    }
}
