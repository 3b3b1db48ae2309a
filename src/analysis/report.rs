/// Demand point whose supply got worse under a simulated failure.
#[derive(Clone, Debug, PartialEq)]
pub struct AffectedPoint {
    code: String,
    name: String,
    old_flow: f64,
    new_flow: f64,
    old_deficit: f64,
    new_deficit: f64,
}

impl AffectedPoint {
    pub fn new(
        code: String,
        name: String,
        old_flow: f64,
        new_flow: f64,
        old_deficit: f64,
        new_deficit: f64,
    ) -> Self {
        Self {
            code,
            name,
            old_flow,
            new_flow,
            old_deficit,
            new_deficit,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn old_flow(&self) -> f64 {
        self.old_flow
    }

    pub fn new_flow(&self) -> f64 {
        self.new_flow
    }

    pub fn old_deficit(&self) -> f64 {
        self.old_deficit
    }

    pub fn new_deficit(&self) -> f64 {
        self.new_deficit
    }

    /// Flow lost, always positive for a reported point.
    pub fn delta(&self) -> f64 {
        self.old_flow - self.new_flow
    }
}

/// Pipe without which a demand point receives strictly less water.
#[derive(Clone, Debug, PartialEq)]
pub struct EssentialPipe {
    from: String,
    to: String,
    old_deficit: f64,
    new_deficit: f64,
    delta: f64,
}

impl EssentialPipe {
    pub fn new(from: String, to: String, old_deficit: f64, new_deficit: f64, delta: f64) -> Self {
        Self {
            from,
            to,
            old_deficit,
            new_deficit,
            delta,
        }
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn old_deficit(&self) -> f64 {
        self.old_deficit
    }

    pub fn new_deficit(&self) -> f64 {
        self.new_deficit
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FailedComponent {
    Reservoir(String),
    PumpingStation(String),
    City(String),
    Pipes(Vec<(String, String)>),
}

impl FailedComponent {
    pub fn describe(&self) -> String {
        match self {
            FailedComponent::Reservoir(code) => format!("out of commission reservoir {}", code),
            FailedComponent::PumpingStation(code) => {
                format!("out of service pumping station {}", code)
            }
            FailedComponent::City(code) => format!("disconnected city {}", code),
            FailedComponent::Pipes(pipes) if pipes.len() == 1 => {
                format!("ruptured pipe {} -> {}", pipes[0].0, pipes[0].1)
            }
            FailedComponent::Pipes(pipes) => format!("{} ruptured pipes", pipes.len()),
        }
    }
}

/// Outcome of one failure probe.
#[derive(Clone, Debug, PartialEq)]
pub struct ProbeReport {
    component: FailedComponent,
    affected: Vec<AffectedPoint>,
}

impl ProbeReport {
    pub fn new(component: FailedComponent, affected: Vec<AffectedPoint>) -> Self {
        Self {
            component,
            affected,
        }
    }

    pub fn component(&self) -> &FailedComponent {
        &self.component
    }

    pub fn affected(&self) -> &[AffectedPoint] {
        &self.affected
    }

    pub fn has_effect(&self) -> bool {
        !self.affected.is_empty()
    }

    pub fn summary(&self) -> String {
        if self.has_effect() {
            format!(
                "The {} affects {} cities.",
                self.component.describe(),
                self.affected.len()
            )
        } else {
            format!(
                "The {} had no effect on the network.",
                self.component.describe()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_wording() {
        let quiet = ProbeReport::new(
            FailedComponent::Pipes(vec![("A".into(), "B".into())]),
            Vec::new(),
        );
        assert_eq!(
            "The ruptured pipe A -> B had no effect on the network.",
            quiet.summary()
        );

        let point = AffectedPoint::new("C_1".into(), "Porto".into(), 20.0, 5.0, 0.0, 15.0);
        let loud = ProbeReport::new(FailedComponent::Reservoir("R_1".into()), vec![point]);
        assert!(loud.has_effect());
        assert_eq!(15.0, loud.affected()[0].delta());
        assert_eq!(
            "The out of commission reservoir R_1 affects 1 cities.",
            loud.summary()
        );
    }
}
