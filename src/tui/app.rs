use crate::analysis::report::{EssentialPipe, ProbeReport};
use crate::analysis::sensitivity::{essential_pipes_for, probe_location_failure};
use crate::error::Result;
use crate::flow::aggregate::{Deficit, FlowMap, compute_aggregate_flow, compute_deficits};
use crate::graph::location::{Location, LocationId, LocationKind};
use crate::graph::network::Network;
use ratatui::widgets::TableState;

/// What the bottom panel currently shows.
pub enum Panel {
    Help,
    Deficits(Vec<Deficit>),
    Probe(ProbeReport),
    Essential {
        city: String,
        pipes: Vec<EssentialPipe>,
    },
    Error(String),
}

pub struct App {
    network: Network,
    baseline: FlowMap,
    rows: Vec<LocationId>,
    pub table_state: TableState,
    pub running: bool,
    panel: Panel,
}

impl App {
    pub fn new(network: Network, baseline: FlowMap) -> Self {
        let rows = network
            .locations()
            .filter(|l| !l.is_virtual())
            .map(|l| l.id())
            .collect::<Vec<_>>();
        let mut table_state = TableState::default();
        if !rows.is_empty() {
            table_state.select(Some(0));
        }
        Self {
            network,
            baseline,
            rows,
            table_state,
            running: true,
            panel: Panel::Help,
        }
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn baseline(&self) -> &FlowMap {
        &self.baseline
    }

    pub fn rows(&self) -> &[LocationId] {
        &self.rows
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn total_demand(&self) -> f64 {
        self.network
            .demand_points()
            .filter_map(Location::demand)
            .sum()
    }

    pub fn selected(&self) -> Option<&Location> {
        self.table_state
            .selected()
            .and_then(|i| self.rows.get(i))
            .map(|id| self.network.location(*id))
    }

    pub fn next(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let i = self
            .table_state
            .selected()
            .map_or(0, |i| (i + 1) % self.rows.len());
        self.table_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let i = self
            .table_state
            .selected()
            .map_or(0, |i| (i + self.rows.len() - 1) % self.rows.len());
        self.table_state.select(Some(i));
    }

    pub fn show_deficits(&mut self) {
        self.panel = Panel::Deficits(compute_deficits(&self.network, &self.baseline));
    }

    pub fn show_help(&mut self) {
        self.panel = Panel::Help;
    }

    /// Probes the selected reservoir or station, or sweeps the essential
    /// pipes of the selected city. Pipe flows are solved again afterwards so
    /// they match the baseline shown in the table.
    pub fn activate(&mut self) {
        let Some((code, is_city)) = self
            .selected()
            .map(|l| (l.code().to_string(), matches!(l.kind(), LocationKind::Demand { .. })))
        else {
            return;
        };

        self.panel = match self.run_probe(code, is_city) {
            Ok(panel) => panel,
            Err(e) => Panel::Error(e.to_string()),
        };
    }

    fn run_probe(&mut self, code: String, is_city: bool) -> Result<Panel> {
        let found = if is_city {
            essential_pipes_for(&mut self.network, &self.baseline, &code)?
                .map(|pipes| Panel::Essential { city: code.clone(), pipes })
        } else {
            probe_location_failure(&mut self.network, &self.baseline, &code)?.map(Panel::Probe)
        };
        self.baseline = compute_aggregate_flow(&mut self.network)?;
        Ok(found.unwrap_or_else(|| Panel::Error(format!("{} is no longer in the network", code))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::aggregate::compute_aggregate_flow;
    use crate::scenario::basic::BasicScenario;
    use crate::scenario::scenario::Scenario;

    fn app() -> App {
        let mut network = BasicScenario.build().unwrap();
        let baseline = compute_aggregate_flow(&mut network).unwrap();
        App::new(network, baseline)
    }

    fn select(app: &mut App, code: &str) {
        while app.selected().unwrap().code() != code {
            app.next();
        }
    }

    #[test]
    fn test_selection_wraps() {
        let mut app = app();
        assert_eq!("R_1", app.selected().unwrap().code());
        app.previous();
        assert_eq!(app.rows().len() - 1, app.table_state.selected().unwrap());
        app.next();
        assert_eq!(Some(0), app.table_state.selected());
    }

    #[test]
    fn test_activate_on_city_runs_essential_sweep() {
        let mut app = app();
        select(&mut app, "C_1");
        app.activate();
        match app.panel() {
            Panel::Essential { city, pipes } => {
                assert_eq!("C_1", city);
                assert!(pipes.iter().any(|p| p.to() == "C_1"));
            }
            _ => panic!("expected essential pipes"),
        }
        assert!(app.network().is_pristine());
    }

    #[test]
    fn test_activate_on_reservoir_runs_probe() {
        let mut app = app();
        select(&mut app, "R_1");
        app.activate();
        match app.panel() {
            Panel::Probe(report) => assert!(report.has_effect()),
            _ => panic!("expected probe report"),
        }
        app.show_deficits();
        assert!(matches!(app.panel(), Panel::Deficits(d) if d.len() == 1));
    }

    #[test]
    fn test_pipe_flows_match_baseline_after_activate() {
        let mut app = app();
        let flows = |app: &App| app.network().pipes().map(|p| p.flow()).collect::<Vec<_>>();
        let before = flows(&app);
        let total = app.baseline().total();

        select(&mut app, "PS_1");
        app.activate();
        assert!(matches!(app.panel(), Panel::Probe(_)));
        assert_eq!(before, flows(&app));
        assert_eq!(total, app.baseline().total());
    }
}
