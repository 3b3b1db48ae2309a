use clap::{Parser, Subcommand, ValueEnum};
use crossterm::event::{Event, KeyCode, KeyEventKind};
use log::{error, info, warn};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use supplygraph::analysis::report::ProbeReport;
use supplygraph::analysis::sensitivity::{
    essential_pipes_for, probe_location_failure, probe_pipe_failure,
};
use supplygraph::error::Result;
use supplygraph::flow::aggregate::{FlowMap, compute_aggregate_flow, compute_deficits, lookup_flow};
use supplygraph::graph::network::Network;
use supplygraph::scenario::basic::BasicScenario;
use supplygraph::scenario::dataset::{Dataset, parse_pipe_list, write_flow_csv};
use supplygraph::scenario::random::RandomScenario;
use supplygraph::scenario::scenario::Scenario;
use supplygraph::tui::app::App;
use supplygraph::tui::draw::draw_app;

#[derive(Parser, Debug)]
#[command(author, version, about = "Maximum water flow and failure analysis for supply networks")]
struct Opts {
    /// Directory with Cities.csv, Reservoir.csv, Stations.csv and Pipes.csv
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Built-in network used when no data directory is given
    #[arg(long, value_enum, default_value_t = ScenarioKind::Basic)]
    scenario: ScenarioKind,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Write the delivered flow of every city to this CSV file
    #[arg(long)]
    output: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ScenarioKind {
    Basic,
    Random,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Maximum flow reaching every city, or one city by code or name
    Flow { city: Option<String> },
    /// Cities whose demand is not met
    Deficits,
    /// Cities affected when a reservoir or pumping station goes offline
    FailLocation { code: String },
    /// Cities affected by ruptured pipes, given as `A,B;C,D`
    FailPipes { pipes: String },
    /// Pipes whose rupture lowers the supply of a city
    Essential { city: String },
    /// Interactive terminal dashboard
    Dashboard,
}

fn load(opts: &Opts) -> Result<Network> {
    let scenario: Box<dyn Scenario> = match (&opts.data_dir, opts.scenario) {
        (Some(dir), _) => Box::new(Dataset::new(dir)),
        (None, ScenarioKind::Basic) => Box::new(BasicScenario),
        (None, ScenarioKind::Random) => Box::new(RandomScenario::new(opts.seed)),
    };
    let network = scenario.build()?;
    info!(
        "{} network: {} locations, {} pipes",
        scenario.name(),
        network.location_count(),
        network.pipe_count()
    );
    Ok(network)
}

/// Exit code of a query naming a location, pipe or city that does not exist.
const NOT_FOUND: u8 = 2;

fn not_found(what: &str) -> ExitCode {
    warn!("{} not found in the network", what);
    println!("No {} in the network.", what);
    ExitCode::from(NOT_FOUND)
}

fn print_probe(report: &ProbeReport) {
    for a in report.affected() {
        println!(
            "{} | {} | Old Flow: {} | New Flow: {} | Deficit: {}",
            a.code(),
            a.name(),
            a.old_flow(),
            a.new_flow(),
            a.delta()
        );
    }
    println!("{}", report.summary());
}

fn print_flows(flows: &FlowMap) {
    for (_, entry) in flows.iter() {
        println!("{} | {} | {}", entry.code(), entry.name(), entry.flow());
    }
    println!("Sum: {}", flows.total());
}

fn run_dashboard(network: Network, baseline: FlowMap) -> Result<()> {
    let mut terminal = ratatui::init();
    let mut app = App::new(network, baseline);

    let result = (|| -> Result<()> {
        while app.running {
            terminal.draw(|frame| draw_app(frame, &mut app))?;

            if crossterm::event::poll(Duration::from_millis(16))? {
                match crossterm::event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => app.running = false,
                        KeyCode::Down | KeyCode::Char('j') => app.next(),
                        KeyCode::Up | KeyCode::Char('k') => app.previous(),
                        KeyCode::Enter => app.activate(),
                        KeyCode::Char('d') => app.show_deficits(),
                        KeyCode::Char('h') => app.show_help(),
                        _ => continue,
                    },
                    _ => continue,
                }
            }
        }
        Ok(())
    })();

    ratatui::restore();
    result
}

fn run(opts: Opts) -> Result<ExitCode> {
    let mut network = load(&opts)?;
    let baseline = compute_aggregate_flow(&mut network)?;
    info!(
        "baseline: {} delivered to {} cities",
        baseline.total(),
        baseline.len()
    );

    if let Some(path) = &opts.output {
        write_flow_csv(path, &baseline)?;
    }

    match opts.command.unwrap_or(Command::Dashboard) {
        Command::Flow { city: None } => print_flows(&baseline),
        Command::Flow { city: Some(city) } => match lookup_flow(&baseline, &city) {
            Some(flow) => println!("{} | {}", city, flow),
            None => return Ok(not_found(&format!("city {}", city))),
        },
        Command::Deficits => {
            for d in compute_deficits(&network, &baseline) {
                println!(
                    "{} | {} | Demand: {} | Actual Flow: {} | Deficit: {}",
                    d.code, d.name, d.demand, d.flow, d.deficit
                );
            }
        }
        Command::FailLocation { code } => {
            match probe_location_failure(&mut network, &baseline, &code)? {
                Some(report) => print_probe(&report),
                None => return Ok(not_found(&format!("location {}", code))),
            }
        }
        Command::FailPipes { pipes: list } => {
            let pipes = parse_pipe_list(&list)?;
            match probe_pipe_failure(&mut network, &baseline, &pipes)? {
                Some(report) => print_probe(&report),
                None => return Ok(not_found(&format!("pipe among {}", list))),
            }
        }
        Command::Essential { city } => {
            let Some(essential) = essential_pipes_for(&mut network, &baseline, &city)? else {
                return Ok(not_found(&format!("city {}", city)));
            };
            if essential.is_empty() {
                println!("No single pipe is essential to {}.", city);
            }
            for p in essential {
                println!("The pipe from {} to {} is essential to the city.", p.from(), p.to());
                println!(
                    "Old Deficit: {} | New Deficit: {} | Difference: {}",
                    p.old_deficit(),
                    p.new_deficit(),
                    p.delta()
                );
            }
        }
        Command::Dashboard => run_dashboard(network, baseline)?,
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let opts = Opts::parse();
    // Log lines would tear through the dashboard, keep it quiet there.
    let interactive = matches!(opts.command, None | Some(Command::Dashboard));
    let filter = if interactive { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    match run(opts) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
