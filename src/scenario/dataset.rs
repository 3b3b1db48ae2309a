//! CSV dataset of a water supply network.
//!
//! A dataset directory holds four files with a header row each:
//!
//! | file            | columns                                               |
//! |-----------------|-------------------------------------------------------|
//! | `Cities.csv`    | `City,Id,Code,Demand,Population`                      |
//! | `Reservoir.csv` | `Reservoir,Municipality,Id,Code,Maximum Delivery`     |
//! | `Stations.csv`  | `Id,Code`                                             |
//! | `Pipes.csv`     | `Service_Point_A,Service_Point_B,Capacity,Direction`  |
//!
//! A pipe with direction `1` is one-way, any other value makes it a
//! bidirectional pair. Quoted fields may contain commas, and `""` inside
//! a quoted field stands for one double quote.

use crate::error::{Result, SupplyError};
use crate::flow::aggregate::FlowMap;
use crate::graph::location::LocationKind;
use crate::graph::network::Network;
use crate::scenario::scenario::Scenario;
use log::{info, warn};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const CITIES: &str = "Cities.csv";
pub const RESERVOIRS: &str = "Reservoir.csv";
pub const STATIONS: &str = "Stations.csv";
pub const PIPES: &str = "Pipes.csv";

pub struct Dataset {
    dir: PathBuf,
}

impl Dataset {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

struct Record<'a> {
    file: &'a str,
    line: usize,
    fields: Vec<String>,
}

impl Record<'_> {
    fn error(&self, reason: impl Into<String>) -> SupplyError {
        SupplyError::Parse {
            file: self.file.to_string(),
            line: self.line,
            reason: reason.into(),
        }
    }

    fn text(&self, column: usize) -> Result<&str> {
        self.fields
            .get(column)
            .map(String::as_str)
            .ok_or_else(|| self.error(format!("missing column {}", column + 1)))
    }

    fn number(&self, column: usize) -> Result<f64> {
        let raw = self.text(column)?;
        raw.replace(',', "")
            .trim()
            .parse::<f64>()
            .map_err(|_| self.error(format!("not a number: {:?}", raw)))
    }

    fn id(&self, column: usize) -> Result<u32> {
        let raw = self.text(column)?;
        raw.trim()
            .parse::<u32>()
            .map_err(|_| self.error(format!("not an id: {:?}", raw)))
    }
}

/// Splits one CSV line, honouring double quotes.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                chars.next();
                current.push('"');
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

fn read_records<'a>(dir: &Path, file: &'a str) -> Result<Vec<Record<'a>>> {
    let content = fs::read_to_string(dir.join(file))?;
    let records = content
        .lines()
        .enumerate()
        .skip(1)
        .map(|(i, line)| Record {
            file,
            line: i + 1,
            fields: split_fields(line.trim_end_matches('\r')),
        })
        .filter(|r| {
            let blank = r.fields.iter().all(String::is_empty);
            if blank && r.fields.len() > 1 {
                warn!("{}:{}: skipping empty row", r.file, r.line);
            }
            !blank
        })
        .collect();
    Ok(records)
}

impl Scenario for Dataset {
    fn name(&self) -> &str {
        "dataset"
    }

    fn build(&self) -> Result<Network> {
        let mut network = Network::new();

        let cities = read_records(&self.dir, CITIES)?;
        for r in &cities {
            network.add_location(
                r.text(2)?,
                r.id(1)?,
                r.text(0)?,
                LocationKind::Demand {
                    demand: r.number(3)?,
                    population: r.number(4)?,
                },
            )?;
        }

        let reservoirs = read_records(&self.dir, RESERVOIRS)?;
        for r in &reservoirs {
            network.add_location(
                r.text(3)?,
                r.id(2)?,
                r.text(0)?,
                LocationKind::Supply {
                    max_delivery: r.number(4)?,
                    municipality: r.text(1)?.to_string(),
                },
            )?;
        }

        let stations = read_records(&self.dir, STATIONS)?;
        for r in &stations {
            let code = r.text(1)?;
            network.add_location(code, r.id(0)?, code, LocationKind::Relay)?;
        }

        let pipes = read_records(&self.dir, PIPES)?;
        for r in &pipes {
            let (from, to, capacity) = (r.text(0)?, r.text(1)?, r.number(2)?);
            if r.text(3)? == "1" {
                network.add_pipe(from, to, capacity)?;
            } else {
                network.add_bidirectional_pipe(from, to, capacity)?;
            }
        }

        info!(
            "loaded {} reservoirs, {} pumping stations, {} cities and {} pipes from {}",
            reservoirs.len(),
            stations.len(),
            cities.len(),
            network.pipe_count(),
            self.dir.display()
        );
        Ok(network)
    }
}

/// Writes `CityCode,Value` rows for every demand point.
pub fn write_flow_csv(path: &Path, flows: &FlowMap) -> Result<()> {
    let mut file = fs::File::create(path)?;
    writeln!(file, "CityCode,Value")?;
    for (_, entry) in flows.iter() {
        writeln!(file, "{},{}", entry.code(), entry.flow())?;
    }
    info!("wrote {} rows to {}", flows.len(), path.display());
    Ok(())
}

/// Parses `A,B;C,D` into pipe endpoints.
pub fn parse_pipe_list(input: &str) -> Result<Vec<(String, String)>> {
    input
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .enumerate()
        .map(|(i, pair)| match pair.split_once(',') {
            Some((from, to)) if !from.trim().is_empty() && !to.trim().is_empty() => {
                Ok((from.trim().to_string(), to.trim().to_string()))
            }
            _ => Err(SupplyError::Parse {
                file: "pipe list".to_string(),
                line: i + 1,
                reason: format!("expected ORIGIN,DESTINATION, got {:?}", pair),
            }),
        })
        .collect()
}
