//! Maximum sustainable water flow through a capacitated pipe network, and
//! what-if analysis of reservoir, pumping station and pipe failures.

pub mod analysis;
pub mod error;
pub mod flow;
pub mod graph;
pub mod scenario;
pub mod simulation;
pub mod tui;
