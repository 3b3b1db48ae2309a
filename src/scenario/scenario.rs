use crate::error::Result;
use crate::graph::network::Network;

/// Source of a finalized network.
pub trait Scenario {
    fn name(&self) -> &str;
    fn build(&self) -> Result<Network>;
}
