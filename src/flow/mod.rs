pub mod aggregate;
pub mod max_flow;
pub mod search;
