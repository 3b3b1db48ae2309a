pub mod basic;
pub mod dataset;
pub mod random;
pub mod scenario;
