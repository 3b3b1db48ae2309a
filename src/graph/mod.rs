pub mod location;
pub mod network;
pub mod pipe;
