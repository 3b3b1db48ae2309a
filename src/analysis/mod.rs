pub mod report;
pub mod sensitivity;
