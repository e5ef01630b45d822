pub mod audit;
pub mod config;
pub mod probe;
