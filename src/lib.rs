pub mod address;
pub mod args;
pub mod audit;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod logging;
pub mod metrics;
pub mod normalize;
pub mod parser;
pub mod pipeline;
pub mod registry;
pub mod storage;
pub mod tasks;
pub mod types;

// Capability traits and their concrete adapters
pub mod app;
pub mod infra;
