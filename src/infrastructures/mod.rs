pub mod adapters;
pub mod context;
pub mod paths;
pub mod telemetry;
