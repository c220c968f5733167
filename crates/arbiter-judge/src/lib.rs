pub mod coerce;
pub mod policy;
pub mod prompt;
pub mod service;
pub mod types;
