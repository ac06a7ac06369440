//! Service implementations for the external collaborators

pub mod engine_runner;
pub mod rate_lookup;

pub use engine_runner::DosboxRunner;
pub use rate_lookup::GeminiRateLookup;
