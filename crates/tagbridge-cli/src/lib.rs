/// Command line driver for tagbridge: logging setup and scenario dry runs
pub mod logging;
pub mod scenario;

pub use scenario::{RunSummary, Scenario, ScenarioWorld, Step};
