//! measure-repo-runner library crate
//!
//! Conformance checks for a FHIR Measure Repository Service. Exposes the
//! suite, the runner and the report for the binary and integration tests.

pub mod assertions;
pub mod client;
pub mod config;
pub mod error;
pub mod parameters;
pub mod report;
pub mod runner;
pub mod suite;

pub use config::Config;
pub use error::RunnerError;
pub use report::{Outcome, SuiteReport};
pub use runner::SuiteRunner;
pub use suite::Suite;
