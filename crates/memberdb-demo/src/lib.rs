//! Demo driver for memberdb.
//!
//! Loads configuration, builds the configured connection provider and runs
//! the CRUD walk-through against [`memberdb_repository::MemberRepository`].
//! The binary in `main.rs` is a thin shell over this library.

pub mod config;
mod scenario;

pub use scenario::{acquire_connections, run_crud_scenario, ScenarioError, ScenarioReport};
