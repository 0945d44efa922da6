//! memberdb demo binary.
//!
//! Loads configuration, initializes structured logging, bootstraps the
//! `member` schema, then runs the CRUD scenario through the configured
//! connection provider and prints the report as JSON.

use std::process::ExitCode;

use memberdb_db::{
    create_pool, ensure_schema, ConnectionProvider, DirectProvider, PooledProvider,
};
use memberdb_demo::config::{self, Config, ProviderKind};
use memberdb_demo::{acquire_connections, run_crud_scenario};
use memberdb_repository::MemberRepository;
use memberdb_types::Member;
use tracing_subscriber::EnvFilter;

fn resolve_config_path() -> (Option<String>, &'static str) {
    if let Some(path) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("MEMBERDB_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

fn main() -> ExitCode {
    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path.as_deref().or(Some("config.toml"));

    let config = config::load_config(selected_config_path)
        .expect("failed to load configuration: the demo cannot start without valid config");

    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        provider = ?config.database.provider,
        "resolved startup configuration"
    );

    let settings = config.database.runtime_settings();
    match config.database.provider {
        ProviderKind::Direct => run(DirectProvider::new(&config.database.path, settings), &config),
        ProviderKind::Pooled => {
            match create_pool(&config.database.path, settings) {
                Ok(pool) => run(PooledProvider::new(pool), &config),
                Err(e) => {
                    tracing::error!(error = %e, "failed to create database pool");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn run<P: ConnectionProvider>(provider: P, config: &Config) -> ExitCode {
    {
        let conn = provider
            .get_connection()
            .expect("failed to get database connection for schema setup");
        ensure_schema(&conn).expect("failed to create member table");
    }

    // Two connections at once: distinct handles either way, and for the pool
    // both go back to it when the vector is dropped.
    match acquire_connections(&provider, 2) {
        Ok(held) => tracing::info!(count = held.len(), "acquired and released connections"),
        Err(e) => tracing::warn!(error = %e, "could not hold two connections"),
    }

    let repository = MemberRepository::new(provider);
    let scenario = &config.scenario;
    let member = Member::new(scenario.member_id.as_str(), scenario.money);

    match run_crud_scenario(&repository, member, scenario.updated_money) {
        Ok(report) => {
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::error!(error = %e, "failed to serialize scenario report"),
            }
            tracing::info!("crud scenario completed");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "crud scenario failed");
            ExitCode::FAILURE
        }
    }
}
