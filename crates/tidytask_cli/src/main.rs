//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `tidytask_core` wiring.
//! - Keep output deterministic for quick local sanity checks.

use tidytask_core::{AppConfig, SqliteTaskStore, StoreLocation, TaskIntent, TaskService};

fn main() {
    println!("tidytask_core version={}", tidytask_core::core_version());

    // An in-memory round trip exercises connect, migrations, insert and
    // fetch without leaving state behind.
    if let Err(err) = smoke_round_trip() {
        eprintln!("tidytask_core smoke failed: {err}");
        std::process::exit(1);
    }
}

fn smoke_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::with_store(StoreLocation::Memory);
    let store = SqliteTaskStore::connect(&config.store)?;
    let mut service =
        TaskService::new(store).with_input_placeholder(config.input_placeholder.as_str());

    service.load_tasks()?;
    service.apply(TaskIntent::Add("smoke task".to_string()))?;

    println!("tidytask_core smoke tasks={}", service.tasks().len());
    Ok(())
}
