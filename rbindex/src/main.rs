// Forbid unwrap() in production code to prevent panics from corrupt data.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
use rbindex::config::{ArenaKind, RunConfig};
use rbindex::index::{DenseArena, HashArena};
use rbindex::simulation::{SimulationResult, Simulator};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rbindex=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment variables
    let config = match RunConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Loaded configuration: seed={}, operations={}, key_space={}, remove_rate={}, arena={}",
        config.seed,
        config.operations,
        config.key_space,
        config.remove_rate,
        config.arena
    );

    let mut simulator = Simulator::new(config.simulator_config());
    let result = match config.arena {
        ArenaKind::Hash => simulator.run(&mut HashArena::new()),
        ArenaKind::Dense => simulator.run(&mut DenseArena::new(config.key_space)),
    };

    report(&result);
    if !result.passed() {
        std::process::exit(1);
    }
}

fn report(result: &SimulationResult) {
    tracing::info!(
        "Seed {}: {} operations ({} inserts, {} removes, {} rejected)",
        result.seed,
        result.operations_run,
        result.inserts,
        result.removes,
        result.rejected
    );
    tracing::info!(
        "Final tree: {} keys, height {}, black height {}",
        result.final_shape.len,
        result.final_shape.height,
        result.final_shape.black_height
    );
    for violation in &result.violations {
        tracing::error!(
            "Operation {} ({}) failed: {}",
            violation.operation_index,
            violation.operation,
            violation.failure
        );
    }
}
