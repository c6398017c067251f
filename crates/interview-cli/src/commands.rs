use std::path::Path;

use interview_runtime::{load_concept, load_methodology};
use interview_testing::{InterviewWorld, Persona};
use interview_types::CoreError;

use crate::args::Commands;

/// Runs the subcommand, returning the process exit code (spec §6: 0
/// success, 1 configuration error, 2 simulation error).
pub async fn run(command: Commands) -> i32 {
    match command {
        Commands::Simulate { methodology, concept, persona, max_turns } => {
            simulate(&methodology, &concept, &persona, max_turns).await
        }
    }
}

async fn simulate(methodology_path: &Path, concept_path: &Path, persona: &str, max_turns: u32) -> i32 {
    let methodology = match load_methodology(methodology_path) {
        Ok(m) => m,
        Err(err) => return configuration_failure("loading methodology", &err),
    };
    let concept = match load_concept(concept_path) {
        Ok(c) => c,
        Err(err) => return configuration_failure("loading concept", &err),
    };
    let persona = match Persona::parse(persona) {
        Some(p) => p,
        None => {
            tracing::error!(%persona, "unknown persona");
            return 1;
        }
    };

    let mut world = match InterviewWorld::new(methodology, concept.id, concept.name, persona, max_turns).await {
        Ok(world) => world,
        Err(err) => return simulation_failure("starting session", &err),
    };

    let transcript = match world.run().await {
        Ok(t) => t,
        Err(err) => return simulation_failure("running turns", &err),
    };

    match serde_json::to_string_pretty(&transcript) {
        Ok(json) => {
            println!("{json}");
            0
        }
        Err(err) => {
            tracing::error!(%err, "failed to serialize transcript");
            2
        }
    }
}

fn configuration_failure(step: &str, err: &CoreError) -> i32 {
    tracing::error!(%step, %err, "configuration error");
    1
}

fn simulation_failure(step: &str, err: &CoreError) -> i32 {
    tracing::error!(%step, %err, "simulation error");
    2
}
