// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All pipeline logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`   — runs the pipeline and the epoch loop
//   2. `inspect` — prints schemas and split sizes, no training
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, InspectArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "sensor-classifier",
    version = "0.1.0",
    about = "Train a feed-forward classifier on a delimited sensor dataset."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args) => run_train(args),
            Commands::Inspect(args) => run_inspect(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on '{}'", args.data.data.display());

    let reports = TrainUseCase::new(args.into()).execute()?;

    match reports.last() {
        Some(last) => println!(
            "Training complete. Final accuracy {:.4} on {} test examples.",
            last.evaluation.accuracy(),
            last.evaluation.num_examples()
        ),
        None => println!("Training complete."),
    }
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    use crate::application::inspect_use_case::InspectUseCase;

    let inspection = InspectUseCase::new(args.into()).execute()?;
    print!("{inspection}");
    Ok(())
}
