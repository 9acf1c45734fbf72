//! Replay harness entry point.

use clap::Parser;
use mathink_replay::{CliArgs, run};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    let args = CliArgs::parse();

    match run(&args) {
        Ok(summary) => {
            log::info!(
                "replayed {} steps ({} changed), {} strokes exported",
                summary.steps,
                summary.changed,
                summary.strokes
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{}", err);
            eprintln!("mathink-replay: {err}");
            ExitCode::FAILURE
        }
    }
}
