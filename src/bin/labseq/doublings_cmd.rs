use anyhow::Result;
use clap::Args;
use labseq::*;

/// Options for the `doublings` subcommand.
#[derive(Debug, Args)]
pub struct DoublingsCmd {
    /// Cells at the start.
    pub initial: f64,
    /// Final cells per ml.
    pub final_per_ml: f64,
    /// Final culture volume in ml.
    pub volume: f64,
}

pub fn run(cmd: DoublingsCmd) -> Result<()> {
    let d = population_doublings(cmd.initial, cmd.final_per_ml, cmd.volume)?;
    println!(
        "From {} to {} cells there were {d:.3} population doublings",
        cmd.initial, cmd.final_per_ml * cmd.volume
    );
    Ok(())
}
