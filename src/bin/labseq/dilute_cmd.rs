use anyhow::Result;
use clap::Args;
use labseq::*;

/// Options for the `dilute` subcommand.
#[derive(Debug, Args)]
pub struct DiluteCmd {
    /// Average cells on a 1/16 square of the hemocytometer.
    pub count_per_square: f64,
    /// Desired colonies per plate (100 ul plated).
    pub colonies_per_plate: f64,
    /// Print the plan as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

pub fn run(cmd: DiluteCmd) -> Result<()> {
    let plan = dilution_plan(cmd.count_per_square, cmd.colonies_per_plate)?;
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        println!("{plan}");
    }
    Ok(())
}
