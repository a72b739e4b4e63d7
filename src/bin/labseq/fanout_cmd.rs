use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::Args;
use labseq::*;

/// Options for the `fanout` subcommand.
#[derive(Debug, Args)]
pub struct FanoutCmd {
    /// Script run as `script <chunk_in> <chunk_out>`.
    pub script: PathBuf,
    /// Input CSV table.
    pub input: PathBuf,
    /// Number of chunks and concurrent workers.
    pub processes: usize,
    /// Joined output CSV.
    pub output: PathBuf,
    /// Program the script is run with.
    #[arg(long, default_value = "python3")]
    pub interpreter: String,
    /// Execute the script directly instead of through an interpreter.
    #[arg(long, default_value_t = false)]
    pub no_interpreter: bool,
}

pub fn run(cmd: FanoutCmd) -> Result<()> {
    let params = FanOutParams {
        script: cmd.script,
        interpreter: (!cmd.no_interpreter).then_some(cmd.interpreter),
        input: cmd.input,
        processes: cmd.processes,
        output: cmd.output,
    };
    let report = run_fan_out(&params)
        .with_context(|| format!("fan out {} over {}", params.script.display(), params.input.display()))?;
    let failed: Vec<String> = report.failed().map(|c| format!("chunk {} ({:?})", c.index, c.status)).collect();
    if !failed.is_empty() {
        anyhow::bail!(
            "{} of {} chunks failed: {}; partial results ({} rows) in {}",
            failed.len(), report.chunks.len(), failed.join(", "), report.rows, params.output.display()
        );
    }
    log::info!("{} rows written to {}", report.rows, params.output.display());
    Ok(())
}
