use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::Args;
use labseq::*;

/// Options for the `reference` subcommand.
#[derive(Debug, Args)]
pub struct ReferenceCmd {
    /// Assembly FASTA.
    pub input: PathBuf,
    /// Reference FASTA to write.
    pub output: PathBuf,
}

pub fn run(cmd: ReferenceCmd) -> Result<()> {
    let reader = File::open(&cmd.input).with_context(|| format!("open FASTA {}", cmd.input.display()))?;
    let writer = File::create(&cmd.output).with_context(|| format!("create {}", cmd.output.display()))?;
    let stats = build_reference(BufReader::new(reader), BufWriter::new(writer))?;
    if stats.kept.is_empty() {
        anyhow::bail!("no chromosome records found in {}", cmd.input.display());
    }
    Ok(())
}
