use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::Args;
use labseq::*;

/// Options for the `repeats` subcommand.
#[derive(Debug, Args)]
pub struct RepeatsCmd {
    /// Input FASTA file.
    #[arg(value_name = "FASTA")]
    pub fasta: PathBuf,
    /// Shortest seed length to scan. Default: 4
    #[arg(long, default_value_t = 4)]
    pub min_query_length: usize,
    /// Longest seed length to scan. Default: 25
    #[arg(long, default_value_t = 25)]
    pub max_query_length: usize,
    /// Bases skipped between a seed and its first candidate. Default: 0
    #[arg(long, default_value_t = 0)]
    pub min_spacer: usize,
    /// Window length searched after each seed start. Default: 250
    #[arg(long, default_value_t = 250)]
    pub window_size: usize,
    /// Allow mismatches and indels between a seed and its partner.
    #[arg(long, default_value_t = false)]
    pub imperfect_homology: bool,
    /// Minimum homology used to size the error budget. Default: 0.8
    #[arg(long, default_value_t = 0.8)]
    pub min_homology: f64,
    /// Fixed number of tolerated edits (overrides --min-homology).
    #[arg(long)]
    pub errors: Option<usize>,
    /// Search direct repeats instead of inverted ones.
    #[arg(long, default_value_t = false)]
    pub direct: bool,
    /// Path to the flat `{seed: [partners]}` JSON output, merged over all
    /// records. Default: repeats.json
    #[arg(long, default_value = "repeats.json")]
    pub outfile: PathBuf,
}

pub fn run(cmd: RepeatsCmd) -> Result<()> {
    let records = read_fasta(&cmd.fasta)
        .with_context(|| format!("read FASTA {}", cmd.fasta.display()))?;
    let params = RepeatParams {
        min_query_length: cmd.min_query_length,
        max_query_length: cmd.max_query_length,
        min_spacer: cmd.min_spacer,
        window_size: cmd.window_size,
        imperfect_homology: cmd.imperfect_homology,
        homology: HomologyParams { min_homology: cmd.min_homology, fixed_errors: cmd.errors, inverted: !cmd.direct },
    };

    let mut all = RepeatResults::default();
    for r in &records {
        let found = search_sequence_for_repeats(&r.seq, &params)
            .with_context(|| format!("repeat search in {}", r.id))?;
        log::info!("{}: {} seeds with partners, {} windows skipped", r.id, found.repeats.len(), found.skipped_windows);
        all.merge(found);
    }

    all.write_json(&cmd.outfile)
        .with_context(|| format!("write {}", cmd.outfile.display()))?;
    log::info!("{} seeds written to {}", all.repeats.len(), cmd.outfile.display());
    Ok(())
}
