use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::Args;
use labseq::*;

/// Options for the `amplicon` subcommand.
#[derive(Debug, Args)]
pub struct AmpliconCmd {
    /// Directory of per-sample SAM files.
    #[arg(long, value_name = "DIR")]
    pub dir: PathBuf,
    /// Extension of the read files. Default: sam
    #[arg(long, default_value = "sam")]
    pub extension: String,
    /// Forward primer sequence.
    #[arg(long)]
    pub forward: String,
    /// Reverse primer sequence.
    #[arg(long)]
    pub reverse: String,
    /// Unedited consensus; trimmed reads found in it become `no_excision`.
    #[arg(long)]
    pub wild_type: String,
    /// Labelled consensus as LABEL=SEQUENCE, tried in the order given.
    #[arg(long = "class", value_name = "LABEL=SEQUENCE", value_parser = parse_class)]
    pub classes: Vec<(String, String)>,
    /// Edits tolerated against a consensus. Default: 2
    #[arg(long, default_value_t = 2)]
    pub max_errors: usize,
    /// Path to the read table (TSV). Default: amplicon.tsv
    #[arg(long, default_value = "amplicon.tsv")]
    pub outfile: PathBuf,
}

fn parse_class(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((label, seq)) if !label.is_empty() && !seq.is_empty() => Ok((label.to_string(), seq.to_string())),
        _ => Err(format!("expected LABEL=SEQUENCE, got {s:?}")),
    }
}

pub fn run(cmd: AmpliconCmd) -> Result<()> {
    let mut samples = read_amplicon_samples(&cmd.dir, &cmd.extension, &cmd.forward, &cmd.reverse)
        .with_context(|| format!("read SAM files from {}", cmd.dir.display()))?;
    if samples.is_empty() {
        anyhow::bail!("no *.{} files in {}", cmd.extension, cmd.dir.display());
    }
    let params = AmpliconParams {
        forward: cmd.forward,
        reverse: cmd.reverse,
        wild_type: cmd.wild_type,
        classes: cmd.classes,
        max_errors: cmd.max_errors,
    };
    for s in samples.iter_mut() {
        annotate_reads(&mut s.reads, &params);
        let unedited = s.reads.iter().filter(|r| r.seq == NO_EXCISION).count();
        log::info!("{}: {} reads, {unedited} without excision", s.name, s.reads.len());
    }
    write_amplicon_reads(&cmd.outfile, &samples)
        .with_context(|| format!("write {}", cmd.outfile.display()))?;
    log::info!("amplicon table saved to {}", cmd.outfile.display());
    Ok(())
}
