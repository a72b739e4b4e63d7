use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::Args;
use labseq::*;

/// Options for the `variants` subcommand.
#[derive(Debug, Args)]
pub struct VariantsCmd {
    /// Directory of per-sample variant tables.
    #[arg(long, value_name = "DIR")]
    pub dir: PathBuf,
    /// Extension of the variant tables.
    #[arg(long, default_value = "tsv")]
    pub extension: String,
    /// Minimum dominant allele frequency.
    #[arg(long, default_value_t = 0.35)]
    pub min_af: f64,
    /// Minimum reference + alternate reads.
    #[arg(long, default_value_t = 10)]
    pub min_depth: u64,
    /// Minimum alternate reads.
    #[arg(long, default_value_t = 5)]
    pub min_alt_reads: u64,
    /// Dominant AF at or above which a call is homozygous.
    #[arg(long, default_value_t = 0.85)]
    pub homozygous_af: f64,
    /// Keep every variant type, not only SNPs.
    #[arg(long, default_value_t = false)]
    pub all_types: bool,
    /// Remove calls shared with any other sample (clone background).
    #[arg(long, default_value_t = false)]
    pub subtract_shared: bool,
    /// Path to the classified table (TSV).
    #[arg(long, default_value = "variants.tsv")]
    pub outfile: PathBuf,
}

pub fn run(cmd: VariantsCmd) -> Result<()> {
    let samples = read_samples(&cmd.dir, &cmd.extension)
        .with_context(|| format!("read variant tables from {}", cmd.dir.display()))?;
    if samples.is_empty() {
        anyhow::bail!("no *.{} tables in {}", cmd.extension, cmd.dir.display());
    }
    let filter = VariantFilter {
        snp_only: !cmd.all_types,
        min_af: cmd.min_af,
        depth: DepthFilter { min_total_depth: cmd.min_depth, min_alt_reads: cmd.min_alt_reads },
        homozygous_af: cmd.homozygous_af,
    };
    let mut filtered = quality_filter(&samples, &filter);
    if cmd.subtract_shared {
        filtered = subtract_shared_variants(&filtered).into_iter().map(|s| s.sample).collect();
    }
    write_classified(&cmd.outfile, &filtered)
        .with_context(|| format!("write {}", cmd.outfile.display()))?;
    let kept: usize = filtered.iter().map(|s| s.calls.len()).sum();
    log::info!("{kept} calls from {} samples written to {}", filtered.len(), cmd.outfile.display());
    Ok(())
}
