use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::Args;
use labseq::*;

/// Options for the `kmers` subcommand.
#[derive(Debug, Args)]
pub struct KmersCmd {
    /// Input FASTA file.
    #[arg(value_name = "FASTA")]
    pub fasta: PathBuf,
    /// Path to the frequency table (TSV).
    #[arg(long, default_value = "oligos.tsv")]
    pub outfile: PathBuf,
}

pub fn run(cmd: KmersCmd) -> Result<()> {
    let records = read_fasta(&cmd.fasta)
        .with_context(|| format!("read FASTA {}", cmd.fasta.display()))?;
    if records.is_empty() {
        anyhow::bail!("no FASTA records found in {}", cmd.fasta.display());
    }
    let analysis = oligo_frequency_analysis(&records);

    let mut w = csv::WriterBuilder::new().delimiter(b'\t').from_path(&cmd.outfile)
        .with_context(|| format!("create outfile {}", cmd.outfile.display()))?;
    w.write_record(["id", "k", "oligo", "count", "frequency"])?;
    for p in &analysis.profiles {
        for (k, table) in [("2", &p.dinucleotides), ("1", &p.mononucleotides)] {
            for row in table {
                w.write_record([p.id.as_str(), k, &row.oligo, &row.count.to_string(), &format!("{:.6}", row.frequency)])?;
            }
        }
    }
    w.flush()?;
    log::info!(
        "{} records profiled, {} skipped; table written to {}",
        analysis.profiles.len(), analysis.skipped.len(), cmd.outfile.display()
    );
    Ok(())
}
