use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::Args;
use labseq::*;

/// Options for the `annotate` subcommand.
#[derive(Debug, Args)]
pub struct AnnotateCmd {
    /// Directory holding one sub-directory per chromosome.
    #[arg(long, value_name = "DIR")]
    pub root: PathBuf,
    /// Report file name inside each chromosome directory.
    #[arg(long)]
    pub file_name: String,
    /// Chromosome directories to read. Default: chr01, chr02, chr3..chr22, chrX, chrY, chrM
    #[arg(long, value_delimiter = ',')]
    pub chromosomes: Option<Vec<String>>,
    /// Complexity below which ref/bir are flagged.
    #[arg(long, default_value_t = 0.2)]
    pub threshold: f64,
    /// Homology for the sBir template checks.
    #[arg(long, default_value_t = 0.8)]
    pub min_homology: f64,
    /// Path to the annotated table (TSV).
    #[arg(long, default_value = "annotated.tsv")]
    pub outfile: PathBuf,
}

pub fn run(cmd: AnnotateCmd) -> Result<()> {
    let chromosomes = cmd.chromosomes.unwrap_or_else(primary_chromosome_names);
    let params = AnnotationParams {
        complexity: ComplexityParams { threshold: cmd.threshold, ..Default::default() },
        min_homology: cmd.min_homology,
    };
    let run = annotate_directory(&cmd.root, &chromosomes, &cmd.file_name, &params, None);
    for s in &run.skipped_files {
        log::warn!("skipped {}: {}", s.path.display(), s.reason);
    }
    if run.events.is_empty() {
        anyhow::bail!("no events found under {}", cmd.root.display());
    }
    write_annotations(&cmd.outfile, &run.events)
        .with_context(|| format!("write {}", cmd.outfile.display()))?;
    log::info!("finished annotation, table saved to {}", cmd.outfile.display());
    Ok(())
}
