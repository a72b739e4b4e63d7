use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::Args;
use rand::{rngs::StdRng, SeedableRng};
use labseq::*;

/// Options for the `random-loci` subcommand.
#[derive(Debug, Args)]
pub struct RandomLociCmd {
    /// Table with `chromosome` and `end_position` columns (TSV).
    #[arg(long, value_name = "TSV")]
    pub chromosomes: PathBuf,
    /// Number of loci to draw.
    #[arg(short = 'n', long)]
    pub count: usize,
    /// Seed for a reproducible draw.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Write yeast chromosome names as roman numerals.
    #[arg(long, default_value_t = false)]
    pub roman: bool,
    /// Path to the loci table (TSV).
    #[arg(long, default_value = "random_loci.tsv")]
    pub outfile: PathBuf,
}

pub fn run(cmd: RandomLociCmd) -> Result<()> {
    let chroms = read_chromosomes(&cmd.chromosomes)
        .with_context(|| format!("read chromosome table {}", cmd.chromosomes.display()))?;
    let mut rng = match cmd.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let linear = generate_random_loci(cmd.count, &chroms, &mut rng)?;
    let mut loci = locate_in_linear_genome(&chroms, &linear);
    if cmd.roman {
        for l in &mut loci {
            l.chrom = roman_chromosome_name(&l.chrom);
        }
    }

    let mut w = csv::WriterBuilder::new().delimiter(b'\t').from_path(&cmd.outfile)
        .with_context(|| format!("create outfile {}", cmd.outfile.display()))?;
    for l in &loci {
        w.serialize(l)?;
    }
    w.flush()?;
    log::info!("{} loci over {} bp written to {}", loci.len(), genome_length(&chroms), cmd.outfile.display());
    Ok(())
}
