use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::Args;
use labseq::*;

/// Options for the `complexity` subcommand.
#[derive(Debug, Args)]
pub struct ComplexityCmd {
    /// Input FASTA file, or an event report with `--from-report`.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
    /// Score the `bir:` sequences of an event report instead of FASTA records.
    #[arg(long, default_value_t = false)]
    pub from_report: bool,
    /// Minimum line length of report `bir:` lines.
    #[arg(long, default_value_t = 100)]
    pub min_len: usize,
    /// Largest word length scored.
    #[arg(long, default_value_t = 8)]
    pub max_word_length: usize,
    /// Sliding window length.
    #[arg(long, default_value_t = 20)]
    pub chunk_size: usize,
    /// Complexity below which a sequence is flagged.
    #[arg(long, default_value_t = 0.2)]
    pub threshold: f64,
    /// Path to the output table (TSV).
    #[arg(long, default_value = "complexity.tsv")]
    pub outfile: PathBuf,
}

pub fn run(cmd: ComplexityCmd) -> Result<()> {
    let (ids, seqs): (Vec<String>, Vec<String>) = if cmd.from_report {
        let text = std::fs::read_to_string(&cmd.input)
            .with_context(|| format!("read report {}", cmd.input.display()))?;
        let seqs = collect_bir_sequences(&text, cmd.min_len);
        ((1..=seqs.len()).map(|i| format!("bir_{i}")).collect(), seqs)
    } else {
        read_fasta(&cmd.input)
            .with_context(|| format!("read FASTA {}", cmd.input.display()))?
            .into_iter()
            .map(|r| (r.id, r.seq))
            .unzip()
    };
    if seqs.is_empty() {
        anyhow::bail!("no sequences found in {}", cmd.input.display());
    }

    let params = ComplexityParams {
        max_word_length: cmd.max_word_length,
        chunk_size: cmd.chunk_size,
        threshold: cmd.threshold,
    };
    let summary = score_sequences(seqs.iter().map(String::as_str), &params);

    let mut w = csv::WriterBuilder::new().delimiter(b'\t').from_path(&cmd.outfile)
        .with_context(|| format!("create outfile {}", cmd.outfile.display()))?;
    w.write_record(["id", "low_complexity", "min_complexity", "word_length", "window", "error"])?;
    for (id, scored) in ids.iter().zip(&summary.scored) {
        match &scored.outcome {
            Ok(v) => w.write_record([
                id.as_str(), &v.low_complexity.to_string(), &format!("{:.6}", v.min_complexity),
                &v.word_length.to_string(), &v.window, "",
            ])?,
            Err(e) => w.write_record([id.as_str(), "", "", "", "", &e.to_string()])?,
        }
    }
    w.flush()?;
    log::info!(
        "{} sequences scored, {} above threshold, {} failed",
        summary.scored.len(), summary.above_threshold, summary.failed
    );
    Ok(())
}
