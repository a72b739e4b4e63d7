//! Command-line interface for the `labseq` crate.
//!
//! Subcommands are implemented in separate files (modules) under `src/bin/labseq/`:
//! - `kmers_cmd.rs`, `complexity_cmd.rs`, `repeats_cmd.rs`
//! - `variants_cmd.rs`, `random_loci_cmd.rs`
//! - `fanout_cmd.rs`
//! - `annotate_cmd.rs`, `reference_cmd.rs`
//! - `amplicon_cmd.rs`
//! - `dilute_cmd.rs`, `doublings_cmd.rs`
//!
//! Logging goes to stderr through `env_logger`; the default level is `info`
//! and `RUST_LOG` overrides it.
//!
use clap::{Parser, Subcommand};
use anyhow::Result;

#[derive(Debug, Parser)]
#[command(name="labseq", version=env!("CARGO_PKG_VERSION"), about="Wet-lab sequence and variant utilities", disable_help_subcommand=true)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Di- and mononucleotide frequency tables of every FASTA record.
    Kmers(kmers_cmd::KmersCmd),
    /// Lowest linguistic complexity over sliding windows.
    Complexity(complexity_cmd::ComplexityCmd),
    /// Inverted-repeat scan, written as JSON.
    Repeats(repeats_cmd::RepeatsCmd),
    /// Filter, classify and clone-subtract variant tables.
    Variants(variants_cmd::VariantsCmd),
    /// Uniformly random loci on a linear genome.
    #[command(name = "random-loci")]
    RandomLoci(random_loci_cmd::RandomLociCmd),
    /// Run a script over slices of a CSV table in parallel and join the results.
    Fanout(fanout_cmd::FanoutCmd),
    /// Annotate per-chromosome BIR event reports.
    Annotate(annotate_cmd::AnnotateCmd),
    /// Build a chromosome-named reference FASTA.
    Reference(reference_cmd::ReferenceCmd),
    /// Trim and classify amplicon reads from SAM files.
    Amplicon(amplicon_cmd::AmpliconCmd),
    /// Serial dilution plan from a hemocytometer count.
    Dilute(dilute_cmd::DiluteCmd),
    /// Population doublings between two culture sizes.
    Doublings(doublings_cmd::DoublingsCmd),
}

#[path = "labseq/kmers_cmd.rs"] mod kmers_cmd;
#[path = "labseq/complexity_cmd.rs"] mod complexity_cmd;
#[path = "labseq/repeats_cmd.rs"] mod repeats_cmd;
#[path = "labseq/variants_cmd.rs"] mod variants_cmd;
#[path = "labseq/random_loci_cmd.rs"] mod random_loci_cmd;
#[path = "labseq/fanout_cmd.rs"] mod fanout_cmd;
#[path = "labseq/annotate_cmd.rs"] mod annotate_cmd;
#[path = "labseq/reference_cmd.rs"] mod reference_cmd;
#[path = "labseq/amplicon_cmd.rs"] mod amplicon_cmd;
#[path = "labseq/dilute_cmd.rs"] mod dilute_cmd;
#[path = "labseq/doublings_cmd.rs"] mod doublings_cmd;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match cli.command {
        Command::Kmers(cmd) => kmers_cmd::run(cmd),
        Command::Complexity(cmd) => complexity_cmd::run(cmd),
        Command::Repeats(cmd) => repeats_cmd::run(cmd),
        Command::Variants(cmd) => variants_cmd::run(cmd),
        Command::RandomLoci(cmd) => random_loci_cmd::run(cmd),
        Command::Fanout(cmd) => fanout_cmd::run(cmd),
        Command::Annotate(cmd) => annotate_cmd::run(cmd),
        Command::Reference(cmd) => reference_cmd::run(cmd),
        Command::Amplicon(cmd) => amplicon_cmd::run(cmd),
        Command::Dilute(cmd) => dilute_cmd::run(cmd),
        Command::Doublings(cmd) => doublings_cmd::run(cmd),
    }
}
