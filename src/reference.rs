//! Build a chromosome-named reference FASTA from an assembly download.
//!
//! Only primary-assembly chromosomes and the mitochondrial genome are kept.
//! Their headers are rewritten to short names (`>chr01`, `>chr02`, `>chr3`,
//! ..., `>chrX`, `>chrY`, `>chrM`); sequence lines are copied verbatim and
//! every other record is dropped.
//!
use std::io::{BufRead, Write};
use regex::Regex;
use crate::common::Result;

/// What [`build_reference`] kept and dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReferenceStats {
    /// New names of the kept records, in input order.
    pub kept: Vec<String>,
    pub dropped: usize,
}

/// Chromosome names in the form produced by [`build_reference`].
pub fn primary_chromosome_names() -> Vec<String> {
    let mut names: Vec<String> = (1..=22)
        .map(|n| if n <= 2 { format!("chr0{n}") } else { format!("chr{n}") })
        .collect();
    names.extend(["chrX", "chrY", "chrM"].map(String::from));
    names
}

fn rename(header: &str, primary: &Regex, mito: &Regex) -> Option<String> {
    if primary.is_match(header) {
        let n = header.split_whitespace().nth(4)?.trim_matches(',');
        return Some(match n {
            "1" | "2" => format!("chr0{n}"),
            _ => format!("chr{n}"),
        });
    }
    mito.is_match(header).then(|| "chrM".to_string())
}

/// Stream FASTA from `reader` to `writer`, keeping and renaming chromosome
/// records.
pub fn build_reference<R: BufRead, W: Write>(reader: R, mut writer: W) -> Result<ReferenceStats> {
    let primary = Regex::new(r"chromosome.*Primary.Assembly$")?;
    let mito = Regex::new(r"mitochondrion, complete genome$")?;
    let mut stats = ReferenceStats::default();
    let mut keep = false;
    for line in reader.lines() {
        let line = line?;
        if line.starts_with('>') {
            let header = line.trim_end();
            match rename(header, &primary, &mito) {
                Some(name) => {
                    log::info!("{header} -> >{name}");
                    writeln!(writer, ">{name}")?;
                    stats.kept.push(name);
                    keep = true;
                }
                None => {
                    log::debug!("dropping {header}");
                    stats.dropped += 1;
                    keep = false;
                }
            }
        } else if keep {
            writeln!(writer, "{line}")?;
        }
    }
    writer.flush()?;
    log::info!("reference built: {} records kept, {} dropped", stats.kept.len(), stats.dropped);
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_primary_chromosomes_and_mito() {
        let input = "\
>NC_000001.11 Homo sapiens chromosome 1, GRCh38.p14 Primary Assembly
ACGT
ACGG
>NT_187361.1 Homo sapiens chromosome 1 unlocalized genomic scaffold
TTTT
>NC_000010.11 Homo sapiens chromosome 10, GRCh38.p14 Primary Assembly
GGGG
>NC_000023.11 Homo sapiens chromosome X, GRCh38.p14 Primary Assembly
CCCC
>NC_012920.1 Homo sapiens mitochondrion, complete genome
AAAA
";
        let mut out = Vec::new();
        let stats = build_reference(input.as_bytes(), &mut out).unwrap();
        assert_eq!(stats.kept, vec!["chr01", "chr10", "chrX", "chrM"]);
        assert_eq!(stats.dropped, 1);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, ">chr01\nACGT\nACGG\n>chr10\nGGGG\n>chrX\nCCCC\n>chrM\nAAAA\n");
    }

    #[test]
    fn names_cover_the_karyotype() {
        let names = primary_chromosome_names();
        assert_eq!(names.len(), 25);
        assert_eq!(names[0], "chr01");
        assert_eq!(names[2], "chr3");
        assert_eq!(names.last().map(String::as_str), Some("chrM"));
    }
}
