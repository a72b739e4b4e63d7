//! Primer trimming and classification of amplicon reads.
//!
//! Reads from an amplicon experiment are loaded from SAM files, one file per
//! sample, trimmed to the span between the forward primer start and the
//! reverse primer end, then compared to one or more consensus sequences with
//! up to two edits. A trimmed read that still fits the unedited consensus
//! supports *no excision*.
//!
use std::path::{Path, PathBuf};
use crate::common::{LabseqError, Result};
use crate::fuzzy;

/// Marker sequence of a read carrying neither primer.
pub const NO_PRIMERS: &str = "no_primers";
/// Marker sequence of a read matching the unedited consensus.
pub const NO_EXCISION: &str = "no_excision";
/// Classification of a read no consensus has claimed yet.
pub const UNCLASSIFIED: &str = "other";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AmpliconRead {
    pub name: String,
    pub seq: String,
    pub forward_primer: bool,
    pub reverse_primer: bool,
    pub classification: String,
}

impl AmpliconRead {
    /// New unclassified read; primer flags record exact occurrence.
    pub fn new(name: impl Into<String>, seq: impl Into<String>, forward: &str, reverse: &str) -> Self {
        let seq = seq.into();
        Self {
            name: name.into(),
            forward_primer: contains_exact(&seq, forward),
            reverse_primer: contains_exact(&seq, reverse),
            seq,
            classification: UNCLASSIFIED.to_string(),
        }
    }
}

/// A sample name and its reads, in file order.
#[derive(Clone, Debug)]
pub struct AmpliconSample {
    pub name: String,
    pub reads: Vec<AmpliconRead>,
}

/// Primers, the unedited consensus and the labelled consensus sequences a
/// read is tested against, in priority order.
#[derive(Clone, Debug)]
pub struct AmpliconParams {
    pub forward: String,
    pub reverse: String,
    pub wild_type: String,
    pub classes: Vec<(String, String)>,
    pub max_errors: usize,
}

pub fn contains_exact(seq: &str, sequence: &str) -> bool {
    seq.contains(sequence)
}

pub fn read_length(seq: &str) -> usize {
    seq.chars().count()
}

/// Trim `read` to the forward primer start and the reverse primer end.
///
/// A primer flagged present but not found clears its flag. A read with no
/// primer left becomes [`NO_PRIMERS`]; a trimmed read found in `consensus`
/// within `max_errors` edits becomes [`NO_EXCISION`].
pub fn trim_to_primers(read: &mut AmpliconRead, forward: &str, reverse: &str, consensus: &str, max_errors: usize) {
    if read.forward_primer {
        match read.seq.find(forward) {
            Some(i) => read.seq = read.seq[i..].to_string(),
            None => {
                log::debug!("{}: no forward primer found", read.name);
                read.forward_primer = false;
            }
        }
    }
    if read.reverse_primer {
        match read.seq.find(reverse) {
            Some(i) => read.seq.truncate(i + reverse.len()),
            None => {
                log::debug!("{}: no reverse primer found", read.name);
                read.reverse_primer = false;
            }
        }
    }
    if !read.forward_primer && !read.reverse_primer {
        read.seq = NO_PRIMERS.to_string();
        return;
    }
    if fuzzy::is_match(consensus, &read.seq, max_errors) {
        read.seq = NO_EXCISION.to_string();
    }
}

/// Label a still unclassified read whose sequence occurs in `consensus`
/// within `max_errors` edits.
pub fn classify(read: &mut AmpliconRead, consensus: &str, label: &str, max_errors: usize) {
    if read.classification != UNCLASSIFIED {
        return;
    }
    if fuzzy::is_match(consensus, &read.seq, max_errors) {
        read.classification = label.to_string();
    }
}

/// Trim every read, then offer it to each labelled consensus in turn.
pub fn annotate_reads(reads: &mut [AmpliconRead], params: &AmpliconParams) {
    for read in reads.iter_mut() {
        trim_to_primers(read, &params.forward, &params.reverse, &params.wild_type, params.max_errors);
        for (label, consensus) in &params.classes {
            classify(read, consensus, label, params.max_errors);
        }
    }
}

/// Name (QNAME) and sequence (SEQ) of every alignment line of a SAM file.
///
/// `@` header lines are skipped, as are records without a stored sequence
/// (`*`).
pub fn read_sam_reads<P: AsRef<Path>>(path: P, forward: &str, reverse: &str) -> Result<Vec<AmpliconRead>> {
    let path = path.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .comment(Some(b'@'))
        .from_path(path)?;
    let mut out = Vec::new();
    for (i, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let (Some(name), Some(seq)) = (rec.get(0), rec.get(9)) else {
            return Err(LabseqError::parse(
                format!("{} record {}", path.display(), i + 1),
                format!("expected at least 10 columns, found {}", rec.len()),
            ));
        };
        if seq == "*" {
            continue;
        }
        out.push(AmpliconRead::new(name, seq, forward, reverse));
    }
    Ok(out)
}

/// Read every `*.{extension}` SAM file in `dir` as a sample, ordered by file
/// name. The sample name is the first eight characters of the file name.
pub fn read_amplicon_samples<P: AsRef<Path>>(dir: P, extension: &str, forward: &str, reverse: &str) -> Result<Vec<AmpliconSample>> {
    let dir = dir.as_ref();
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| LabseqError::file(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().map_or(false, |x| x == extension))
        .collect();
    paths.sort();
    let mut samples = Vec::with_capacity(paths.len());
    for p in paths {
        let file_name = p.file_name().map(|f| f.to_string_lossy().into_owned()).unwrap_or_default();
        let name = file_name.chars().take(8).collect::<String>().trim().to_string();
        let reads = read_sam_reads(&p, forward, reverse)?;
        log::info!("sample {name} has {} reads", reads.len());
        samples.push(AmpliconSample { name, reads });
    }
    log::info!("found {} samples in {}", samples.len(), dir.display());
    Ok(samples)
}

/// Write the reads of all samples as one TSV with a `SAMPLE` column.
pub fn write_amplicon_reads<P: AsRef<Path>>(path: P, samples: &[AmpliconSample]) -> Result<()> {
    let mut w = csv::WriterBuilder::new().delimiter(b'\t').from_path(path.as_ref())?;
    w.write_record(["SAMPLE", "NAME", "SEQ", "LENGTH", "FORWARD_PRIMER", "REVERSE_PRIMER", "CLASSIFICATION"])?;
    for s in samples {
        for r in &s.reads {
            w.write_record([
                s.name.as_str(),
                &r.name,
                &r.seq,
                &read_length(&r.seq).to_string(),
                &r.forward_primer.to_string(),
                &r.reverse_primer.to_string(),
                &r.classification,
            ])?;
        }
    }
    w.flush()?;
    Ok(())
}
