//! Common helpers shared by every module: the crate error type and the FASTA
//! loader.
//!
//! ## FASTA
//! The loader is permissive about layout and strict about structure: any line
//! containing `>` opens a new record, every other non-blank line is appended
//! (whitespace stripped) to the current record, and a file whose first
//! non-blank line is not a header is rejected. Characters are not validated
//! here; see [`crate::nucleotide`] for that.
//!
//! ## Examples
//! ```rust
//! use labseq::parse_fasta;
//! let recs = parse_fasta(">seq one\nACGT\nAC\n>p\nTTGA\n").unwrap();
//! assert_eq!(recs.len(), 2);
//! assert_eq!(recs[0].id, "seq one");
//! assert_eq!(recs[0].seq, "ACGTAC");
//! ```
//!
use std::path::{Path, PathBuf};

/// Errors that can be returned by the routines in this crate.
#[derive(thiserror::Error, Debug)]
pub enum LabseqError {
    /// A character with no complement was handed to [`crate::complement`].
    #[error("invalid base {base:?}: only A, C, G, T and '-' can be complemented")]
    InvalidBase { base: char },
    /// FASTA text where sequence data precedes the first `>` header.
    #[error("FASTA input does not start with a header line (line {line})")]
    MissingHeader { line: usize },
    /// Returned if a window length or word length is zero.
    #[error("window and word lengths must be > 0 (window={window}, word={word})")]
    InvalidWindow { window: usize, word: usize },
    /// The sequence cannot hold a single scoring window.
    #[error("sequence of length {len} is shorter than the window size {window}")]
    SequenceTooShort { len: usize, window: usize },
    /// A parameter outside its documented range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// A field could not be interpreted.
    #[error("failed parsing {context}: {msg}")]
    Parse { context: String, msg: String },
    #[error("file {path:?}: {source}")]
    File { path: PathBuf, source: std::io::Error },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Regex(#[from] regex::Error),
}

impl LabseqError {
    #[cold]
    pub fn parse<C: Into<String>, M: Into<String>>(context: C, msg: M) -> Self {
        LabseqError::Parse { context: context.into(), msg: msg.into() }
    }

    #[cold]
    pub fn file<P: AsRef<Path>>(path: P, source: std::io::Error) -> Self {
        LabseqError::File { path: path.as_ref().to_path_buf(), source }
    }
}

pub type Result<T> = std::result::Result<T, LabseqError>;

/// A single FASTA sequence (title and sequence letters as read).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FastaRecord {
    /// Title from the header line, `>` and surrounding whitespace removed.
    pub id: String,
    /// Concatenated sequence lines. Case and content are kept as-is.
    pub seq: String,
}

/// Parse FASTA text into a vector of [`FastaRecord`], keeping file order.
///
/// *Any line containing `>` starts a new record.* All other lines are
/// appended, stripped of whitespace, to the current sequence. Blank lines are
/// ignored anywhere in the input.
///
/// ## Errors
/// [`LabseqError::MissingHeader`] when sequence data appears before the first
/// header.
pub fn parse_fasta(text: &str) -> Result<Vec<FastaRecord>> {
    let mut out: Vec<FastaRecord> = vec![];
    for (lineno, line) in text.lines().enumerate() {
        if line.contains('>') {
            let id = line.trim().trim_matches('>').trim().to_string();
            out.push(FastaRecord { id, seq: String::new() });
            continue;
        }
        let chunk = line.trim();
        if chunk.is_empty() {
            continue;
        }
        match out.last_mut() {
            Some(rec) => rec.seq.push_str(chunk),
            None => return Err(LabseqError::MissingHeader { line: lineno + 1 }),
        }
    }
    Ok(out)
}

/// Read and parse a FASTA file.
pub fn read_fasta<P: AsRef<Path>>(path: P) -> Result<Vec<FastaRecord>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| LabseqError::file(path, e))?;
    let records = parse_fasta(&text)?;
    log::info!("extracted {} FASTA records from {}", records.len(), path.display());
    Ok(records)
}
