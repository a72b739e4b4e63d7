//! Linguistic sequence complexity over sliding windows.
//!
//! For a sequence `S` and a word length `k`,
//! ```text
//! C_k(S) = |distinct k-words of S| / min(4^k, |S| - k + 1)
//! ```
//! i.e. the observed vocabulary relative to the largest vocabulary four
//! nucleotides could produce, capped by how many words fit. The score is
//! evaluated per `(window, k)` pair and the single lowest value is kept: a
//! sequence is *low complexity* as soon as one window is repetitive at one
//! word length.
//!
//! The score is a repetitiveness heuristic, not an entropy measure. Words are
//! compared case sensitively and non-ACGT symbols are treated as letters.
//!
//! ### Examples
//! ```rust
//! use labseq::{moving_window_complexity, ComplexityParams};
//! let verdict = moving_window_complexity("ATATATATATATATATATATATAT", &ComplexityParams::default()).unwrap();
//! assert!(verdict.low_complexity);
//! assert_eq!(verdict.word_length, 3);
//! ```
//!
use std::collections::HashSet;
use serde::Serialize;
use crate::common::{LabseqError, Result};

/// Options for [`moving_window_complexity`].
#[derive(Clone, Debug)]
pub struct ComplexityParams {
    /// Largest word length scored; lengths `1..=max_word_length` are tried.
    pub max_word_length: usize,
    /// Sliding window length; windows advance one base at a time.
    pub chunk_size: usize,
    /// Minimum complexity below which a sequence is flagged.
    pub threshold: f64,
}

impl Default for ComplexityParams {
    fn default() -> Self {
        Self { max_word_length: 8, chunk_size: 20, threshold: 0.2 }
    }
}

/// Complexity of one window at one word length.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComplexityWindow {
    pub complexity: f64,
    pub word_length: usize,
    pub sequence: String,
}

/// The lowest-scoring window of a sequence.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WindowComplexity {
    /// `min_complexity < threshold`.
    pub low_complexity: bool,
    pub min_complexity: f64,
    pub word_length: usize,
    pub window: String,
}

/// All overlapping words of `word_length` in `seq`; empty when `seq` is
/// shorter.
pub fn words_in_sequence(seq: &str, word_length: usize) -> Vec<String> {
    if word_length == 0 {
        return Vec::new();
    }
    let chars: Vec<char> = seq.chars().collect();
    chars.windows(word_length).map(|w| w.iter().collect()).collect()
}

/// `min(4^k, len - k + 1)`; 0 when `len < k`.
pub fn max_vocabulary(len: usize, k: usize) -> usize {
    if len < k { return 0; }
    let pow = 4usize.saturating_pow(k as u32);
    pow.min(len - k + 1)
}

fn distinct_words(chars: &[char], k: usize) -> usize {
    if k == 0 { return 0; }
    chars.windows(k).collect::<HashSet<&[char]>>().len()
}

/// Score `seq` at a single word length.
pub fn complexity_score(seq: &str, word_length: usize, threshold: f64) -> ComplexityWindow {
    let chars: Vec<char> = seq.chars().collect();
    let denom = max_vocabulary(chars.len(), word_length);
    let complexity = if denom == 0 { 0.0 } else { distinct_words(&chars, word_length) as f64 / denom as f64 };
    if complexity < threshold {
        log::debug!("complexity at word length {word_length} is {complexity:.4} for {seq}");
    }
    ComplexityWindow { complexity, word_length, sequence: seq.to_string() }
}

/// Slide a `chunk_size` window along `seq` and return the lowest complexity
/// over every window and every word length `1..=max_word_length`.
///
/// Word lengths longer than the window are not scored. Word lengths are the
/// outer loop and window starts the inner one; on ties the first minimum
/// wins, so shorter word lengths and earlier windows are preferred.
///
/// ## Errors
/// - [`LabseqError::InvalidWindow`] if `chunk_size` or `max_word_length` is 0.
/// - [`LabseqError::SequenceTooShort`] if no full window fits in `seq`.
pub fn moving_window_complexity(seq: &str, params: &ComplexityParams) -> Result<WindowComplexity> {
    if params.chunk_size == 0 || params.max_word_length == 0 {
        return Err(LabseqError::InvalidWindow { window: params.chunk_size, word: params.max_word_length });
    }
    let chars: Vec<char> = seq.chars().collect();
    if chars.len() < params.chunk_size {
        return Err(LabseqError::SequenceTooShort { len: chars.len(), window: params.chunk_size });
    }

    let mut lowest: Option<(f64, usize, usize)> = None;
    for k in 1..=params.max_word_length.min(params.chunk_size) {
        let denom = max_vocabulary(params.chunk_size, k);
        for (start, window) in chars.windows(params.chunk_size).enumerate() {
            let c = if denom == 0 { 0.0 } else { distinct_words(window, k) as f64 / denom as f64 };
            if lowest.map_or(true, |(best, _, _)| c < best) {
                lowest = Some((c, k, start));
            }
        }
    }
    let (min_complexity, word_length, start) = lowest
        .ok_or(LabseqError::InvalidWindow { window: params.chunk_size, word: params.max_word_length })?;
    let window: String = chars[start..start + params.chunk_size].iter().collect();
    if min_complexity < params.threshold {
        log::debug!("low complexity {min_complexity:.4} at word length {word_length}: {window}");
    }
    Ok(WindowComplexity {
        low_complexity: min_complexity < params.threshold,
        min_complexity,
        word_length,
        window,
    })
}

/// Per-sequence outcome of [`score_sequences`].
#[derive(Debug)]
pub struct ScoredSequence {
    pub sequence: String,
    pub outcome: Result<WindowComplexity>,
}

/// Batch scoring log.
#[derive(Debug, Default)]
pub struct ComplexitySummary {
    pub scored: Vec<ScoredSequence>,
    /// Sequences whose minimum complexity reached the threshold.
    pub above_threshold: usize,
    /// Sequences that could not be scored.
    pub failed: usize,
}

/// Score many sequences, counting those above threshold and those that could
/// not be scored instead of stopping at the first failure.
pub fn score_sequences<'a>(seqs: impl IntoIterator<Item = &'a str>, params: &ComplexityParams) -> ComplexitySummary {
    let mut summary = ComplexitySummary::default();
    for s in seqs {
        let outcome = moving_window_complexity(s, params);
        match &outcome {
            Ok(v) if !v.low_complexity => summary.above_threshold += 1,
            Ok(_) => {}
            Err(e) => {
                log::warn!("could not score sequence of length {}: {e}", s.len());
                summary.failed += 1;
            }
        }
        summary.scored.push(ScoredSequence { sequence: s.to_string(), outcome });
    }
    log::info!("sequences above threshold: {}", summary.above_threshold);
    summary
}
