//! Oligonucleotide (k-mer) frequency counting.
//!
//! A stride-1 sliding window collects every length-`k` word of a sequence,
//! uppercased; a trailing window shorter than `k` is dropped. Counts are then
//! tallied per distinct word and can be turned into a normalised table sorted
//! by descending frequency, which is what the lab plots as a bar chart.
//!
//! ### Example
//! ```rust
//! use labseq::{find_pairings, count_frequencies};
//! let words = find_pairings("atgcat", 2);
//! assert_eq!(words, ["AT", "TG", "GC", "CA", "AT"]);
//! assert_eq!(count_frequencies(&words)["AT"], 2);
//! ```
//!
use std::collections::HashMap;
use std::hash::Hash;
use serde::Serialize;
use crate::common::FastaRecord;
use crate::nucleotide::{validate_sequence, Alphabet};

/// Every length-`k` window of `seq` (stride 1), uppercased.
pub fn find_pairings(seq: &str, k: usize) -> Vec<String> {
    if k == 0 {
        return Vec::new();
    }
    let upper: Vec<char> = seq.chars().map(|c| c.to_ascii_uppercase()).collect();
    upper.windows(k).map(|w| w.iter().collect()).collect()
}

/// Occurrence count of each distinct item.
pub fn count_frequencies<T: Eq + Hash + Clone>(items: &[T]) -> HashMap<T, usize> {
    let mut counts: HashMap<T, usize> = HashMap::new();
    for item in items {
        *counts.entry(item.clone()).or_default() += 1;
    }
    counts
}

/// One row of a frequency table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OligoFrequency {
    pub oligo: String,
    pub count: usize,
    /// `count` over the total number of words counted.
    pub frequency: f64,
}

/// Normalise counts into rows sorted by descending count, ties by oligo.
pub fn frequency_table(counts: &HashMap<String, usize>) -> Vec<OligoFrequency> {
    let total: usize = counts.values().sum();
    let mut rows: Vec<OligoFrequency> = counts.iter()
        .map(|(oligo, &count)| OligoFrequency {
            oligo: oligo.clone(),
            count,
            frequency: if total == 0 { 0.0 } else { count as f64 / total as f64 },
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.oligo.cmp(&b.oligo)));
    rows
}

/// Di- and mononucleotide tables of one record.
#[derive(Clone, Debug)]
pub struct OligoProfile {
    pub id: String,
    pub dinucleotides: Vec<OligoFrequency>,
    pub mononucleotides: Vec<OligoFrequency>,
}

/// Result of [`oligo_frequency_analysis`].
#[derive(Clone, Debug, Default)]
pub struct OligoAnalysis {
    pub profiles: Vec<OligoProfile>,
    /// Titles of records that failed validation.
    pub skipped: Vec<String>,
}

/// Profile every record whose sequence passes strict validation; the rest are
/// listed in [`OligoAnalysis::skipped`].
pub fn oligo_frequency_analysis(records: &[FastaRecord]) -> OligoAnalysis {
    let strict = Alphabet::default();
    let mut out = OligoAnalysis::default();
    for rec in records {
        if !validate_sequence(&rec.seq, &strict) {
            log::warn!("skipping {:?}: sequence validation failed", rec.id);
            out.skipped.push(rec.id.clone());
            continue;
        }
        let di = count_frequencies(&find_pairings(&rec.seq, 2));
        let mono = count_frequencies(&find_pairings(&rec.seq, 1));
        out.profiles.push(OligoProfile {
            id: rec.id.clone(),
            dinucleotides: frequency_table(&di),
            mononucleotides: frequency_table(&mono),
        });
    }
    out
}
