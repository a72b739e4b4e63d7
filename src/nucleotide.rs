//! Nucleotide-level helpers: alphabet validation, single-base complement and
//! reverse complement.
//!
//! Complementation is case sensitive and only knows `A`, `C`, `G`, `T` and the
//! gap placeholder `-`; anything else aborts the whole operation.
//!
//! ### Example
//! ```rust
//! use labseq::{reverse_complement, validate_sequence, Alphabet};
//! assert_eq!(reverse_complement("AACG-").unwrap(), "-CGTT");
//! assert!(validate_sequence("ATGC", &Alphabet::default()));
//! assert!(!validate_sequence("ATXC", &Alphabet::default()));
//! ```
//!
use std::collections::HashSet;
use std::hash::Hash;
use crate::common::{LabseqError, Result};

/// Which non-canonical symbols a validation tolerates on top of `ATGCatgc`.
#[derive(Clone, Debug, Default)]
pub struct Alphabet {
    /// Accept `N`/`n`, reported as a soft warning.
    pub allow_n: bool,
    /// Accept the gap placeholder `-`.
    pub allow_gap: bool,
}

impl Alphabet {
    /// Canonical bases plus `N`.
    pub fn with_n() -> Self {
        Self { allow_n: true, allow_gap: false }
    }

    /// Canonical bases plus `-`.
    pub fn with_gap() -> Self {
        Self { allow_n: false, allow_gap: true }
    }
}

/// Outcome of [`check_sequence`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Validation {
    Valid,
    /// Only tolerated `N`s besides canonical bases; `position` is the first one.
    ContainsN { position: usize },
    /// First offending character and its 0-based position.
    Invalid { position: usize, base: char },
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        !matches!(self, Validation::Invalid { .. })
    }
}

/// Check every character of `seq` against `alphabet` without side effects.
pub fn check_sequence(seq: &str, alphabet: &Alphabet) -> Validation {
    let mut first_n = None;
    for (position, base) in seq.chars().enumerate() {
        match base {
            'A' | 'T' | 'G' | 'C' | 'a' | 't' | 'g' | 'c' => {}
            'N' | 'n' if alphabet.allow_n => {
                first_n.get_or_insert(position);
            }
            '-' if alphabet.allow_gap => {}
            _ => return Validation::Invalid { position, base },
        }
    }
    match first_n {
        Some(position) => Validation::ContainsN { position },
        None => Validation::Valid,
    }
}

/// Boolean validation that logs the reason for a rejection (or a softer
/// warning when tolerated `N`s are present).
pub fn validate_sequence(seq: &str, alphabet: &Alphabet) -> bool {
    match check_sequence(seq, alphabet) {
        Validation::Valid => true,
        Validation::ContainsN { position } => {
            log::warn!("sequence contains N (first at position {position})");
            true
        }
        Validation::Invalid { position, base } => {
            log::warn!("sequence contains non-canonical nucleotide {base:?} at position {position}");
            false
        }
    }
}

/// Complement a single base: A<->T, G<->C, `-`<->`-`.
pub fn complement(base: char) -> Result<char> {
    match base {
        'A' => Ok('T'),
        'T' => Ok('A'),
        'G' => Ok('C'),
        'C' => Ok('G'),
        '-' => Ok('-'),
        _ => Err(LabseqError::InvalidBase { base }),
    }
}

/// Reverse complement of `seq`; the first uncomplementable base fails the
/// whole call.
pub fn reverse_complement(seq: &str) -> Result<String> {
    seq.chars().rev().map(complement).collect()
}

/// Distinct items of `items`, in first-seen order.
pub fn unique<T: Eq + Hash + Clone>(items: &[T]) -> Vec<T> {
    let mut seen: HashSet<&T> = HashSet::new();
    items.iter().filter(|x| seen.insert(*x)).cloned().collect()
}
