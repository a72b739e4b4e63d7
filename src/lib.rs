//! # labseq
//!
//! Sequence and table utilities for a molecular-biology wet lab.
//!
//! The crate is a set of small, mostly stateless transformations:
//!
//! - [`common`]: the error type and the FASTA loader.
//! - [`nucleotide`]: alphabet validation, complement and reverse complement.
//! - [`kmers`]: oligonucleotide counting and frequency tables.
//! - [`complexity`]: linguistic complexity over sliding windows.
//! - [`fuzzy`]: bounded edit-distance substring search.
//! - [`repeats`]: inverted repeats and imperfect homology.
//! - [`variants`]: variant table filtering, spectra, clone subtraction and a
//!   random-locus null model.
//! - [`parallel`]: split a table, fan a script out over the slices, join.
//! - [`report`]: parse and annotate the BIR event report.
//! - [`reference`]: rename assembly FASTA headers to chromosome names.
//! - [`amplicon`]: SAM read loading, primer trimming and classification of
//!   amplicon reads.
//! - [`bench`]: dilution plans and population doublings.
//!
//! All outputs are files (TSV, CSV, JSON or FASTA); nothing is kept between
//! calls.
//!
//! ### Example
//! ```
//! use labseq::{reverse_complement, search_sequence_for_repeats, RepeatParams};
//! assert_eq!(reverse_complement("AACC").unwrap(), "GGTT");
//! let params = RepeatParams { min_query_length: 4, max_query_length: 4, ..Default::default() };
//! let found = search_sequence_for_repeats("AACCAAAAGGTT", &params).unwrap();
//! assert_eq!(found.repeats["AACC"], vec!["GGTT".to_string()]);
//! ```
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod common;
pub mod nucleotide;
pub mod kmers;
pub mod complexity;
pub mod fuzzy;
pub mod repeats;
pub mod variants;
pub mod parallel;
pub mod report;
pub mod reference;
pub mod amplicon;
pub mod bench;

pub use common::*;
pub use nucleotide::*;
pub use kmers::*;
pub use complexity::*;
pub use repeats::*;
pub use variants::*;
pub use parallel::*;
pub use report::*;
pub use reference::*;
pub use amplicon::*;
pub use bench::*;
