//! Inverted-repeat and imperfect-homology search.
//!
//! The search is brute force: every window start and every seed
//! length is tried, and each candidate is compared either exactly or through
//! the bounded edit-distance matcher in [`crate::fuzzy`]. There is no index.
//!
//! ### Inverted repeats
//! Within a window the first `query_length` bases form the *seed*. With
//! `inverted` set, the reverse complement of the seed is what is looked for
//! downstream (a hairpin stem), skipping `min_spacer` bases after the seed.
//! Hits are labelled with the seed itself, so a key of [`RepeatResults`] is a
//! stretch of the input and its values are the downstream partners.
//!
//! ### Example
//! ```rust
//! use labseq::{search_sequence_for_repeats, RepeatParams};
//! let params = RepeatParams { min_query_length: 4, max_query_length: 4, ..Default::default() };
//! let found = search_sequence_for_repeats("AACCAAAAGGTT", &params).unwrap();
//! assert_eq!(found.repeats["AACC"], vec!["GGTT".to_string()]);
//! ```
//!
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use indexmap::IndexMap;
use serde::Serialize;
use crate::common::{LabseqError, Result};
use crate::fuzzy;
use crate::nucleotide::reverse_complement;

/// Error budget of a fuzzy comparison.
#[derive(Clone, Debug)]
pub struct HomologyParams {
    /// Minimum fraction of matching bases, in `[0, 1]`.
    pub min_homology: f64,
    /// Fixed number of tolerated edits; overrides `min_homology` when set.
    pub fixed_errors: Option<usize>,
    /// Label hits with the reverse complement of the searched query.
    pub inverted: bool,
}

impl Default for HomologyParams {
    fn default() -> Self {
        Self { min_homology: 0.8, fixed_errors: None, inverted: true }
    }
}

/// Options for [`find_inverted_repeat`].
#[derive(Clone, Debug)]
pub struct InvertedRepeatParams {
    pub query_length: usize,
    /// Bases skipped between the seed and the first candidate.
    pub min_spacer: usize,
    /// Compare candidates through the fuzzy matcher instead of exactly.
    pub imperfect_homology: bool,
    pub homology: HomologyParams,
}

impl Default for InvertedRepeatParams {
    fn default() -> Self {
        Self { query_length: 4, min_spacer: 4, imperfect_homology: false, homology: HomologyParams::default() }
    }
}

/// Options for [`search_sequence_for_repeats`].
#[derive(Clone, Debug)]
pub struct RepeatParams {
    pub min_query_length: usize,
    pub max_query_length: usize,
    pub min_spacer: usize,
    /// Length of the window handed to [`find_inverted_repeat`] at each offset.
    pub window_size: usize,
    pub imperfect_homology: bool,
    pub homology: HomologyParams,
}

impl Default for RepeatParams {
    fn default() -> Self {
        Self {
            min_query_length: 4,
            max_query_length: 25,
            min_spacer: 0,
            window_size: 250,
            imperfect_homology: false,
            homology: HomologyParams::default(),
        }
    }
}

/// A seed (or query) and the substrings that matched it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RepeatMatch {
    pub query: String,
    pub matches: Vec<String>,
}

/// Aggregated hits of a scan, keyed by seed in first-seen order.
#[derive(Clone, Debug, Default)]
pub struct RepeatResults {
    pub repeats: IndexMap<String, Vec<String>>,
    /// Windows whose seed held a base without a complement.
    pub skipped_windows: usize,
}

impl RepeatResults {
    fn insert(&mut self, m: RepeatMatch) {
        let entry = self.repeats.entry(m.query).or_default();
        for hit in m.matches {
            if !entry.contains(&hit) {
                entry.push(hit);
            }
        }
    }

    /// Fold `other` into `self`; seeds keep first-seen order and partners
    /// stay unique per seed.
    pub fn merge(&mut self, other: RepeatResults) {
        for (query, matches) in other.repeats {
            self.insert(RepeatMatch { query, matches });
        }
        self.skipped_windows += other.skipped_windows;
    }

    /// Flat `{query: [matches]}` JSON object.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.repeats)?)
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| LabseqError::file(path, e))?;
        serde_json::to_writer(BufWriter::new(file), &self.repeats)?;
        Ok(())
    }
}

/// Edits tolerated for a query of `query_len` bases:
/// `round(query_len * (1 - min_homology))` (ties to even), unless
/// `fixed_errors` is set.
pub fn allowed_errors(query_len: usize, params: &HomologyParams) -> Result<usize> {
    if let Some(fixed) = params.fixed_errors {
        return Ok(fixed);
    }
    if !(0.0..=1.0).contains(&params.min_homology) {
        return Err(LabseqError::InvalidParameter(format!(
            "min_homology must be within [0, 1], got {}", params.min_homology
        )));
    }
    Ok((query_len as f64 * (1.0 - params.min_homology)).round_ties_even() as usize)
}

/// Look for `query` in `seq` within the error budget of `params`.
///
/// Returns every non-overlapping hit under one label: the query, or its
/// reverse complement when `params.inverted` is set. No hit is `Ok(None)`.
pub fn imperfect_homology_search(seq: &str, query: &str, params: &HomologyParams) -> Result<Option<RepeatMatch>> {
    let errors = allowed_errors(query.chars().count(), params)?;
    let label = if params.inverted { reverse_complement(query)? } else { query.to_string() };
    let hits = fuzzy::find_iter(seq, query, errors);
    if hits.is_empty() {
        return Ok(None);
    }
    if hits.len() > 1 {
        log::debug!("{} separate templates for {label} in a single window", hits.len());
    }
    log::debug!("possible template(s) for {label}: {:?}", hits.iter().map(|h| &h.text).collect::<Vec<_>>());
    Ok(Some(RepeatMatch { query: label, matches: hits.into_iter().map(|h| h.text).collect() }))
}

/// Search one window for partners of its leading seed.
///
/// ## Errors
/// [`LabseqError::InvalidBase`] if the seed cannot be reverse complemented.
pub fn find_inverted_repeat(seq: &str, params: &InvertedRepeatParams) -> Result<Vec<RepeatMatch>> {
    let ql = params.query_length;
    let chars: Vec<char> = seq.chars().collect();
    if ql == 0 || chars.len() < ql {
        return Ok(Vec::new());
    }
    let seed: String = chars[..ql].iter().collect();
    let inverted = params.homology.inverted;
    let query = if inverted { reverse_complement(&seed)? } else { seed.clone() };
    let label = if inverted { seed } else { query.clone() };

    let rest = chars.get(ql + params.min_spacer..).unwrap_or(&[]);
    let mut out = Vec::new();
    for window in rest.windows(ql) {
        let candidate: String = window.iter().collect();
        if params.imperfect_homology {
            if let Some(hit) = imperfect_homology_search(&candidate, &query, &params.homology)? {
                out.push(hit);
            }
        } else if candidate == query {
            log::trace!("inverted repeat {label} / {candidate}");
            out.push(RepeatMatch { query: label.clone(), matches: vec![candidate] });
        }
    }
    Ok(out)
}

/// Scan `seq` for repeats of every seed length in
/// `min_query_length..=max_query_length`, starting a window at every offset.
///
/// Windows near the end are shorter than `window_size`. A window whose seed
/// cannot be complemented is counted in
/// [`RepeatResults::skipped_windows`] and the scan continues.
pub fn search_sequence_for_repeats(seq: &str, params: &RepeatParams) -> Result<RepeatResults> {
    if params.min_query_length == 0 || params.min_query_length > params.max_query_length {
        return Err(LabseqError::InvalidParameter(format!(
            "query length range {}..={} is empty", params.min_query_length, params.max_query_length
        )));
    }
    if params.window_size == 0 {
        return Err(LabseqError::InvalidParameter("window_size must be > 0".into()));
    }
    if params.imperfect_homology {
        match params.homology.fixed_errors {
            Some(e) => log::info!("searching for quasi-palindromes, allowing up to {e} errors"),
            None => log::info!("searching for quasi-palindromes with at least {} homology", params.homology.min_homology),
        }
    } else {
        log::info!("searching for perfect palindromes");
    }

    let chars: Vec<char> = seq.chars().collect();
    let mut results = RepeatResults::default();
    for query_length in params.min_query_length..=params.max_query_length {
        log::debug!("searching for {query_length}bp inverted repeats");
        let single = InvertedRepeatParams {
            query_length,
            min_spacer: params.min_spacer,
            imperfect_homology: params.imperfect_homology,
            homology: params.homology.clone(),
        };
        for start in 0..chars.len() {
            let end = (start + params.window_size).min(chars.len());
            let window: String = chars[start..end].iter().collect();
            match find_inverted_repeat(&window, &single) {
                Ok(pairs) => pairs.into_iter().for_each(|p| results.insert(p)),
                Err(LabseqError::InvalidBase { base }) => {
                    log::trace!("skipping window at {start}: seed base {base:?}");
                    results.skipped_windows += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
    if results.skipped_windows > 0 {
        log::warn!("{} windows skipped because their seed held non-complementable bases", results.skipped_windows);
    }
    log::info!("{} distinct repeat seeds found", results.repeats.len());
    Ok(results)
}

/// Whether the reverse complement of `query` occurs in `reference` with at
/// most `min(round(len * (1 - min_homology)), 10)` edits.
pub fn verify_imperfect_homology(reference: &str, query: &str, min_homology: f64) -> Result<bool> {
    let target = reverse_complement(query)?;
    let params = HomologyParams { min_homology, fixed_errors: None, inverted: false };
    let errors = allowed_errors(target.chars().count(), &params)?.min(10);
    let found = fuzzy::is_match(reference, &target, errors);
    log::debug!("template for {query} {} in reference", if found { "found" } else { "not found" });
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_budget() {
        let p = HomologyParams::default();
        assert_eq!(allowed_errors(4, &p).unwrap(), 1);
        assert_eq!(allowed_errors(10, &p).unwrap(), 2);
        assert_eq!(allowed_errors(25, &p).unwrap(), 5);
        let exact = HomologyParams { min_homology: 1.0, ..Default::default() };
        assert_eq!(allowed_errors(25, &exact).unwrap(), 0);
        let fixed = HomologyParams { fixed_errors: Some(3), ..Default::default() };
        assert_eq!(allowed_errors(4, &fixed).unwrap(), 3);
        let bad = HomologyParams { min_homology: 1.5, ..Default::default() };
        assert!(allowed_errors(4, &bad).is_err());
    }

    #[test]
    fn homology_search_labels_and_absence() {
        let p = HomologyParams { min_homology: 1.0, ..Default::default() };
        let hit = imperfect_homology_search("TTAACCTT", "AACC", &p).unwrap().unwrap();
        assert_eq!(hit.query, "GGTT");
        assert_eq!(hit.matches, vec!["AACC"]);
        assert!(imperfect_homology_search("TTTTTTTT", "AACC", &p).unwrap().is_none());

        let plain = HomologyParams { min_homology: 1.0, inverted: false, ..Default::default() };
        let hit = imperfect_homology_search("TTAACCTT", "AACC", &plain).unwrap().unwrap();
        assert_eq!(hit.query, "AACC");
    }

    #[test]
    fn homology_search_prefers_exact_over_padded_hit() {
        let p = HomologyParams { min_homology: 0.75, ..Default::default() };
        let hit = imperfect_homology_search("GACGTT", "ACGT", &p).unwrap().unwrap();
        assert_eq!(hit.matches, vec!["ACGT"]);
    }

    #[test]
    fn homology_search_rejects_bad_query_base() {
        let err = imperfect_homology_search("ACGT", "ANGT", &HomologyParams::default()).unwrap_err();
        assert!(matches!(err, LabseqError::InvalidBase { base: 'N' }));
    }

    #[test]
    fn inverted_repeat_exact() {
        let p = InvertedRepeatParams { min_spacer: 2, ..Default::default() };
        let hits = find_inverted_repeat("AACCTTGGTTAA", &p).unwrap();
        assert_eq!(hits, vec![RepeatMatch { query: "AACC".into(), matches: vec!["GGTT".into()] }]);
        // the spacer hides a partner directly after the seed
        let hits = find_inverted_repeat("AACCGGTT", &InvertedRepeatParams::default()).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn inverted_repeat_fuzzy() {
        let p = InvertedRepeatParams {
            min_spacer: 0,
            imperfect_homology: true,
            homology: HomologyParams { fixed_errors: Some(1), ..Default::default() },
            ..Default::default()
        };
        // GGTA is one substitution away from GGTT
        let hits = find_inverted_repeat("AACCCCCCGGTA", &p).unwrap();
        assert!(hits.iter().any(|h| h.query == "AACC" && h.matches == vec!["GGTA".to_string()]));
    }

    #[test]
    fn direct_repeat_when_not_inverted() {
        let p = InvertedRepeatParams {
            min_spacer: 0,
            homology: HomologyParams { inverted: false, ..Default::default() },
            ..Default::default()
        };
        let hits = find_inverted_repeat("ACGTTTACGT", &p).unwrap();
        assert_eq!(hits, vec![RepeatMatch { query: "ACGT".into(), matches: vec!["ACGT".into()] }]);
    }

    #[test]
    fn scan_skips_uncomplementable_seeds() {
        let params = RepeatParams { min_query_length: 4, max_query_length: 4, ..Default::default() };
        let found = search_sequence_for_repeats("NACCAAAAGGTT", &params).unwrap();
        assert!(found.skipped_windows >= 1);
        assert!(!found.repeats.contains_key("NACC"));
    }

    #[test]
    fn scan_rejects_empty_range() {
        let params = RepeatParams { min_query_length: 5, max_query_length: 4, ..Default::default() };
        assert!(search_sequence_for_repeats("ACGT", &params).is_err());
    }

    #[test]
    fn results_serialise_flat() {
        let params = RepeatParams { min_query_length: 4, max_query_length: 4, ..Default::default() };
        let found = search_sequence_for_repeats("AACCAAAAGGTT", &params).unwrap();
        assert_eq!(found.to_json().unwrap(), r#"{"AACC":["GGTT"]}"#);
    }

    #[test]
    fn merged_results_stay_flat() {
        let params = RepeatParams { min_query_length: 4, max_query_length: 4, ..Default::default() };
        let mut all = search_sequence_for_repeats("AACCAAAAGGTT", &params).unwrap();
        all.merge(search_sequence_for_repeats("AACCTTTTGGTTNACC", &params).unwrap());
        assert_eq!(all.repeats["AACC"], vec!["GGTT"]);
        assert!(all.skipped_windows >= 1);
        let json: serde_json::Value = serde_json::from_str(&all.to_json().unwrap()).unwrap();
        assert!(json["AACC"].is_array());
    }

    #[test]
    fn verify_homology_caps_errors() {
        // reverse complement of AACC is GGTT
        assert!(verify_imperfect_homology("CCCGGTTCCC", "AACC", 1.0).unwrap());
        assert!(!verify_imperfect_homology("CCCCCCCCCC", "AACC", 1.0).unwrap());
        assert!(verify_imperfect_homology("CCCGGTACCC", "AACC", 0.75).unwrap());
    }
}
