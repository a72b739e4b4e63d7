//! Bounded edit-distance substring search.
//!
//! [`find_iter`] reports every non-overlapping occurrence of a pattern in a
//! haystack that can be reached with at most `max_errors` substitutions,
//! insertions or deletions, scanning greedily from the left.
//!
//! ### Algorithm
//! For each candidate start `i` an *anchored* dynamic program aligns the whole
//! pattern against the text prefixes `hay[i..i+t]`, `t <= m + max_errors`:
//! ```text
//! D[0][0] = 0,  D[0][t] = inf (t > 0),  D[q][0] = q
//! D[q][t] = min(D[q-1][t-1] + [p[q-1] != h[i+t-1]], D[q-1][t] + 1, D[q][t-1] + 1)
//! ```
//! An alignment never opens with an inserted text symbol: such a hit always
//! has a cheaper twin one base to the right. Only two rows are kept. The last
//! row gives the distance of every possible end; the smallest distance wins,
//! then the span whose length is closest to the pattern's, then the shorter.
//! The first start whose best distance is within budget yields the match and
//! the scan resumes at its end. Cost is `O(n * m * (m + k))`, which is fine for the
//! short seeds and windows this crate feeds it.
//!
//! Matching is case sensitive and counts every symbol, `N` included, as a
//! letter.
//!
//! ### Example
//! ```rust
//! use labseq::fuzzy;
//! let hits = fuzzy::find_iter("GGACGAACGTGG", "ACGT", 1);
//! assert_eq!(hits.len(), 2);
//! assert_eq!(hits[0].text, "ACGA");
//! assert_eq!(hits[1].distance, 0);
//! ```
//!

/// One match of [`find_iter`]; `start..end` are char offsets into the haystack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FuzzyMatch {
    pub start: usize,
    pub end: usize,
    /// Edit distance between the pattern and `text`.
    pub distance: usize,
    pub text: String,
}

/// Levenshtein distance between `a` and `b`.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0usize; b.len() + 1];
    for i in 1..=a.len() {
        cur[0] = i;
        for j in 1..=b.len() {
            let diag = prev[j - 1] + usize::from(a[i - 1] != b[j - 1]);
            cur[j] = diag.min(prev[j] + 1).min(cur[j - 1] + 1);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

const BLOCKED: usize = usize::MAX / 2;

/// Best `(end_offset, distance)` of the pattern anchored at the start of
/// `text`, or `None` if every non-empty span exceeds `max_errors`.
fn best_anchored(text: &[char], pat: &[char], max_errors: usize) -> Option<(usize, usize)> {
    let width = text.len().min(pat.len() + max_errors);
    if width == 0 {
        return None;
    }
    let mut prev = vec![BLOCKED; width + 1];
    prev[0] = 0;
    let mut cur = vec![0usize; width + 1];
    for q in 1..=pat.len() {
        cur[0] = q;
        let mut row_min = cur[0];
        for t in 1..=width {
            let diag = prev[t - 1] + usize::from(pat[q - 1] != text[t - 1]);
            cur[t] = diag.min(prev[t] + 1).min(cur[t - 1] + 1);
            row_min = row_min.min(cur[t]);
        }
        // every later row is at least this row's minimum
        if row_min > max_errors {
            return None;
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    let m = pat.len();
    prev.iter()
        .enumerate()
        .skip(1)
        .filter(|&(_, &d)| d <= max_errors)
        .min_by_key(|&(t, &d)| (d, t.abs_diff(m), t))
        .map(|(t, &d)| (t, d))
}

/// All greedy leftmost, non-overlapping matches of `pattern` in `haystack`
/// with at most `max_errors` edits. An empty pattern matches nothing.
pub fn find_iter(haystack: &str, pattern: &str, max_errors: usize) -> Vec<FuzzyMatch> {
    let hay: Vec<char> = haystack.chars().collect();
    let pat: Vec<char> = pattern.chars().collect();
    let mut out = Vec::new();
    if pat.is_empty() {
        return out;
    }
    let mut i = 0usize;
    while i < hay.len() {
        match best_anchored(&hay[i..], &pat, max_errors) {
            Some((len, distance)) => {
                out.push(FuzzyMatch {
                    start: i,
                    end: i + len,
                    distance,
                    text: hay[i..i + len].iter().collect(),
                });
                i += len;
            }
            None => i += 1,
        }
    }
    out
}

/// Whether `pattern` occurs in `haystack` within `max_errors` edits.
pub fn is_match(haystack: &str, pattern: &str, max_errors: usize) -> bool {
    let hay: Vec<char> = haystack.chars().collect();
    let pat: Vec<char> = pattern.chars().collect();
    !pat.is_empty() && (0..hay.len()).any(|i| best_anchored(&hay[i..], &pat, max_errors).is_some())
}
