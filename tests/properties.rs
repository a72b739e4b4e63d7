//! Behavioural properties of the public API.

use labseq::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn reverse_complement_is_an_involution() {
    for s in ["", "A", "ACGT", "GATTACA", "AC-GT--T", "TTTTGGGGCCCCAAAA"] {
        let rc = reverse_complement(s).unwrap();
        assert_eq!(rc.len(), s.len());
        assert_eq!(reverse_complement(&rc).unwrap(), s);
    }
}

#[test]
fn reverse_complement_rejects_lowercase_and_n() {
    assert!(matches!(reverse_complement("ACgT"), Err(LabseqError::InvalidBase { base: 'g' })));
    assert!(reverse_complement("ACNT").is_err());
}

#[test]
fn pairings_of_short_input_are_empty() {
    assert_eq!(find_pairings("ATGC", 2), vec!["AT", "TG", "GC"]);
    assert!(find_pairings("AT", 3).is_empty());
}

#[test]
fn homopolymer_complexity() {
    let seq = "AAAAAAAAAA";
    for k in 2..=8 {
        let expected = 1.0 / (4usize.pow(k as u32)).min(seq.len() - k + 1) as f64;
        assert!((complexity_score(seq, k, 0.2).complexity - expected).abs() < 1e-12);
    }
}

#[test]
fn validation() {
    assert!(validate_sequence("ATGC", &Alphabet::default()));
    assert!(!validate_sequence("ATXC", &Alphabet::default()));
    assert!(validate_sequence("ATNC", &Alphabet::with_n()));
}

#[test]
fn full_homology_is_exact_search() {
    let params = HomologyParams { min_homology: 1.0, ..Default::default() };
    let hit = imperfect_homology_search("GGGAACCGGG", "AACC", &params).unwrap().unwrap();
    assert_eq!(hit.matches, vec!["AACC"]);
    assert!(imperfect_homology_search("GGGAACGGGG", "AACC", &params).unwrap().is_none());
}

#[test]
fn known_inverted_repeat_is_found() {
    let params = RepeatParams { min_query_length: 4, max_query_length: 4, ..Default::default() };
    let found = search_sequence_for_repeats("AACCAAAAGGTT", &params).unwrap();
    assert_eq!(found.repeats.get("AACC"), Some(&vec!["GGTT".to_string()]));
    assert_eq!(found.skipped_windows, 0);
    assert_eq!(found.to_json().unwrap(), r#"{"AACC":["GGTT"]}"#);
}

#[test]
fn split_then_join_preserves_rows_for_any_slice_count() {
    let dir = TempDir::new().unwrap();
    for rows in [0usize, 1, 5, 12] {
        let input = dir.path().join(format!("in_{rows}.csv"));
        let mut text = String::from("a,b\n");
        for i in 0..rows {
            text.push_str(&format!("{i},{}\n", i * i));
        }
        fs::write(&input, &text).unwrap();
        for slices in 1..=6 {
            let root = dir.path().join(format!("s_{rows}_{slices}"));
            let paths = split_table(&input, slices, &root).unwrap();
            assert_eq!(paths.len(), slices);
            let out = dir.path().join(format!("out_{rows}_{slices}.csv"));
            assert_eq!(join_slices(&paths, &out).unwrap(), rows);
            assert_eq!(fs::read_to_string(&out).unwrap(), text);
            assert_eq!(clean_up_slices(&paths), slices);
        }
    }
}
