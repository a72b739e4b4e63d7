//! Parsing and annotation of the microhomology-mediated BIR event report.
//!
//! The report is plain text written per chromosome by an external search
//! tool. It is read here through a documented, versioned contract,
//! [`ReportFormat::V1`]:
//!
//! ```text
//! <caption line>
//! ###...                                   block marker
//! iBirStart: 1234
//! Consensus/cluster number: 7
//! iDepth: 12
//! sBir: ACGT...
//! sBirReversed: TGCA...
//! <unlabelled line>                        kept in `extra`
//! ref: ...                                 event reference
//! bir: ...                                 event bir sequence
//! TEM: ...
//! Microhomology Insertion: ...             optional
//! Microhomology template: ...              optional
//! readStart: 88
//! ref: ...                                 read alignment
//! bir: ...                                 read alignment
//! <unlabelled lines>                       kept in `extra`
//! ```
//!
//! A block runs from its marker to the caption of the next block (the line
//! before the next marker) or to the end of input. Lines are `Label: value`
//! and may appear in any order, except that `ref`/`bir` before `readStart`
//! belong to the event and after it to the read alignment. A block without a
//! parsable `iBirStart`, or with an empty event `ref` or `bir`, is skipped and
//! the reason recorded in [`ReportParse::skipped`].
//!
//! Annotation adds moving-window complexity of `ref` and `bir`, whether the
//! reverse complement of `sBir` is found in each within the homology budget,
//! and optional gene/exon names from a [`LocusAnnotator`].
//!
use std::path::{Path, PathBuf};
use crate::common::Result;
use crate::complexity::{moving_window_complexity, ComplexityParams, WindowComplexity};
use crate::repeats::verify_imperfect_homology;

/// Report layouts understood by [`parse_report_as`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    V1,
}

/// One event block.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BirEvent {
    pub chromosome: String,
    pub caption: String,
    pub i_bir_start: u64,
    pub cluster: String,
    pub i_depth: String,
    pub s_bir: String,
    pub s_bir_reversed: String,
    pub reference: String,
    pub bir: String,
    pub tem: String,
    pub microhomology_insertion: Option<String>,
    pub microhomology_template: Option<String>,
    pub read_start: Option<String>,
    pub read_ref: Option<String>,
    pub read_bir: Option<String>,
    pub extra: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedBlock {
    /// 1-based line number of the block marker.
    pub line: usize,
    pub caption: String,
    pub reason: String,
}

#[derive(Clone, Debug, Default)]
pub struct ReportParse {
    pub events: Vec<BirEvent>,
    pub skipped: Vec<SkippedBlock>,
}

const MARKER: &str = "###";

/// Parse a report with the current format.
pub fn parse_report(text: &str, chromosome: &str) -> ReportParse {
    parse_report_as(ReportFormat::V1, text, chromosome)
}

pub fn parse_report_as(format: ReportFormat, text: &str, chromosome: &str) -> ReportParse {
    match format {
        ReportFormat::V1 => parse_v1(text, chromosome),
    }
}

fn parse_v1(text: &str, chromosome: &str) -> ReportParse {
    let lines: Vec<&str> = text.lines().collect();
    let markers: Vec<usize> = lines.iter().enumerate()
        .filter(|(_, l)| l.contains(MARKER))
        .map(|(i, _)| i)
        .collect();

    let mut out = ReportParse::default();
    for (b, &m) in markers.iter().enumerate() {
        let caption = if m > 0 { lines[m - 1].trim().to_string() } else { String::new() };
        let end = match markers.get(b + 1) {
            Some(&next) => next.saturating_sub(1).max(m + 1),
            None => lines.len(),
        };
        match parse_block(&lines[m + 1..end], chromosome, &caption) {
            Ok(ev) => out.events.push(ev),
            Err(reason) => {
                log::warn!("{chromosome}: skipping block at line {}: {reason}", m + 1);
                out.skipped.push(SkippedBlock { line: m + 1, caption, reason });
            }
        }
    }
    log::debug!("{chromosome}: {} events, {} blocks skipped", out.events.len(), out.skipped.len());
    out
}

fn parse_block(lines: &[&str], chromosome: &str, caption: &str) -> std::result::Result<BirEvent, String> {
    let mut ev = BirEvent { chromosome: chromosome.to_string(), caption: caption.to_string(), ..Default::default() };
    let mut start: Option<String> = None;
    let mut in_read = false;
    for raw in lines {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let Some((label, value)) = line.split_once(':') else {
            ev.extra.push(line.to_string());
            continue;
        };
        let value = value.trim().to_string();
        match label.trim() {
            "iBirStart" => start = Some(value),
            "Consensus/cluster number" => ev.cluster = value,
            "iDepth" => ev.i_depth = value,
            "sBir" => ev.s_bir = value,
            "sBirReversed" => ev.s_bir_reversed = value,
            "TEM" => ev.tem = value,
            "Microhomology Insertion" => ev.microhomology_insertion = Some(value),
            "Microhomology template" => ev.microhomology_template = Some(value),
            "readStart" => {
                ev.read_start = Some(value);
                in_read = true;
            }
            "ref" if in_read => ev.read_ref = Some(value),
            "bir" if in_read => ev.read_bir = Some(value),
            "ref" => ev.reference = value,
            "bir" => ev.bir = value,
            _ => ev.extra.push(line.to_string()),
        }
    }
    let start = start.ok_or_else(|| "no iBirStart".to_string())?;
    ev.i_bir_start = start.parse().map_err(|e| format!("iBirStart {start:?}: {e}"))?;
    if ev.reference.is_empty() || ev.bir.is_empty() {
        return Err("ref or bir is empty".into());
    }
    Ok(ev)
}

/// Distinct `bir:` sequences from lines longer than `min_len`, in order of
/// first appearance. The length counts the line terminator, so a line of
/// exactly `min_len` characters is kept.
pub fn collect_bir_sequences(text: &str, min_len: usize) -> Vec<String> {
    let mut seen = indexmap::IndexSet::new();
    for line in text.lines() {
        if line.len() < min_len {
            continue;
        }
        if let Some((_, rest)) = line.split_once("bir:") {
            let seq = rest.trim().trim_matches('-');
            if !seq.is_empty() {
                seen.insert(seq.to_string());
            }
        }
    }
    seen.into_iter().collect()
}

/// Gene and exon lookup at a genomic position. No implementation is bundled;
/// callers plug in their own annotation source.
pub trait LocusAnnotator {
    fn genes_at(&self, chromosome: &str, position: u64) -> Vec<String>;
    fn exons_at(&self, chromosome: &str, position: u64) -> Vec<String>;
}

/// Options for [`annotate_events`].
#[derive(Clone, Debug)]
pub struct AnnotationParams {
    pub complexity: ComplexityParams,
    /// Homology for the `sBir` template checks.
    pub min_homology: f64,
}

impl Default for AnnotationParams {
    fn default() -> Self {
        Self { complexity: ComplexityParams::default(), min_homology: 0.8 }
    }
}

#[derive(Clone, Debug)]
pub struct AnnotatedEvent {
    pub event: BirEvent,
    /// `None` when the sequence could not be scored.
    pub ref_complexity: Option<WindowComplexity>,
    pub bir_complexity: Option<WindowComplexity>,
    /// `None` when `sBir` could not be reverse complemented.
    pub homology_check_ref: Option<bool>,
    pub homology_check_bir: Option<bool>,
    pub genes: Vec<String>,
    pub exons: Vec<String>,
}

fn complexity_of(seq: &str, params: &ComplexityParams, what: &str, ev: &BirEvent) -> Option<WindowComplexity> {
    moving_window_complexity(seq, params)
        .map_err(|e| log::warn!("{}:{} {what} complexity: {e}", ev.chromosome, ev.i_bir_start))
        .ok()
}

fn homology_of(target: &str, ev: &BirEvent, min_homology: f64) -> Option<bool> {
    verify_imperfect_homology(target, &ev.s_bir, min_homology)
        .map_err(|e| log::warn!("{}:{} homology check: {e}", ev.chromosome, ev.i_bir_start))
        .ok()
}

pub fn annotate_events(
    events: Vec<BirEvent>,
    params: &AnnotationParams,
    annotator: Option<&dyn LocusAnnotator>,
) -> Vec<AnnotatedEvent> {
    events.into_iter().map(|event| {
        let ref_complexity = complexity_of(&event.reference, &params.complexity, "ref", &event);
        let bir_complexity = complexity_of(&event.bir, &params.complexity, "bir", &event);
        let homology_check_ref = homology_of(&event.reference, &event, params.min_homology);
        let homology_check_bir = homology_of(&event.bir, &event, params.min_homology);
        let (genes, exons) = match annotator {
            Some(a) => (
                a.genes_at(&event.chromosome, event.i_bir_start).into_iter().filter(|g| !g.is_empty()).collect(),
                a.exons_at(&event.chromosome, event.i_bir_start),
            ),
            None => (Vec::new(), Vec::new()),
        };
        AnnotatedEvent { event, ref_complexity, bir_complexity, homology_check_ref, homology_check_bir, genes, exons }
    }).collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of [`annotate_directory`].
#[derive(Debug, Default)]
pub struct AnnotationRun {
    pub events: Vec<AnnotatedEvent>,
    pub skipped_files: Vec<SkippedFile>,
    pub skipped_blocks: Vec<SkippedBlock>,
}

/// Parse and annotate `root/<chromosome>/<file_name>` for every chromosome.
/// Missing, empty or unreadable files are recorded and skipped.
pub fn annotate_directory<P: AsRef<Path>>(
    root: P,
    chromosomes: &[String],
    file_name: &str,
    params: &AnnotationParams,
    annotator: Option<&dyn LocusAnnotator>,
) -> AnnotationRun {
    let mut run = AnnotationRun::default();
    for chrom in chromosomes {
        let path = root.as_ref().join(chrom).join(file_name);
        let text = match std::fs::read_to_string(&path) {
            Ok(t) if t.trim().is_empty() => {
                log::warn!("{} is empty, skipping", path.display());
                run.skipped_files.push(SkippedFile { path, reason: "empty".into() });
                continue;
            }
            Ok(t) => t,
            Err(e) => {
                log::warn!("could not read {}: {e}", path.display());
                run.skipped_files.push(SkippedFile { path, reason: e.to_string() });
                continue;
            }
        };
        let parsed = parse_report(&text, chrom);
        log::info!("{chrom}: {} events", parsed.events.len());
        run.skipped_blocks.extend(parsed.skipped);
        run.events.extend(annotate_events(parsed.events, params, annotator));
    }
    log::info!(
        "annotated {} events, {} files and {} blocks skipped",
        run.events.len(), run.skipped_files.len(), run.skipped_blocks.len()
    );
    run
}

fn opt_bool(v: Option<bool>) -> String {
    v.map(|b| b.to_string()).unwrap_or_default()
}

/// Write annotated events as TSV.
pub fn write_annotations<P: AsRef<Path>>(path: P, events: &[AnnotatedEvent]) -> Result<()> {
    let path = path.as_ref();
    let mut w = csv::WriterBuilder::new().delimiter(b'\t').from_path(path)?;
    w.write_record([
        "chr", "caption", "iBirStart", "Consensus/cluster_number", "iDepth", "sBir", "sBirReversed",
        "ref", "bir", "TEM", "Microhomology_Insertion", "Microhomology_template", "readStart",
        "read_ref", "read_bir", "extra",
        "ref_complexity_fail", "ref_complexity_score", "ref_complexity_word_length",
        "bir_complexity_fail", "bir_complexity_score", "bir_complexity_word_length",
        "homology_check_ref", "homology_check_bir", "genes", "exons",
    ])?;
    for a in events {
        let e = &a.event;
        let complexity = |c: &Option<WindowComplexity>| match c {
            Some(c) => [c.low_complexity.to_string(), c.min_complexity.to_string(), c.word_length.to_string()],
            None => Default::default(),
        };
        let [rf, rs, rk] = complexity(&a.ref_complexity);
        let [bf, bs, bk] = complexity(&a.bir_complexity);
        w.write_record([
            e.chromosome.as_str(), &e.caption, &e.i_bir_start.to_string(), &e.cluster, &e.i_depth,
            &e.s_bir, &e.s_bir_reversed, &e.reference, &e.bir, &e.tem,
            e.microhomology_insertion.as_deref().unwrap_or(""),
            e.microhomology_template.as_deref().unwrap_or(""),
            e.read_start.as_deref().unwrap_or(""),
            e.read_ref.as_deref().unwrap_or(""),
            e.read_bir.as_deref().unwrap_or(""),
            &e.extra.join(" | "),
            &rf, &rs, &rk, &bf, &bs, &bk,
            &opt_bool(a.homology_check_ref), &opt_bool(a.homology_check_bir),
            &a.genes.join(","), &a.exons.join(","),
        ])?;
    }
    w.flush()?;
    log::info!("annotations saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const REF: &str = "ACGTTGCAACGGTCATGCAAGTCCTAGGCTAAGCTT";
    const BIR: &str = "TTTTTTTTTTTTTTTTTTTTTTTTTTAACGGTCATG";

    fn report() -> String {
        format!(
            "header junk\n\
             event one\n\
             ####################\n\
             iBirStart: 1500\n\
             Consensus/cluster number: 3\n\
             iDepth: 12\n\
             sBir: CATGACCGTT\n\
             sBirReversed: TTGCCAGTAC\n\
             alignment follows\n\
             ref: {REF}\n\
             bir: {BIR}\n\
             TEM: 4\n\
             Microhomology Insertion: AC\n\
             Microhomology template: GT\n\
             readStart: 77\n\
             ref: ACGT\n\
             bir: ACGA\n\
             tail line\n\
             event two\n\
             ####################\n\
             iBirStart: 2000\n\
             sBir: AAAA\n\
             ref: \n\
             bir: ACGT\n\
             readStart: 5\n\
             event three\n\
             ###\n\
             iBirStart: 2500\n\
             ref: {REF}\n\
             bir: {BIR}\n\
             TEM: 0\n\
             readStart: 9\n"
        )
    }

    #[test]
    fn parses_labelled_blocks() {
        let parsed = parse_report(&report(), "chr4");
        assert_eq!(parsed.events.len(), 2);
        let ev = &parsed.events[0];
        assert_eq!(ev.caption, "event one");
        assert_eq!(ev.i_bir_start, 1500);
        assert_eq!(ev.cluster, "3");
        assert_eq!(ev.reference, REF);
        assert_eq!(ev.bir, BIR);
        assert_eq!(ev.microhomology_insertion.as_deref(), Some("AC"));
        assert_eq!(ev.read_start.as_deref(), Some("77"));
        assert_eq!(ev.read_ref.as_deref(), Some("ACGT"));
        assert_eq!(ev.read_bir.as_deref(), Some("ACGA"));
        assert_eq!(ev.extra, vec!["alignment follows", "tail line"]);

        let third = &parsed.events[1];
        assert_eq!(third.caption, "event three");
        assert!(third.microhomology_insertion.is_none());
    }

    #[test]
    fn empty_ref_block_is_skipped_with_reason() {
        let parsed = parse_report(&report(), "chr4");
        assert_eq!(parsed.skipped.len(), 1);
        assert_eq!(parsed.skipped[0].caption, "event two");
        assert!(parsed.skipped[0].reason.contains("empty"));
    }

    #[test]
    fn missing_start_is_skipped() {
        let parsed = parse_report("cap\n###\nref: ACGT\nbir: ACGT\n", "chr1");
        assert!(parsed.events.is_empty());
        assert_eq!(parsed.skipped[0].reason, "no iBirStart");
        assert_eq!(parsed.skipped[0].line, 2);
    }

    #[test]
    fn bir_lines_are_collected_once() {
        let long = "A".repeat(120);
        let text = format!("bir: {long}\nref: {long}\nbir: ACGT\nbir:-{long}\n");
        let seqs = collect_bir_sequences(&text, 100);
        assert_eq!(seqs, vec![long]);
    }

    #[test]
    fn bir_line_length_counts_terminator() {
        // "bir: " plus 95 bases is 100 characters, 101 with the newline
        let edge = "C".repeat(95);
        let short = "G".repeat(94);
        let text = format!("bir: {edge}\nbir: {short}\n");
        assert_eq!(collect_bir_sequences(&text, 100), vec![edge]);
    }

    struct Fixed;

    impl LocusAnnotator for Fixed {
        fn genes_at(&self, _chromosome: &str, position: u64) -> Vec<String> {
            vec![format!("GENE{position}"), String::new()]
        }
        fn exons_at(&self, _chromosome: &str, _position: u64) -> Vec<String> {
            vec!["EXON1".into()]
        }
    }

    #[test]
    fn annotation_adds_columns() {
        let parsed = parse_report(&report(), "chr4");
        let out = annotate_events(parsed.events, &AnnotationParams::default(), Some(&Fixed));
        let first = &out[0];
        // revcomp(CATGACCGTT) = AACGGTCATG occurs in both
        assert_eq!(first.homology_check_ref, Some(true));
        assert_eq!(first.homology_check_bir, Some(true));
        assert_eq!(first.bir_complexity.as_ref().map(|c| c.low_complexity), Some(true));
        assert_eq!(first.ref_complexity.as_ref().map(|c| c.low_complexity), Some(false));
        assert_eq!(first.genes, vec!["GENE1500"]);
        assert_eq!(first.exons, vec!["EXON1"]);
        // third block has no sBir; an empty template never matches
        assert_eq!(out[1].homology_check_ref, Some(false));
    }

    #[test]
    fn directory_run_records_missing_and_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("chr1")).unwrap();
        std::fs::write(dir.path().join("chr1").join("out.txt"), report()).unwrap();
        std::fs::create_dir(dir.path().join("chr2")).unwrap();
        std::fs::write(dir.path().join("chr2").join("out.txt"), "").unwrap();
        let chroms: Vec<String> = ["chr1", "chr2", "chr3"].iter().map(|s| s.to_string()).collect();
        let run = annotate_directory(dir.path(), &chroms, "out.txt", &AnnotationParams::default(), None);
        assert_eq!(run.events.len(), 2);
        assert_eq!(run.skipped_files.len(), 2);
        assert_eq!(run.skipped_files[0].reason, "empty");
        assert_eq!(run.skipped_blocks.len(), 1);

        let tsv = dir.path().join("annotated.tsv");
        write_annotations(&tsv, &run.events).unwrap();
        let text = std::fs::read_to_string(&tsv).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().next().unwrap().starts_with("chr\tcaption\tiBirStart"));
    }
}
