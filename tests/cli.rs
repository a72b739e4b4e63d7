//! CLI integration tests.
//! Runs the `labseq` binary end to end on small files in a temporary directory.

use assert_cmd::assert::OutputAssertExt;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn labseq_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_labseq"))
}

#[test]
fn test_cli_help() {
    labseq_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("random-loci"));
}

#[test]
fn test_kmers_writes_table() {
    let dir = TempDir::new().unwrap();
    let fasta = dir.path().join("in.fa");
    fs::write(&fasta, ">s1\nATGCAT\n>bad\nATXC\n").unwrap();
    let out = dir.path().join("oligos.tsv");

    labseq_cmd()
        .args(["kmers", fasta.to_str().unwrap(), "--outfile", out.to_str().unwrap()])
        .assert()
        .success();

    let table = fs::read_to_string(&out).unwrap();
    assert!(table.starts_with("id\tk\toligo\tcount\tfrequency"));
    assert!(table.contains("s1\t2\tAT\t2\t"));
    assert!(!table.contains("bad"));
}

#[test]
fn test_kmers_missing_file_fails() {
    labseq_cmd()
        .args(["kmers", "/nonexistent/in.fa"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("read FASTA"));
}

#[test]
fn test_complexity_flags_low_complexity() {
    let dir = TempDir::new().unwrap();
    let fasta = dir.path().join("in.fa");
    fs::write(&fasta, ">poly\nAAAAAAAAAAAAAAAAAAAAAAAA\n>short\nACG\n").unwrap();
    let out = dir.path().join("c.tsv");

    labseq_cmd()
        .args(["complexity", fasta.to_str().unwrap(), "--outfile", out.to_str().unwrap()])
        .assert()
        .success();

    let table = fs::read_to_string(&out).unwrap();
    let rows: Vec<&str> = table.lines().collect();
    assert_eq!(rows.len(), 3);
    assert!(rows[1].starts_with("poly\ttrue\t"));
    assert!(rows[2].starts_with("short\t"));
    assert!(rows[2].contains("shorter than the window size"));
}

#[test]
fn test_repeats_json() {
    let dir = TempDir::new().unwrap();
    let fasta = dir.path().join("in.fa");
    fs::write(&fasta, ">r\nAACCAAAAGGTT\n>s\nAACCTTTTGGTT\n").unwrap();
    let out = dir.path().join("r.json");

    labseq_cmd()
        .args([
            "repeats", fasta.to_str().unwrap(),
            "--min-query-length", "4", "--max-query-length", "4",
            "--outfile", out.to_str().unwrap(),
        ])
        .assert()
        .success();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    // one flat object over both records, partners deduplicated
    let obj = json.as_object().unwrap();
    assert!(!obj.contains_key("r") && !obj.contains_key("s"));
    assert_eq!(json["AACC"], serde_json::json!(["GGTT"]));
}

#[test]
fn test_amplicon_table() {
    let dir = TempDir::new().unwrap();
    let reads = dir.path().join("reads");
    fs::create_dir(&reads).unwrap();
    fs::write(
        reads.join("clone_01.sam"),
        "@HD\tVN:1.6\n\
         del\t0\tamp\t1\t60\t18M\t*\t0\t0\tNNNGGATCCCTCGAGNNN\t*\n\
         wt\t0\tamp\t1\t60\t26M\t*\t0\t0\tAGGATCCAAACCCGGGTTTCTCGAGA\t*\n\
         none\t0\tamp\t1\t60\t8M\t*\t0\t0\tAAAAAAAA\t*\n",
    ).unwrap();
    let out = dir.path().join("amp.tsv");

    labseq_cmd()
        .args([
            "amplicon", "--dir", reads.to_str().unwrap(),
            "--forward", "GGATCC", "--reverse", "CTCGAG",
            "--wild-type", "TTGGATCCAAACCCGGGTTTCTCGAGTT",
            "--class", "deletion=TTGGATCCCTCGAGTT",
            "--outfile", out.to_str().unwrap(),
        ])
        .assert()
        .success();

    let text = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], "clone_01\tdel\tGGATCCCTCGAG\t12\ttrue\ttrue\tdeletion");
    assert!(lines[2].starts_with("clone_01\twt\tno_excision\t"));
    assert!(lines[3].starts_with("clone_01\tnone\tno_primers\t"));
}

#[test]
fn test_amplicon_rejects_bad_class() {
    let dir = TempDir::new().unwrap();
    labseq_cmd()
        .args([
            "amplicon", "--dir", dir.path().to_str().unwrap(),
            "--forward", "GGATCC", "--reverse", "CTCGAG", "--wild-type", "ACGT",
            "--class", "deletion",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("LABEL=SEQUENCE"));
}

#[test]
fn test_variants_pipeline() {
    let dir = TempDir::new().unwrap();
    let calls = dir.path().join("calls");
    fs::create_dir(&calls).unwrap();
    let header = "CHROM\tPOS\tREF\tALT\tTYPE\tx.AD\tx.AF\n";
    fs::write(calls.join("sampleA_.tsv"), format!("{header}chr1\t10\tC\tT\tSNP\t2,20\t0.9\nchr1\t50\tG\tA\tSNP\t10,10\t0.5\n")).unwrap();
    fs::write(calls.join("sampleB_.tsv"), format!("{header}chr1\t10\tC\tT\tSNP\t3,30\t0.9\n")).unwrap();
    let out = dir.path().join("v.tsv");

    labseq_cmd()
        .args([
            "variants", "--dir", calls.to_str().unwrap(),
            "--subtract-shared", "--outfile", out.to_str().unwrap(),
        ])
        .assert()
        .success();

    let table = fs::read_to_string(&out).unwrap();
    let rows: Vec<&str> = table.lines().collect();
    assert_eq!(rows.len(), 2);
    assert!(rows[1].starts_with("sampleA_\tchr1\t50\tG\tA\tSNP"));
    assert!(rows[1].contains("C_to_T\tG_to_A\tHeterozygous"));
}

#[test]
fn test_random_loci_is_reproducible() {
    let dir = TempDir::new().unwrap();
    let chroms = dir.path().join("chroms.tsv");
    fs::write(&chroms, "chromosome\tend_position\nchr1\t100\nchr4\t50\n").unwrap();
    let run = |name: &str| {
        let out = dir.path().join(name);
        labseq_cmd()
            .args([
                "random-loci", "--chromosomes", chroms.to_str().unwrap(),
                "-n", "20", "--seed", "42", "--roman", "--outfile", out.to_str().unwrap(),
            ])
            .assert()
            .success();
        fs::read_to_string(out).unwrap()
    };
    let a = run("a.tsv");
    assert_eq!(a, run("b.tsv"));
    assert_eq!(a.lines().count(), 21);
    assert!(a.starts_with("CHROM\tPOS"));
    assert!(a.lines().skip(1).all(|l| l.starts_with("I\t") || l.starts_with("IV\t")));
}

#[test]
fn test_random_loci_too_many() {
    let dir = TempDir::new().unwrap();
    let chroms = dir.path().join("chroms.tsv");
    fs::write(&chroms, "chromosome\tend_position\nchr1\t5\n").unwrap();
    labseq_cmd()
        .args(["random-loci", "--chromosomes", chroms.to_str().unwrap(), "-n", "6"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot draw 6 distinct loci"));
}

#[cfg(unix)]
#[test]
fn test_fanout_joins_results() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("t.csv");
    let mut text = String::from("id,value\n");
    for i in 0..11 {
        text.push_str(&format!("{i},v{i}\n"));
    }
    fs::write(&input, &text).unwrap();
    let script = dir.path().join("copy.sh");
    fs::write(&script, "cp \"$1\" \"$2\"\n").unwrap();
    let out = dir.path().join("joined.csv");

    labseq_cmd()
        .args([
            "fanout", script.to_str().unwrap(), input.to_str().unwrap(), "4", out.to_str().unwrap(),
            "--interpreter", "sh",
        ])
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&out).unwrap(), text);
}

#[cfg(unix)]
#[test]
fn test_fanout_reports_failed_chunks() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("t.csv");
    fs::write(&input, "id\n1\n2\n").unwrap();
    let script = dir.path().join("fail.sh");
    fs::write(&script, "exit 1\n").unwrap();
    let out = dir.path().join("joined.csv");

    labseq_cmd()
        .args([
            "fanout", script.to_str().unwrap(), input.to_str().unwrap(), "2", out.to_str().unwrap(),
            "--interpreter", "sh",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("2 of 2 chunks failed"));
}

#[test]
fn test_reference_renames_headers() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("genome.fa");
    fs::write(
        &input,
        ">NC_000002.12 Homo sapiens chromosome 2, GRCh38.p14 Primary Assembly\nACGT\n>scaffold\nTTTT\n",
    ).unwrap();
    let out = dir.path().join("ref.fa");

    labseq_cmd()
        .args(["reference", input.to_str().unwrap(), out.to_str().unwrap()])
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&out).unwrap(), ">chr02\nACGT\n");
}

#[test]
fn test_annotate_directory() {
    let dir = TempDir::new().unwrap();
    let chr = dir.path().join("chr5");
    fs::create_dir(&chr).unwrap();
    fs::write(
        chr.join("events.txt"),
        "event\n###\niBirStart: 42\nsBir: CATGACCGTT\n\
         ref: ACGTTGCAACGGTCATGCAAGTCCTAGG\nbir: TTTTTTTTTTTTTTTTTTTTAACGGTCATG\nreadStart: 1\n",
    ).unwrap();
    let out = dir.path().join("annotated.tsv");

    labseq_cmd()
        .args([
            "annotate", "--root", dir.path().to_str().unwrap(), "--file-name", "events.txt",
            "--chromosomes", "chr5,chr6", "--outfile", out.to_str().unwrap(),
        ])
        .assert()
        .success();

    let table = fs::read_to_string(&out).unwrap();
    assert_eq!(table.lines().count(), 2);
    assert!(table.lines().nth(1).unwrap().starts_with("chr5\tevent\t42\t"));
}

#[test]
fn test_dilute_prints_plan() {
    labseq_cmd()
        .args(["dilute", "20", "100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("200.00 ul of cell culture with 800.00 ul ddH2O"));
}

#[test]
fn test_dilute_rejects_zero_count() {
    labseq_cmd()
        .args(["dilute", "0", "100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be positive"));
}

#[test]
fn test_doublings() {
    labseq_cmd()
        .args(["doublings", "1", "8", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3.000 population doublings"));
}
