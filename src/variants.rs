//! Post-processing of variant-call tables.
//!
//! Input is one tab-separated table per sample with a header row holding at
//! least `CHROM`, `POS`, `REF`, `ALT` and `TYPE`, plus a per-sample allele
//! frequency column and allele depth column. Any column whose name contains
//! `AF` (resp. `AD`) is taken as that column, which copes with caller output
//! such as `sample1.AF`.
//!
//! The row-wise steps are pure functions: dominant allele frequency, depth
//! filter, substitution spectra and zygosity. The only cross-sample step is
//! [`subtract_shared_variants`], which drops calls present in any other
//! sample (clone background).
//!
//! A small null model for mutation maps is also provided: uniformly random
//! loci on a linear genome mapped back onto chromosomes.
//!
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use rand::Rng;
use serde::{Deserialize, Serialize};
use crate::common::{LabseqError, Result};

/// One row of a variant table.
#[derive(Clone, Debug, PartialEq)]
pub struct VariantCall {
    pub chrom: String,
    pub pos: u64,
    pub reference: String,
    pub alternate: String,
    /// Variant type as reported by the caller (`SNP`, `INDEL`, ...).
    pub kind: String,
    /// Comma-separated allele frequencies.
    pub af: String,
    /// Comma-separated allele depths, reference first.
    pub ad: String,
}

impl VariantCall {
    fn key(&self) -> (&str, u64, &str, &str, &str) {
        (&self.chrom, self.pos, &self.reference, &self.alternate, &self.kind)
    }
}

/// A sample name and its calls, in file order.
#[derive(Clone, Debug)]
pub struct Sample {
    pub name: String,
    pub calls: Vec<VariantCall>,
}

/// Read one tab-separated variant table.
pub fn read_variant_table<P: AsRef<Path>>(path: P) -> Result<Vec<VariantCall>> {
    let path = path.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(path)?;
    let headers = rdr.headers()?.clone();
    let chrom = find_column(&headers, path, "CHROM", true)?;
    let pos = find_column(&headers, path, "POS", true)?;
    let reference = find_column(&headers, path, "REF", true)?;
    let alternate = find_column(&headers, path, "ALT", true)?;
    let kind = find_column(&headers, path, "TYPE", true)?;
    let af = find_column(&headers, path, "AF", false)?;
    let ad = find_column(&headers, path, "AD", false)?;

    let mut out = Vec::new();
    for (i, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let field = |idx: usize| rec.get(idx).unwrap_or("").to_string();
        let pos_value = rec.get(pos).unwrap_or("").trim();
        let pos_value = pos_value.parse::<u64>().map_err(|e| {
            LabseqError::parse(format!("{} row {}", path.display(), i + 2), format!("POS {pos_value:?}: {e}"))
        })?;
        out.push(VariantCall {
            chrom: field(chrom),
            pos: pos_value,
            reference: field(reference),
            alternate: field(alternate),
            kind: field(kind),
            af: field(af),
            ad: field(ad),
        });
    }
    Ok(out)
}

fn find_column(headers: &csv::StringRecord, path: &Path, label: &str, exact: bool) -> Result<usize> {
    headers.iter()
        .position(|h| if exact { h == label } else { h.contains(label) })
        .ok_or_else(|| LabseqError::parse(path.display().to_string(), format!("no {label} column")))
}

/// Read every `*.{extension}` table in `dir` as a sample, ordered by file
/// name. The sample name is the first eight characters of the file name.
pub fn read_samples<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<Sample>> {
    let dir = dir.as_ref();
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| LabseqError::file(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().map_or(false, |x| x == extension))
        .collect();
    paths.sort();
    let mut samples = Vec::with_capacity(paths.len());
    for p in paths {
        let file_name = p.file_name().map(|f| f.to_string_lossy().into_owned()).unwrap_or_default();
        let name: String = file_name.chars().take(8).collect::<String>().trim().to_string();
        let calls = read_variant_table(&p)?;
        log::info!("sample {name} has {} calls", calls.len());
        samples.push(Sample { name, calls });
    }
    log::info!("found {} samples in {}", samples.len(), dir.display());
    Ok(samples)
}

/// Largest value of a comma-separated allele-frequency list.
pub fn dominant_allele_frequency(af: &str) -> Result<f64> {
    let mut best: Option<f64> = None;
    for v in af.split(',') {
        let x: f64 = v.trim().parse().map_err(|e| LabseqError::parse("AF", format!("{v:?}: {e}")))?;
        best = Some(best.map_or(x, |b: f64| b.max(x)));
    }
    best.ok_or_else(|| LabseqError::parse("AF", "empty allele frequency list"))
}

/// Read-depth thresholds on the `AD` column.
#[derive(Clone, Debug)]
pub struct DepthFilter {
    /// Minimum reference + alternate reads.
    pub min_total_depth: u64,
    /// Minimum reads supporting the alternate allele.
    pub min_alt_reads: u64,
}

impl Default for DepthFilter {
    fn default() -> Self {
        Self { min_total_depth: 10, min_alt_reads: 5 }
    }
}

/// Whether the first two allele depths (reference, alternate) pass `filter`.
pub fn passes_depth_filter(ad: &str, filter: &DepthFilter) -> Result<bool> {
    let reads = ad.split(',')
        .map(|v| v.trim().parse::<u64>().map_err(|e| LabseqError::parse("AD", format!("{v:?}: {e}"))))
        .collect::<Result<Vec<u64>>>()?;
    let &[ref_reads, alt_reads, ..] = reads.as_slice() else {
        return Err(LabseqError::parse("AD", format!("expected at least two depths in {ad:?}")));
    };
    if alt_reads < filter.min_alt_reads {
        return Ok(false);
    }
    Ok(ref_reads + alt_reads >= filter.min_total_depth)
}

/// Six-class substitution spectrum (strand collapsed onto C and T).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Substitution {
    #[serde(rename = "C_to_T")] CtoT,
    #[serde(rename = "C_to_A")] CtoA,
    #[serde(rename = "C_to_G")] CtoG,
    #[serde(rename = "T_to_C")] TtoC,
    #[serde(rename = "T_to_G")] TtoG,
    #[serde(rename = "T_to_A")] TtoA,
}

impl Substitution {
    /// `None` for anything but a single-base substitution.
    pub fn classify(reference: &str, alternate: &str) -> Option<Self> {
        use Substitution::*;
        match (reference, alternate) {
            ("C", "T") | ("G", "A") => Some(CtoT),
            ("C", "A") | ("G", "T") => Some(CtoA),
            ("C", "G") | ("G", "C") => Some(CtoG),
            ("T", "C") | ("A", "G") => Some(TtoC),
            ("T", "G") | ("A", "C") => Some(TtoG),
            ("T", "A") | ("A", "T") => Some(TtoA),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        use Substitution::*;
        match self {
            CtoT => "C_to_T", CtoA => "C_to_A", CtoG => "C_to_G",
            TtoC => "T_to_C", TtoG => "T_to_G", TtoA => "T_to_A",
        }
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Twelve-class strand-aware substitution spectrum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StrandSubstitution {
    pub from: char,
    pub to: char,
}

impl StrandSubstitution {
    pub fn classify(reference: &str, alternate: &str) -> Option<Self> {
        let canonical = |s: &str| match s {
            "A" | "C" | "G" | "T" => s.chars().next(),
            _ => None,
        };
        let (from, to) = (canonical(reference)?, canonical(alternate)?);
        (from != to).then_some(Self { from, to })
    }
}

impl fmt::Display for StrandSubstitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_to_{}", self.from, self.to)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Zygosity {
    Homozygous,
    Heterozygous,
}

impl Zygosity {
    pub fn from_af(af: f64, homozygous_threshold: f64) -> Self {
        if af >= homozygous_threshold { Zygosity::Homozygous } else { Zygosity::Heterozygous }
    }
}

impl fmt::Display for Zygosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self { Zygosity::Homozygous => "Homozygous", Zygosity::Heterozygous => "Heterozygous" })
    }
}

/// Options for [`quality_filter`].
#[derive(Clone, Debug)]
pub struct VariantFilter {
    /// Keep only rows whose `TYPE` is `SNP`.
    pub snp_only: bool,
    /// Minimum dominant allele frequency.
    pub min_af: f64,
    pub depth: DepthFilter,
    /// Dominant AF at or above which a call is homozygous.
    pub homozygous_af: f64,
}

impl Default for VariantFilter {
    fn default() -> Self {
        Self { snp_only: true, min_af: 0.35, depth: DepthFilter::default(), homozygous_af: 0.85 }
    }
}

/// A call that passed [`quality_filter`], with derived columns.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassifiedVariant {
    pub call: VariantCall,
    pub dominant_af: f64,
    pub spectrum: Option<Substitution>,
    pub strand_spectrum: Option<StrandSubstitution>,
    pub zygosity: Zygosity,
}

#[derive(Clone, Debug)]
pub struct FilteredSample {
    pub name: String,
    pub calls: Vec<ClassifiedVariant>,
    /// Rows dropped because their AF or AD could not be parsed.
    pub skipped: usize,
}

/// Filter and classify the calls of every sample.
pub fn quality_filter(samples: &[Sample], filter: &VariantFilter) -> Vec<FilteredSample> {
    samples.iter().map(|s| {
        let mut out = FilteredSample { name: s.name.clone(), calls: Vec::new(), skipped: 0 };
        for call in &s.calls {
            if filter.snp_only && call.kind != "SNP" {
                continue;
            }
            let dominant_af = match dominant_allele_frequency(&call.af) {
                Ok(af) => af,
                Err(e) => {
                    log::warn!("{}: {}:{} skipped: {e}", s.name, call.chrom, call.pos);
                    out.skipped += 1;
                    continue;
                }
            };
            if dominant_af < filter.min_af {
                continue;
            }
            match passes_depth_filter(&call.ad, &filter.depth) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    log::warn!("{}: {}:{} skipped: {e}", s.name, call.chrom, call.pos);
                    out.skipped += 1;
                    continue;
                }
            }
            out.calls.push(ClassifiedVariant {
                call: call.clone(),
                dominant_af,
                spectrum: Substitution::classify(&call.reference, &call.alternate),
                strand_spectrum: StrandSubstitution::classify(&call.reference, &call.alternate),
                zygosity: Zygosity::from_af(dominant_af, filter.homozygous_af),
            });
        }
        log::info!("{}: {} of {} calls kept, {} unparsable", s.name, out.calls.len(), s.calls.len(), out.skipped);
        out
    }).collect()
}

/// A sample after [`subtract_shared_variants`].
#[derive(Clone, Debug)]
pub struct SubtractedSample {
    pub sample: FilteredSample,
    pub removed: usize,
}

/// Remove from each sample every call whose position, alleles and type occur
/// in any other sample. AF and AD are ignored when comparing.
pub fn subtract_shared_variants(samples: &[FilteredSample]) -> Vec<SubtractedSample> {
    samples.iter().enumerate().map(|(i, s)| {
        let others: HashSet<_> = samples.iter().enumerate()
            .filter(|(j, _)| *j != i)
            .flat_map(|(_, o)| o.calls.iter().map(|c| c.call.key()))
            .collect();
        let calls: Vec<ClassifiedVariant> = s.calls.iter()
            .filter(|c| !others.contains(&c.call.key()))
            .cloned()
            .collect();
        let removed = s.calls.len() - calls.len();
        log::info!("removed {removed} shared calls from {}", s.name);
        SubtractedSample {
            sample: FilteredSample { name: s.name.clone(), calls, skipped: s.skipped },
            removed,
        }
    }).collect()
}

/// Write classified calls of all samples as one TSV with a `SAMPLE` column.
pub fn write_classified<P: AsRef<Path>>(path: P, samples: &[FilteredSample]) -> Result<()> {
    let mut w = csv::WriterBuilder::new().delimiter(b'\t').from_path(path.as_ref())?;
    w.write_record(["SAMPLE", "CHROM", "POS", "REF", "ALT", "TYPE", "AF", "AD", "SPECTRA", "SPECTRA_STRANDWISE", "ZYGOSITY"])?;
    for s in samples {
        for c in &s.calls {
            w.write_record([
                s.name.as_str(),
                &c.call.chrom,
                &c.call.pos.to_string(),
                &c.call.reference,
                &c.call.alternate,
                &c.call.kind,
                &format!("{}", c.dominant_af),
                &c.call.ad,
                c.spectrum.map_or("", |x| x.as_str()),
                &c.strand_spectrum.map(|x| x.to_string()).unwrap_or_default(),
                &c.zygosity.to_string(),
            ])?;
        }
    }
    w.flush()?;
    Ok(())
}

/// A chromosome of the linear genome model.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Chromosome {
    #[serde(rename = "chromosome")]
    pub name: String,
    #[serde(rename = "end_position")]
    pub length: u64,
}

/// Read a `chromosome<TAB>end_position` table.
pub fn read_chromosomes<P: AsRef<Path>>(path: P) -> Result<Vec<Chromosome>> {
    let mut rdr = csv::ReaderBuilder::new().delimiter(b'\t').from_path(path.as_ref())?;
    let mut out = Vec::new();
    for row in rdr.deserialize() {
        out.push(row?);
    }
    Ok(out)
}

pub fn genome_length(chromosomes: &[Chromosome]) -> u64 {
    chromosomes.iter().map(|c| c.length).sum()
}

/// `n` distinct linear coordinates drawn uniformly from the genome.
pub fn generate_random_loci<R: Rng + ?Sized>(n: usize, chromosomes: &[Chromosome], rng: &mut R) -> Result<Vec<u64>> {
    let total = genome_length(chromosomes);
    if n as u64 > total {
        return Err(LabseqError::InvalidParameter(format!(
            "cannot draw {n} distinct loci from a genome of length {total}"
        )));
    }
    let total = usize::try_from(total)
        .map_err(|_| LabseqError::InvalidParameter(format!("genome length {total} exceeds address space")))?;
    Ok(rand::seq::index::sample(rng, total, n).into_iter().map(|i| i as u64).collect())
}

/// A position on a named chromosome (0-based).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Locus {
    #[serde(rename = "CHROM")]
    pub chrom: String,
    #[serde(rename = "POS")]
    pub pos: u64,
}

/// Map linear coordinates onto chromosomes laid end to end. Coordinates past
/// the end of the genome are dropped.
pub fn locate_in_linear_genome(chromosomes: &[Chromosome], loci: &[u64]) -> Vec<Locus> {
    let mut out = Vec::with_capacity(loci.len());
    for &locus in loci {
        let mut offset = 0u64;
        for c in chromosomes {
            if locus < offset + c.length {
                out.push(Locus { chrom: c.name.clone(), pos: locus - offset });
                break;
            }
            offset += c.length;
        }
    }
    out
}

/// `chr1`..`chr16` as yeast roman numerals; other names unchanged.
pub fn roman_chromosome_name(name: &str) -> String {
    const ROMAN: [&str; 16] = [
        "I", "II", "III", "IV", "V", "VI", "VII", "VIII",
        "IX", "X", "XI", "XII", "XIII", "XIV", "XV", "XVI",
    ];
    name.strip_prefix("chr")
        .and_then(|n| n.parse::<usize>().ok())
        .filter(|n| (1..=16).contains(n) && !name[3..].starts_with('0'))
        .map(|n| ROMAN[n - 1].to_string())
        .unwrap_or_else(|| name.to_string())
}
