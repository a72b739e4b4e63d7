//! Manual data parallelism over CSV tables.
//!
//! A table is cut into `slices` files named `{root}_{i}.csv`, each carrying
//! the header and at most `ceil(rows / slices)` rows. Trailing slices may be
//! empty. [`join_slices`] concatenates slices back in index order and
//! [`clean_up_slices`] removes them.
//!
//! [`run_fan_out`] ties the three together around an external script that
//! processes one slice:
//! ```text
//! input.csv -> split -> [interpreter] script chunk_i.csv result_i.csv  (x processes)
//!           -> join successful results -> output.csv -> clean up
//! ```
//! Each script invocation runs on its own worker of a
//! `threadpool::ThreadPool`; outcomes come back over a channel.
//!
use std::path::{Path, PathBuf};
use std::process::Command;
use crate::common::{LabseqError, Result};

fn slice_path(root: &Path, i: usize) -> PathBuf {
    PathBuf::from(format!("{}_{i}.csv", root.display()))
}

/// Split the CSV at `input` into `slices` files `{root}_{i}.csv`.
pub fn split_table<P: AsRef<Path>, R: AsRef<Path>>(input: P, slices: usize, root: R) -> Result<Vec<PathBuf>> {
    if slices == 0 {
        return Err(LabseqError::InvalidParameter("number of slices must be positive".into()));
    }
    let input = input.as_ref();
    let mut rdr = csv::Reader::from_path(input)?;
    let headers = rdr.headers()?.clone();
    let rows = rdr.records().collect::<std::result::Result<Vec<_>, _>>()?;
    let slice_size = rows.len().div_ceil(slices);

    let mut paths = Vec::with_capacity(slices);
    for i in 0..slices {
        let path = slice_path(root.as_ref(), i);
        let mut w = csv::Writer::from_path(&path)?;
        w.write_record(&headers)?;
        let lo = (i * slice_size).min(rows.len());
        let hi = ((i + 1) * slice_size).min(rows.len());
        for row in &rows[lo..hi] {
            w.write_record(row)?;
        }
        w.flush()?;
        log::info!("slice {i} saved to {} ({} rows)", path.display(), hi - lo);
        paths.push(path);
    }
    log::info!("{} split into {slices} slices", input.display());
    Ok(paths)
}

/// Concatenate slices in the given order into `output` with a single header.
/// Returns the number of data rows written.
pub fn join_slices<P: AsRef<Path>>(paths: &[PathBuf], output: P) -> Result<usize> {
    let output = output.as_ref();
    let mut w = csv::Writer::from_path(output)?;
    let mut header: Option<csv::StringRecord> = None;
    let mut rows = 0usize;
    for path in paths {
        let mut rdr = csv::Reader::from_path(path)?;
        let h = rdr.headers()?.clone();
        match &header {
            None => {
                w.write_record(&h)?;
                header = Some(h);
            }
            Some(first) if *first != h => {
                return Err(LabseqError::parse(path.display().to_string(), "header differs from first slice"));
            }
            Some(_) => {}
        }
        for rec in rdr.records() {
            w.write_record(&rec?)?;
            rows += 1;
        }
    }
    w.flush()?;
    log::info!("slices joined, {rows} rows saved to {}", output.display());
    Ok(rows)
}

/// Write only the header row of `input` to `output`.
fn write_header_only(input: &Path, output: &Path) -> Result<usize> {
    let mut rdr = csv::Reader::from_path(input)?;
    let mut w = csv::Writer::from_path(output)?;
    w.write_record(rdr.headers()?)?;
    w.flush()?;
    log::info!("no chunk succeeded, header of {} saved to {}", input.display(), output.display());
    Ok(0)
}

/// Remove slice files; failures are logged and skipped. Returns how many
/// files were removed.
pub fn clean_up_slices(paths: &[PathBuf]) -> usize {
    let mut removed = 0;
    for p in paths {
        match std::fs::remove_file(p) {
            Ok(()) => removed += 1,
            Err(e) => log::warn!("could not remove {}: {e}", p.display()),
        }
    }
    log::info!("clean up finished, {removed} of {} slice files deleted", paths.len());
    removed
}

/// Options for [`run_fan_out`].
#[derive(Clone, Debug)]
pub struct FanOutParams {
    /// Script called as `script <chunk_in> <chunk_out>`.
    pub script: PathBuf,
    /// Program the script is run with, e.g. `python3`. `None` runs the script
    /// directly.
    pub interpreter: Option<String>,
    pub input: PathBuf,
    /// Number of chunks and of concurrent workers.
    pub processes: usize,
    pub output: PathBuf,
}

impl Default for FanOutParams {
    fn default() -> Self {
        Self {
            script: PathBuf::new(),
            interpreter: Some("python3".into()),
            input: PathBuf::new(),
            processes: 4,
            output: PathBuf::from("output.csv"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChunkStatus {
    Succeeded,
    /// Non-zero exit; `None` when killed by a signal.
    Exited(Option<i32>),
    SpawnFailed(String),
    /// Exit status 0 but the chunk output file was not written.
    MissingOutput,
}

#[derive(Clone, Debug)]
pub struct ChunkOutcome {
    pub index: usize,
    pub input: PathBuf,
    pub output: PathBuf,
    pub status: ChunkStatus,
}

impl ChunkOutcome {
    pub fn succeeded(&self) -> bool {
        self.status == ChunkStatus::Succeeded
    }
}

/// What [`run_fan_out`] did, chunk by chunk.
#[derive(Clone, Debug)]
pub struct FanOutReport {
    /// Ordered by chunk index.
    pub chunks: Vec<ChunkOutcome>,
    /// Rows written to the joined output.
    pub rows: usize,
}

impl FanOutReport {
    pub fn failed(&self) -> impl Iterator<Item = &ChunkOutcome> {
        self.chunks.iter().filter(|c| !c.succeeded())
    }
}

fn run_chunk(script: &Path, interpreter: Option<&str>, input: &Path, output: &Path) -> ChunkStatus {
    let mut cmd = match interpreter {
        Some(prog) => {
            let mut c = Command::new(prog);
            c.arg(script);
            c
        }
        None => Command::new(script),
    };
    cmd.arg(input).arg(output);
    match cmd.status() {
        Ok(status) if status.success() => {
            if output.is_file() { ChunkStatus::Succeeded } else { ChunkStatus::MissingOutput }
        }
        Ok(status) => ChunkStatus::Exited(status.code()),
        Err(e) => ChunkStatus::SpawnFailed(e.to_string()),
    }
}

/// Split `params.input`, run the script once per chunk on a pool of
/// `params.processes` workers, join the outputs of the chunks that succeeded
/// into `params.output` and remove every intermediate file. When no chunk
/// succeeds the output holds just the input's header row.
pub fn run_fan_out(params: &FanOutParams) -> Result<FanOutReport> {
    if params.processes == 0 {
        return Err(LabseqError::InvalidParameter("number of processes must be positive".into()));
    }
    let in_root = PathBuf::from(format!("{}.chunk", params.output.display()));
    let out_root = PathBuf::from(format!("{}.result", params.output.display()));
    let inputs = split_table(&params.input, params.processes, &in_root)?;

    let pool = threadpool::ThreadPool::new(params.processes);
    let (tx, rx) = crossbeam_channel::unbounded::<ChunkOutcome>();
    for (index, input) in inputs.iter().enumerate() {
        let tx = tx.clone();
        let input = input.clone();
        let output = slice_path(&out_root, index);
        let script = params.script.clone();
        let interpreter = params.interpreter.clone();
        pool.execute(move || {
            log::info!("chunk {index}: starting on {}", input.display());
            let status = run_chunk(&script, interpreter.as_deref(), &input, &output);
            log::info!("chunk {index}: {status:?}");
            // receiver outlives the pool
            let _ = tx.send(ChunkOutcome { index, input, output, status });
        });
    }
    drop(tx);
    pool.join();

    let mut chunks: Vec<ChunkOutcome> = rx.iter().collect();
    chunks.sort_by_key(|c| c.index);

    let done: Vec<PathBuf> = chunks.iter().filter(|c| c.succeeded()).map(|c| c.output.clone()).collect();
    let joined = if done.is_empty() {
        write_header_only(&params.input, &params.output)
    } else {
        join_slices(&done, &params.output)
    };

    let written: Vec<PathBuf> = chunks.iter().map(|c| c.output.clone()).filter(|p| p.exists()).collect();
    clean_up_slices(&inputs);
    clean_up_slices(&written);

    let report = FanOutReport { chunks, rows: joined? };
    for c in report.failed() {
        log::warn!("chunk {} failed: {:?}", c.index, c.status);
    }
    Ok(report)
}
