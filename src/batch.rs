//! Stream driver for many images
//!
//! Reads image filenames one per line and writes one palette line per image.
//! With a single worker items are handled in input order on the calling
//! thread. With more workers the reader groups filenames into blocks and
//! pushes them through a bounded queue; dropping the sending side closes the
//! queue and lets the workers drain and exit. Output lines are serialized
//! through a mutex and may come out of order.
//!
//! A failed item is logged and counted without stopping the run. An
//! `InvariantViolation` stops everything and is returned to the caller.

use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::thread;
use std::time::Duration;

use crate::extraction::extract_colors;
use crate::output::{format_palette_line, save_swatch};
use crate::{BatchConfig, Palette, PaletteConfig, PaletteError, Result};

/// Item counts of a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Items whose palette line was written
    pub processed: usize,
    /// Items skipped because of an error
    pub failed: usize,
    /// Items abandoned after the per-item limit
    pub timed_out: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.processed + self.failed + self.timed_out
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0 && self.timed_out == 0
    }
}

/// Run `task` on its own thread and give up after `limit`
///
/// An abandoned task keeps running detached until it finishes; its result is
/// discarded. A task that panics is reported as a `DecodeError` for `item`.
pub fn run_with_timeout<T, F>(item: &str, limit: Duration, task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        // Receiver is gone once the caller timed out
        let _ = sender.send(task());
    });

    match receiver.recv_timeout(limit) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(PaletteError::TimeoutError {
            item: item.to_string(),
            limit_ms: limit.as_millis() as u64,
        }),
        Err(RecvTimeoutError::Disconnected) => Err(PaletteError::DecodeError {
            message: format!("extraction of {} panicked", item),
            source: None,
        }),
    }
}

fn detect(name: &str, palette_config: &PaletteConfig, batch_config: &BatchConfig) -> Result<Palette> {
    match batch_config.item_timeout {
        None => extract_colors(Path::new(name), palette_config),
        Some(limit) => {
            let path = PathBuf::from(name);
            let config = palette_config.clone();
            run_with_timeout(name, limit, move || extract_colors(&path, &config))
        }
    }
}

/// Count a failed item; only an `InvariantViolation` is handed back
fn record_failure(name: &str, error: PaletteError, summary: &Mutex<BatchSummary>) -> Result<()> {
    match error {
        e @ PaletteError::InvariantViolation { .. } => {
            error!("{}: {}", name, e);
            return Err(e);
        }
        e @ PaletteError::TimeoutError { .. } => {
            warn!("{}: {}", name, e);
            summary.lock().timed_out += 1;
        }
        e => {
            warn!("{}: {}", name, e);
            summary.lock().failed += 1;
        }
    }
    Ok(())
}

/// Handle one filename, recording its outcome
///
/// The palette line is written before the swatch is attempted; a swatch that
/// cannot be saved is logged and does not fail the item.
///
/// Returns an error only for failures that must stop the run.
fn handle_item<W: Write>(
    name: &str,
    palette_config: &PaletteConfig,
    batch_config: &BatchConfig,
    output: &Mutex<W>,
    summary: &Mutex<BatchSummary>,
) -> Result<()> {
    let palette = match detect(name, palette_config, batch_config) {
        Ok(palette) => palette,
        Err(e) => return record_failure(name, e, summary),
    };

    {
        let mut out = output.lock();
        writeln!(out, "{}", format_palette_line(name, &palette))
            .and_then(|_| out.flush())
            .map_err(|e| PaletteError::io("cannot write palette line", e))?;
    }
    summary.lock().processed += 1;

    if batch_config.save_palette {
        if let Err(e) = save_swatch(Path::new(name), &palette) {
            warn!("{}: swatch not saved: {}", name, e);
        }
    }
    Ok(())
}

fn item_name(line: &str) -> Option<&str> {
    let name = line.trim();
    (!name.is_empty()).then_some(name)
}

/// Filenames from a line stream, trimmed, blank lines skipped
fn stream_names<R: BufRead>(input: R) -> impl Iterator<Item = Result<String>> {
    input.lines().filter_map(|line| match line {
        Ok(line) => item_name(&line).map(|name| Ok(name.to_string())),
        Err(e) => Some(Err(PaletteError::io("cannot read filenames", e))),
    })
}

/// State shared by parallel workers
#[derive(Default)]
struct RunState {
    summary: Mutex<BatchSummary>,
    fatal: Mutex<Option<PaletteError>>,
    abort: AtomicBool,
}

impl RunState {
    fn fail(&self, error: PaletteError) {
        self.abort.store(true, Ordering::SeqCst);
        let mut fatal = self.fatal.lock();
        if fatal.is_none() {
            *fatal = Some(error);
        }
    }

    fn aborted(&self) -> bool {
        self.abort.load(Ordering::SeqCst)
    }
}

/// Group filenames into blocks and queue them; returns when input ends
fn feed_blocks<I>(names: I, sender: SyncSender<Vec<String>>, block_size: usize, state: &RunState) -> Result<()>
where
    I: Iterator<Item = Result<String>>,
{
    let mut block = Vec::with_capacity(block_size);
    for name in names {
        if state.aborted() {
            return Ok(());
        }
        block.push(name?);
        if block.len() == block_size {
            let full = std::mem::replace(&mut block, Vec::with_capacity(block_size));
            if sender.send(full).is_err() {
                return Ok(());
            }
        }
    }
    if !block.is_empty() {
        let _ = sender.send(block);
    }
    Ok(())
}

fn run_worker<W: Write>(
    queue: &Mutex<Receiver<Vec<String>>>,
    output: &Mutex<W>,
    state: &RunState,
    palette_config: &PaletteConfig,
    batch_config: &BatchConfig,
) {
    loop {
        let Ok(block) = queue.lock().recv() else {
            break; // Queue closed and drained
        };
        for name in &block {
            // Keep draining after an abort so the reader never blocks
            if state.aborted() {
                break;
            }
            if let Err(e) = handle_item(name, palette_config, batch_config, output, &state.summary) {
                state.fail(e);
            }
        }
    }
}

fn run_sequential<I, W>(names: I, output: W, palette_config: &PaletteConfig, batch_config: &BatchConfig) -> Result<BatchSummary>
where
    I: Iterator<Item = Result<String>>,
    W: Write,
{
    let output = Mutex::new(output);
    let summary = Mutex::new(BatchSummary::default());
    for name in names {
        handle_item(&name?, palette_config, batch_config, &output, &summary)?;
    }
    Ok(summary.into_inner())
}

fn run_parallel<I, W>(names: I, output: W, palette_config: &PaletteConfig, batch_config: &BatchConfig) -> Result<BatchSummary>
where
    I: Iterator<Item = Result<String>>,
    W: Write + Send,
{
    let output = Mutex::new(output);
    let state = RunState::default();
    let (sender, receiver) = mpsc::sync_channel::<Vec<String>>(batch_config.queue_capacity);
    let queue = Mutex::new(receiver);

    let read_result = thread::scope(|scope| {
        for _ in 0..batch_config.workers {
            scope.spawn(|| run_worker(&queue, &output, &state, palette_config, batch_config));
        }
        feed_blocks(names, sender, batch_config.block_size, &state)
    });

    if let Some(error) = state.fatal.into_inner() {
        return Err(error);
    }
    read_result?;
    Ok(state.summary.into_inner())
}

fn run_names<I, W>(names: I, output: W, palette_config: &PaletteConfig, batch_config: &BatchConfig) -> Result<BatchSummary>
where
    I: Iterator<Item = Result<String>>,
    W: Write + Send,
{
    palette_config.validate()?;
    batch_config.validate()?;
    debug!(
        "batch run: {} workers, blocks of {}, timeout {:?}",
        batch_config.workers, batch_config.block_size, batch_config.item_timeout
    );

    let summary = if batch_config.workers == 1 {
        run_sequential(names, output, palette_config, batch_config)?
    } else {
        run_parallel(names, output, palette_config, batch_config)?
    };

    info!(
        "batch done: {} processed, {} failed, {} timed out",
        summary.processed, summary.failed, summary.timed_out
    );
    Ok(summary)
}

/// Detect palettes for every filename in `input`, one per line
///
/// Lines are trimmed and blank lines are skipped. Each successful item writes
/// `name<TAB>colors<TAB>background` to `output`.
///
/// # Errors
///
/// Returns an error when the settings are invalid, the input or output
/// stream fails, or an item hits an `InvariantViolation`. Per-item decode
/// failures and timeouts are only counted.
pub fn run_stream<R: BufRead, W: Write + Send>(
    input: R,
    output: W,
    palette_config: &PaletteConfig,
    batch_config: &BatchConfig,
) -> Result<BatchSummary> {
    run_names(stream_names(input), output, palette_config, batch_config)
}

/// Detect palettes for an explicit list of filenames
///
/// Names are used exactly as given, so paths with surrounding whitespace or
/// embedded newlines reach the decoder untouched. Errors are as for
/// [`run_stream`].
pub fn run_files<I, W>(names: I, output: W, palette_config: &PaletteConfig, batch_config: &BatchConfig) -> Result<BatchSummary>
where
    I: IntoIterator<Item = String>,
    W: Write + Send,
{
    run_names(names.into_iter().map(Ok), output, palette_config, batch_config)
}
