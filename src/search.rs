use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::digest::{Algorithm, Digest, Digester};
use crate::error::{CrackError, Result};
use crate::keyspace::{Keyspace, Partition};
use crate::progress::{NoProgress, Progress};
use crate::{BATCH_SIZE, CHECK_INTERVAL};

/// How a search ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// `candidate` hashes to the target; `index` is its position in the
    /// keyspace order. No earlier candidate matches.
    Found { candidate: String, index: u64 },
    /// Every candidate in the searched range was tried.
    NotFound,
    /// The caller cancelled before the range was exhausted. A match found
    /// by one worker is dropped if another worker was cancelled before
    /// reaching it, since an earlier match could still exist.
    Cancelled,
}

#[derive(Clone, Debug)]
pub struct SearchReport {
    pub outcome: Outcome,
    /// Number of candidates hashed.
    pub processed: u64,
    /// Number of candidates in the searched range.
    pub total: u64,
    pub elapsed: Duration,
}

impl SearchReport {
    pub fn found(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Found { candidate, .. } => Some(candidate.as_str()),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.outcome == Outcome::Cancelled
    }

    /// Hashes per second over the whole run.
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.processed as f64 / secs
        }
    }
}

/// Cooperative cancellation flag. Clones share the same flag, so one can be
/// handed to another thread and tripped from there.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// State every worker of one search reads.
struct Shared<'a> {
    cancel: &'a CancelToken,
    // lowest index known to match; nothing after it can win
    best: AtomicU64,
    // set when a worker hit an error
    abort: AtomicBool,
}

impl<'a> Shared<'a> {
    fn new(cancel: &'a CancelToken) -> Self {
        Self {
            cancel,
            best: AtomicU64::new(u64::MAX),
            abort: AtomicBool::new(false),
        }
    }
}

#[derive(Debug, Default)]
struct Scan {
    found: Option<(u64, String)>,
    processed: u64,
    // first index a cancelled worker left unprocessed
    cancelled_at: Option<u64>,
}

impl Scan {
    fn merge(self, other: Scan) -> Scan {
        let found = match (self.found, other.found) {
            (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
            (a, b) => a.or(b),
        };
        Scan {
            found,
            processed: self.processed + other.processed,
            cancelled_at: match (self.cancelled_at, other.cancelled_at) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            },
        }
    }

    /// A match only counts if every candidate before it was tried.
    fn outcome(self) -> Outcome {
        match (self.found, self.cancelled_at) {
            (Some((index, candidate)), cancelled_at)
                if cancelled_at.map_or(true, |at| index < at) =>
            {
                Outcome::Found { candidate, index }
            }
            (_, Some(_)) => Outcome::Cancelled,
            (_, None) => Outcome::NotFound,
        }
    }
}

/// Hash every candidate in `range` in order until one matches `target`.
///
/// Every `CHECK_INTERVAL` candidates the scan flushes progress and stops if
/// the search was cancelled, another worker failed, or another worker already
/// matched at a lower index.
fn scan_range<D, P>(
    keyspace: &Keyspace,
    digester: &D,
    target: &Digest,
    range: Range<u64>,
    progress: &P,
    shared: &Shared<'_>,
) -> Result<Scan>
where
    D: Digester + ?Sized,
    P: Progress + ?Sized,
{
    let mut candidates = keyspace.range(range);
    let mut scan = Scan::default();
    let mut pending = 0u64;

    while let Some((index, candidate)) = candidates.next_candidate() {
        if scan.processed % CHECK_INTERVAL == 0 {
            progress.advance(pending);
            pending = 0;
            if shared.cancel.is_cancelled() {
                scan.cancelled_at = Some(index);
                break;
            }
            if shared.abort.load(Ordering::Relaxed) || shared.best.load(Ordering::Acquire) < index
            {
                break;
            }
        }

        let digest = match digester.digest(candidate.as_bytes()) {
            Ok(digest) => digest,
            Err(e) => {
                shared.abort.store(true, Ordering::Relaxed);
                progress.advance(pending);
                return Err(e);
            }
        };
        scan.processed += 1;
        pending += 1;

        if digest == *target {
            shared.best.fetch_min(index, Ordering::AcqRel);
            scan.found = Some((index, candidate.to_owned()));
            break;
        }
    }

    progress.advance(pending);
    Ok(scan)
}

/// Exhaustive search of a [`Keyspace`] for a preimage of a target digest.
///
/// With one thread the keyspace is scanned strictly in order. With more, it is
/// cut into contiguous chunks of `BATCH_SIZE` candidates that run on a rayon
/// pool; the match with the lowest index still wins.
pub struct Cracker<D = Algorithm> {
    digester: D,
    keyspace: Keyspace,
    threads: usize,
}

impl<D: Digester> Cracker<D> {
    pub fn new(digester: D, keyspace: Keyspace) -> Self {
        Self {
            digester,
            keyspace,
            threads: 1,
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn keyspace(&self) -> &Keyspace {
        &self.keyspace
    }

    pub fn digester(&self) -> &D {
        &self.digester
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Search the whole keyspace without progress reporting.
    pub fn crack(&self, target: &Digest) -> Result<SearchReport> {
        self.crack_with(target, &NoProgress, &CancelToken::new())
    }

    pub fn crack_with<P: Progress + ?Sized>(
        &self,
        target: &Digest,
        progress: &P,
        cancel: &CancelToken,
    ) -> Result<SearchReport> {
        self.crack_range(target, 0..self.keyspace.total(), progress, cancel)
    }

    /// Search only the candidates whose indices fall in `range`.
    pub fn crack_range<P: Progress + ?Sized>(
        &self,
        target: &Digest,
        range: Range<u64>,
        progress: &P,
        cancel: &CancelToken,
    ) -> Result<SearchReport> {
        let start = Instant::now();
        self.validate(target)?;

        let end = range.end.min(self.keyspace.total());
        let range = range.start.min(end)..end;
        let total = range.end - range.start;

        info!(
            "searching {total} candidates (indices {}..{}) with {} on {} thread(s)",
            range.start,
            range.end,
            self.digester.name(),
            self.threads
        );

        let shared = Shared::new(cancel);
        progress.start(total);
        let scan = if self.threads == 1 || total <= BATCH_SIZE {
            scan_range(
                &self.keyspace,
                &self.digester,
                target,
                range,
                progress,
                &shared,
            )
        } else {
            self.scan_parallel(target, range, progress, &shared)
        };
        progress.finish();
        let scan = scan?;

        let elapsed = start.elapsed();
        let processed = scan.processed;
        let outcome = scan.outcome();
        match &outcome {
            Outcome::Found { index, .. } => {
                info!("match at index {index} after {processed} candidates")
            }
            Outcome::Cancelled => warn!("search cancelled after {processed} candidates"),
            Outcome::NotFound => info!("no match among {total} candidates"),
        }

        Ok(SearchReport {
            outcome,
            processed,
            total,
            elapsed,
        })
    }

    fn validate(&self, target: &Digest) -> Result<()> {
        if self.threads == 0 {
            return Err(CrackError::invalid("thread count must be at least 1"));
        }
        let expected = self.digester.output_len();
        if target.len() != expected {
            return Err(CrackError::invalid(format!(
                "target digest is {} bytes but {} produces {expected}",
                target.len(),
                self.digester.name()
            )));
        }
        Ok(())
    }

    fn scan_parallel<P: Progress + ?Sized>(
        &self,
        target: &Digest,
        range: Range<u64>,
        progress: &P,
        shared: &Shared<'_>,
    ) -> Result<Scan> {
        let pool = ThreadPoolBuilder::new().num_threads(self.threads).build()?;
        let partition = Partition::with_chunk_size(range, BATCH_SIZE);
        debug!(
            "split search into {} chunks of about {BATCH_SIZE} candidates",
            partition.parts()
        );

        pool.install(|| {
            (0..partition.parts())
                .into_par_iter()
                .map(|i| {
                    scan_range(
                        &self.keyspace,
                        &self.digester,
                        target,
                        partition.get(i),
                        progress,
                        shared,
                    )
                })
                .try_reduce(Scan::default, |a, b| Ok(a.merge(b)))
        })
    }
}

/// Single-threaded search of every string over `charset` up to `max_length`
/// characters for one hashing to `target` under `algorithm`.
pub fn search(
    target: &Digest,
    max_length: usize,
    charset: &str,
    algorithm: Algorithm,
) -> Result<SearchReport> {
    let keyspace = Keyspace::new(charset.parse()?, max_length)?;
    Cracker::new(algorithm, keyspace).crack(target)
}
