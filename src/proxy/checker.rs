//! Batch validation engine with a bounded worker pool and a run deadline

use crate::proxy::aggregate::aggregate;
use crate::proxy::models::{Candidate, Verdict, WorkingProxy};
use crate::proxy::probe::{HttpProber, Prober};
use crate::Result;
use anyhow::bail;
use futures::FutureExt;
use kanal::AsyncReceiver;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

/// Default number of concurrent workers
const DEFAULT_CONCURRENCY: usize = 100;

/// Default timeout for one protocol attempt in seconds
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 4;

/// Default ceiling for a whole validation run in seconds
const DEFAULT_BATCH_DEADLINE_SECS: u64 = 45;

/// Configuration for one validation batch
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Number of concurrent workers
    pub concurrency: usize,
    /// Timeout for each individual network attempt
    pub per_probe_timeout: Duration,
    /// Hard ceiling for the entire run
    pub batch_deadline: Duration,
    /// Cap on how many candidates are admitted to the pool
    pub max_candidates: Option<usize>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            per_probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            batch_deadline: Duration::from_secs(DEFAULT_BATCH_DEADLINE_SECS),
            max_candidates: None,
        }
    }
}

impl BatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_per_probe_timeout(mut self, timeout: Duration) -> Self {
        self.per_probe_timeout = timeout;
        self
    }

    pub fn with_batch_deadline(mut self, deadline: Duration) -> Self {
        self.batch_deadline = deadline;
        self
    }

    pub fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = Some(max);
        self
    }

    /// Reject configurations that cannot run
    fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            bail!("concurrency must be at least 1");
        }
        if self.per_probe_timeout.is_zero() {
            bail!("per-probe timeout must be non-zero");
        }
        if self.batch_deadline.is_zero() {
            bail!("batch deadline must be non-zero");
        }
        Ok(())
    }
}

/// Validates batches of candidates through a bounded worker pool.
///
/// Workers pull candidates from a shared queue, so at most
/// `concurrency` probes are in flight at any moment regardless of
/// batch size. The run as a whole is cut off at `batch_deadline`:
/// verdicts collected up to that point are kept, stragglers get one
/// more probe-timeout of grace, and anything still running after
/// that is aborted.
pub struct ProxyChecker {
    config: BatchConfig,
    prober: Arc<dyn Prober>,
}

impl ProxyChecker {
    /// Create a checker with default configuration
    pub fn new() -> Self {
        Self::with_config(BatchConfig::default())
    }

    /// Create a checker with custom configuration
    pub fn with_config(config: BatchConfig) -> Self {
        Self {
            config,
            prober: Arc::new(HttpProber::new()),
        }
    }

    /// Replace the prober, e.g. with a scripted one in tests
    pub fn with_prober(mut self, prober: Arc<dyn Prober>) -> Self {
        self.prober = prober;
        self
    }

    /// Validate a batch and return the deduplicated working set.
    ///
    /// Malformed candidates are dropped with a warning before any
    /// probing happens. The result is sorted by endpoint; when the
    /// deadline cuts the run short it contains whatever verdicts
    /// had arrived.
    pub async fn run_batch(&self, candidates: Vec<Candidate>) -> Result<Vec<WorkingProxy>> {
        self.config.validate()?;

        let mut admitted = sanitize(candidates);
        if let Some(max) = self.config.max_candidates {
            admitted.truncate(max);
        }
        if admitted.is_empty() {
            return Ok(Vec::new());
        }

        let total = admitted.len();
        let worker_count = self.config.concurrency.min(total);
        log::debug!("starting batch: {} candidates, {} workers", total, worker_count);

        // Pre-fill the whole queue, then close it. Workers drain what is
        // left and exit when the queue is empty.
        let (work_tx, work_rx) = kanal::unbounded_async::<Candidate>();
        for candidate in admitted {
            if work_tx.send(candidate).await.is_err() {
                break;
            }
        }
        drop(work_tx);

        let (verdict_tx, mut verdict_rx) = mpsc::unbounded_channel::<Verdict>();
        let cancelled = Arc::new(AtomicBool::new(false));

        let workers: Vec<JoinHandle<()>> = (0..worker_count)
            .map(|_| {
                let work_rx = work_rx.clone();
                let verdict_tx = verdict_tx.clone();
                let cancelled = Arc::clone(&cancelled);
                let prober = Arc::clone(&self.prober);
                let timeout = self.config.per_probe_timeout;
                tokio::spawn(worker_loop(work_rx, verdict_tx, cancelled, prober, timeout))
            })
            .collect();
        drop(work_rx);
        drop(verdict_tx);

        let deadline = Instant::now() + self.config.batch_deadline;
        let mut verdicts: Vec<Verdict> = Vec::with_capacity(total);
        let mut deadline_hit = false;

        loop {
            match time::timeout_at(deadline, verdict_rx.recv()).await {
                Ok(Some(verdict)) => verdicts.push(verdict),
                // All workers have exited and the channel is drained
                Ok(None) => break,
                Err(_) => {
                    deadline_hit = true;
                    break;
                }
            }
        }

        if deadline_hit {
            cancelled.store(true, Ordering::Relaxed);
            log::warn!(
                "batch deadline reached with {} of {} verdicts, draining stragglers",
                verdicts.len(),
                total
            );

            // In-flight probes may still land; give them one probe-timeout,
            // then cut off whatever is left.
            let hard_stop = deadline + self.config.per_probe_timeout;
            loop {
                match time::timeout_at(hard_stop, verdict_rx.recv()).await {
                    Ok(Some(verdict)) => verdicts.push(verdict),
                    Ok(None) => break,
                    Err(_) => break,
                }
            }
            for worker in workers {
                worker.abort();
            }
        } else {
            for worker in workers {
                let _ = worker.await;
            }
        }

        let working = aggregate(verdicts);
        log::debug!("batch finished: {} working proxies", working.len());
        Ok(working)
    }
}

impl Default for ProxyChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop candidates that could never be probed
fn sanitize(candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates
        .into_iter()
        .filter(|candidate| {
            if candidate.is_valid() {
                true
            } else {
                log::warn!("dropping malformed candidate '{}'", candidate.endpoint());
                false
            }
        })
        .collect()
}

/// One pool worker: pull, probe, report, until the queue is drained or
/// the batch is cancelled. A panicking probe is logged and counted as
/// a dead endpoint so the worker survives to take the next candidate.
async fn worker_loop(
    work_rx: AsyncReceiver<Candidate>,
    verdict_tx: mpsc::UnboundedSender<Verdict>,
    cancelled: Arc<AtomicBool>,
    prober: Arc<dyn Prober>,
    timeout: Duration,
) {
    while !cancelled.load(Ordering::Relaxed) {
        let Ok(candidate) = work_rx.recv().await else {
            break;
        };

        let endpoint = candidate.endpoint();
        let verdict = match AssertUnwindSafe(prober.probe(&candidate, timeout))
            .catch_unwind()
            .await
        {
            Ok(verdict) => verdict,
            Err(_) => {
                log::error!("probe panicked for {}, marking it dead", endpoint);
                Verdict::dead(candidate)
            }
        };

        if let Some(protocol) = verdict.protocol {
            log::debug!("{}: alive over {}", endpoint, protocol);
        } else {
            log::trace!("{}: dead", endpoint);
        }

        // The collector hanging up means the batch is over
        if verdict_tx.send(verdict).is_err() {
            break;
        }
    }
}
