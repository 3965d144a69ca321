// crates/orchestrator/src/orchestrator.rs
//! Orchestrator - connect scan scheduling and worker coordination

use chrono::Utc;
use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};
use uuid::Uuid;

use lookout_common::{
    LookoutError, LookoutResult, PortOutcome, Prober, ScanRequest, ScanResult, Target,
};
use crate::progress::ProgressTracker;
use lookout_target_resolver::TargetResolver;

/// Runs connect scans: a fixed pool of workers drains a shared port queue
/// and records open ports in a shared, lock-guarded collection.
pub struct Orchestrator {
    prober: Arc<dyn Prober>,
    progress: Arc<ProgressTracker>,
    cancel: CancellationToken,
}

impl Orchestrator {
    /// Create an orchestrator that probes through `prober`.
    pub fn new(prober: Arc<dyn Prober>) -> Self {
        Self {
            prober,
            progress: Arc::new(ProgressTracker::new()),
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned token (e.g. tied to Ctrl-C) for interruption.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn progress(&self) -> Arc<ProgressTracker> {
        self.progress.clone()
    }

    /// Probe every requested port exactly once and return the open set.
    ///
    /// Fails before any I/O on an invalid request or an unresolvable target.
    /// A fatal probe error or an external cancellation aborts the scan and
    /// no partial result is returned.
    #[instrument(skip(self, request), fields(target = %request.target))]
    pub async fn scan(&self, request: ScanRequest) -> LookoutResult<ScanResult> {
        request.validate()?;
        let address = TargetResolver::resolve(&request.target).await?;

        let scan_id = Uuid::new_v4();
        let total = request.ports().len();
        self.progress.reset(total);

        info!(
            "Starting scan {} against {} ports={} workers={} timeout={:?}",
            scan_id,
            address,
            total,
            request.effective_workers(),
            request.timeout
        );

        let start_time = Utc::now();
        let started = Instant::now();

        let open_ports = if total == 0 {
            Vec::new()
        } else {
            self.run_workers(address, &request).await?
        };

        let duration = started.elapsed();
        let end_time = Utc::now();
        self.progress.log_summary();

        Ok(ScanResult {
            scan_id,
            target: request.target.clone(),
            address,
            open_ports,
            total_ports_scanned: total,
            duration,
            start_time,
            end_time,
        })
    }

    async fn run_workers(&self, address: IpAddr, request: &ScanRequest) -> LookoutResult<Vec<u16>> {
        let queue = Arc::new(Mutex::new(request.ports().iter().copied().collect::<VecDeque<u16>>()));
        let open = Arc::new(Mutex::new(Vec::<u16>::new()));
        // Fatal probe errors stop the siblings without touching the caller's token.
        let abort = self.cancel.child_token();
        // Set only when a worker gave up on a port it had already taken.
        let abandoned = Arc::new(AtomicBool::new(false));

        let pool_size = request.effective_workers();
        let mut workers = Vec::with_capacity(pool_size);
        for worker_id in 0..pool_size {
            let queue = queue.clone();
            let open = open.clone();
            let abort = abort.clone();
            let abandoned = abandoned.clone();
            let prober = self.prober.clone();
            let progress = self.progress.clone();
            let timeout = request.timeout;

            let worker = tokio::spawn(async move {
                run_worker(worker_id, address, timeout, queue, open, abort, abandoned, prober, progress).await
            });
            workers.push(worker);
        }

        let mut failure: Option<LookoutError> = None;
        for w in workers {
            let outcome = match w.await {
                Ok(res) => res,
                Err(join_err) => Err(LookoutError::Worker(join_err.to_string())),
            };
            if let Err(e) = outcome {
                if failure.is_none() {
                    failure = Some(e);
                }
            }
        }

        if let Some(e) = failure {
            warn!("Scan aborted: {}", e);
            return Err(e);
        }
        if abandoned.load(Ordering::SeqCst) {
            info!("Scan cancelled after {} probes", self.progress.snapshot().probed);
            return Err(LookoutError::Cancelled);
        }

        // Completion order follows network timing, not port order.
        let mut ports = std::mem::take(&mut *open.lock().await);
        ports.sort_unstable();
        ports.dedup();
        Ok(ports)
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_worker(
    worker_id: usize,
    address: IpAddr,
    timeout: Duration,
    queue: Arc<Mutex<VecDeque<u16>>>,
    open: Arc<Mutex<Vec<u16>>>,
    abort: CancellationToken,
    abandoned: Arc<AtomicBool>,
    prober: Arc<dyn Prober>,
    progress: Arc<ProgressTracker>,
) -> LookoutResult<()> {
    loop {
        let next = {
            let mut q = queue.lock().await;
            q.pop_front()
        };
        let port = match next {
            Some(p) => p,
            None => break, // queue drained
        };

        let target = Target::new(address, port);
        let probed = tokio::select! {
            biased;
            _ = abort.cancelled() => {
                abandoned.store(true, Ordering::SeqCst);
                return Ok(());
            }
            res = prober.probe(&target, timeout) => res,
        };
        progress.record_probe();

        match probed {
            Ok(state) => {
                let outcome = PortOutcome::new(port, state);
                if outcome.open {
                    progress.record_open();
                    open.lock().await.push(outcome.port);
                    debug!("Port {} is open", outcome.port);
                }
            }
            Err(e) if e.is_fatal() => {
                abort.cancel();
                return Err(e);
            }
            Err(e) => {
                trace!("Probe of {} failed, treating as closed: {}", target, e);
            }
        }
    }

    trace!("Worker {} finished", worker_id);
    Ok(())
}
