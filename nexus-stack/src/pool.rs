//! Fixed-size worker pool.
//!
//! Jobs are queued with [`ThreadPool::submit`], before or after
//! [`start`](ThreadPool::start). Workers pull from a shared
//! `crossbeam-channel` queue and push each job's return value into a result
//! channel. An idle worker spins and yields with [`Backoff`], then parks for
//! short intervals until new work arrives or a stop is requested.
//!
//! [`stop`](ThreadPool::stop) is cooperative: workers finish every job still
//! in the queue, observe the stop flag between jobs, and exit. The results
//! are then returned in completion order.
//!
//! A panicking job does not take its worker down. The panic is caught, the
//! worker moves on to the next job, and `stop` reports
//! [`PoolError::WorkerPanicked`]. Results of the jobs that did complete stay
//! available through [`take_results`](ThreadPool::take_results).
//!
//! # Example
//!
//! ```
//! use nexus_stack::pool::ThreadPool;
//!
//! let mut pool = ThreadPool::new();
//! for i in 0..8u64 {
//!     pool.submit(move || i * i);
//! }
//! pool.start(2).unwrap();
//! let mut results = pool.stop().unwrap();
//! results.sort_unstable();
//! assert_eq!(results, vec![0, 1, 4, 9, 16, 25, 36, 49]);
//! ```

use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};
use crossbeam_utils::Backoff;
use tracing::{debug, warn};

use crate::error::PoolError;

/// How long an idle worker parks once backoff is exhausted.
const IDLE_PARK: Duration = Duration::from_millis(1);

/// `first_panic` value while no job has panicked.
const NO_PANIC: usize = usize::MAX;

type Job<R> = Box<dyn FnOnce() -> R + Send + 'static>;

/// A pool of worker threads returning `R` from every job.
pub struct ThreadPool<R> {
    jobs_tx: Sender<Job<R>>,
    jobs_rx: Receiver<Job<R>>,
    results_tx: Sender<R>,
    results_rx: Receiver<R>,
    stop: Arc<AtomicBool>,
    first_panic: Arc<AtomicUsize>,
    workers: Vec<JoinHandle<()>>,
}

impl<R: Send + 'static> Default for ThreadPool<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Send + 'static> ThreadPool<R> {
    /// Creates a stopped pool with an empty queue.
    pub fn new() -> Self {
        let (jobs_tx, jobs_rx) = unbounded();
        let (results_tx, results_rx) = unbounded();
        Self {
            jobs_tx,
            jobs_rx,
            results_tx,
            results_rx,
            stop: Arc::new(AtomicBool::new(false)),
            first_panic: Arc::new(AtomicUsize::new(NO_PANIC)),
            workers: Vec::new(),
        }
    }

    /// Queues `job`. It runs once the pool is started.
    pub fn submit<F>(&self, job: F)
    where
        F: FnOnce() -> R + Send + 'static,
    {
        // The pool holds a receiver, so the queue is never disconnected
        let _ = self.jobs_tx.send(Box::new(job));
        for worker in &self.workers {
            worker.thread().unpark();
        }
    }

    /// Number of jobs waiting in the queue.
    pub fn pending(&self) -> usize {
        self.jobs_rx.len()
    }

    /// Returns `true` between [`start`](Self::start) and [`stop`](Self::stop).
    pub fn is_running(&self) -> bool {
        !self.workers.is_empty()
    }

    /// Spawns `threads` workers, or one per available CPU when `threads` is 0.
    ///
    /// Returns the number of workers spawned.
    ///
    /// # Errors
    ///
    /// [`PoolError::AlreadyStarted`] if the pool is running, and
    /// [`PoolError::Spawn`] if a thread cannot be created. Workers spawned
    /// before the failure keep running until [`stop`](Self::stop).
    pub fn start(&mut self, threads: usize) -> Result<usize, PoolError> {
        if self.is_running() {
            return Err(PoolError::AlreadyStarted);
        }

        let threads = match threads {
            0 => thread::available_parallelism().map_or(1, NonZeroUsize::get),
            n => n,
        };

        self.stop.store(false, Ordering::Release);
        for worker in 0..threads {
            let jobs = self.jobs_rx.clone();
            let results = self.results_tx.clone();
            let stop = Arc::clone(&self.stop);
            let first_panic = Arc::clone(&self.first_panic);
            let handle = thread::Builder::new()
                .name(format!("nexus-stack-worker-{worker}"))
                .spawn(move || run_worker(worker, &jobs, &results, &stop, &first_panic))
                .map_err(|err| PoolError::Spawn {
                    worker,
                    message: err.to_string(),
                })?;
            self.workers.push(handle);
        }

        debug!(threads, queued = self.pending(), "thread pool started");
        Ok(threads)
    }

    /// Requests a stop, waits for the queue to drain and every worker to
    /// exit, and returns the results in completion order.
    ///
    /// Calling `stop` on a pool that was never started returns no results
    /// and leaves queued jobs in place.
    ///
    /// # Errors
    ///
    /// [`PoolError::WorkerPanicked`] naming the first worker on which a job
    /// panicked. The queue is still drained and all workers are joined; the
    /// results of the other jobs are kept for [`take_results`](Self::take_results).
    pub fn stop(&mut self) -> Result<Vec<R>, PoolError> {
        self.stop.store(true, Ordering::Release);
        for (worker, handle) in self.workers.drain(..).enumerate() {
            handle.thread().unpark();
            if handle.join().is_err() {
                let _ = self.first_panic.compare_exchange(
                    NO_PANIC,
                    worker,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                );
            }
        }

        match self.first_panic.swap(NO_PANIC, Ordering::AcqRel) {
            NO_PANIC => {
                let results = self.take_results();
                debug!(results = results.len(), "thread pool stopped");
                Ok(results)
            }
            worker => {
                let completed = self.results_rx.len();
                debug!(worker, completed, "thread pool stopped after a panic");
                Err(PoolError::WorkerPanicked { worker })
            }
        }
    }

    /// Removes and returns every result collected so far, in completion
    /// order.
    pub fn take_results(&mut self) -> Vec<R> {
        self.results_rx.try_iter().collect()
    }
}

impl<R> Drop for ThreadPool<R> {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        for handle in self.workers.drain(..) {
            handle.thread().unpark();
            let _ = handle.join();
        }
    }
}

fn run_worker<R>(
    worker: usize,
    jobs: &Receiver<Job<R>>,
    results: &Sender<R>,
    stop: &AtomicBool,
    first_panic: &AtomicUsize,
) {
    debug!(worker, "worker started");
    let backoff = Backoff::new();
    let mut completed = 0usize;

    loop {
        match jobs.try_recv() {
            Ok(job) => {
                backoff.reset();
                match panic::catch_unwind(AssertUnwindSafe(job)) {
                    Ok(result) => {
                        completed += 1;
                        if results.send(result).is_err() {
                            break;
                        }
                    }
                    Err(_) => {
                        warn!(worker, "job panicked");
                        let _ = first_panic.compare_exchange(
                            NO_PANIC,
                            worker,
                            Ordering::AcqRel,
                            Ordering::Acquire,
                        );
                    }
                }
            }
            Err(TryRecvError::Empty) => {
                if stop.load(Ordering::Acquire) && jobs.is_empty() {
                    break;
                }
                if backoff.is_completed() {
                    thread::park_timeout(IDLE_PARK);
                } else {
                    backoff.snooze();
                }
            }
            Err(TryRecvError::Disconnected) => break,
        }
    }

    debug!(worker, completed, "worker exiting");
}
