//! Push/pop throughput profiler.
//!
//! [`profile_push_pop`] runs `repeats` independent jobs on a [`ThreadPool`].
//! Each job builds a fresh container, times pushing `collection_size`
//! generated values, then times popping them all. The report carries the
//! mean of both phases plus latency histograms over the per-job durations.
//!
//! ```
//! use nexus_stack::profile::{ProfileConfig, profile_push_pop};
//! use nexus_stack::{Array, Exact};
//!
//! let config = ProfileConfig { repeats: 4, collection_size: 256, threads: 2 };
//! let report = profile_push_pop::<Array<i32, Exact>, _>(&config, || 10).unwrap();
//! assert_eq!(report.timings.len(), 4);
//! println!("{report}");
//! ```

use std::fmt;
use std::hint::black_box;
use std::time::{Duration, Instant};

use hdrhistogram::Histogram;
use tracing::info;

use crate::error::ProfileError;
use crate::pool::ThreadPool;
use crate::stack::Stack;

/// Profiler parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileConfig {
    /// Number of jobs; each job is one push-all/pop-all cycle.
    pub repeats: usize,
    /// Number of values pushed (and popped) per job.
    pub collection_size: usize,
    /// Worker threads. 0 means one per available CPU.
    pub threads: usize,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            repeats: 8,
            collection_size: 1000,
            threads: 0,
        }
    }
}

/// Durations measured by a single job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobTiming {
    /// Time spent pushing `collection_size` values.
    pub push: Duration,
    /// Time spent popping them again.
    pub pop: Duration,
}

/// Aggregated profiler output for one container type.
#[derive(Debug, Clone)]
pub struct ProfileReport {
    /// Container name ([`Stack::NAME`]).
    pub name: &'static str,
    /// Parameters the profile ran with.
    pub config: ProfileConfig,
    /// Per-job durations, in completion order.
    pub timings: Vec<JobTiming>,
    /// Mean push phase duration.
    pub mean_push: Duration,
    /// Mean pop phase duration.
    pub mean_pop: Duration,
    /// Push phase durations in nanoseconds.
    pub push_histogram: Histogram<u64>,
    /// Pop phase durations in nanoseconds.
    pub pop_histogram: Histogram<u64>,
}

impl ProfileReport {
    /// Mean push phase duration in milliseconds.
    pub fn mean_push_ms(&self) -> f64 {
        self.mean_push.as_secs_f64() * 1e3
    }

    /// Mean pop phase duration in milliseconds.
    pub fn mean_pop_ms(&self) -> f64 {
        self.mean_pop.as_secs_f64() * 1e3
    }

    /// Push phase percentiles.
    pub fn push_percentiles(&self) -> Percentiles {
        Percentiles::from(&self.push_histogram)
    }

    /// Pop phase percentiles.
    pub fn pop_percentiles(&self) -> Percentiles {
        Percentiles::from(&self.pop_histogram)
    }
}

impl fmt::Display for ProfileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.name)?;
        writeln!(f, "\tpush: {:.3}ms", self.mean_push_ms())?;
        write!(f, "\tpop: {:.3}ms", self.mean_pop_ms())
    }
}

/// Summary of a phase's latency distribution, in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Percentiles {
    /// Median.
    pub p50: u64,
    /// 99th percentile.
    pub p99: u64,
    /// Slowest job.
    pub max: u64,
}

impl From<&Histogram<u64>> for Percentiles {
    fn from(hist: &Histogram<u64>) -> Self {
        Self {
            p50: hist.value_at_quantile(0.50),
            p99: hist.value_at_quantile(0.99),
            max: hist.max(),
        }
    }
}

/// Profiles push/pop of `S` with values from `generator`.
///
/// Every job gets its own clone of `generator` and its own container, so
/// `S` itself need not be `Send`.
///
/// # Errors
///
/// Returns [`ProfileError::Pool`] if the pool cannot start or a job panics.
pub fn profile_push_pop<S, G>(
    config: &ProfileConfig,
    generator: G,
) -> Result<ProfileReport, ProfileError>
where
    S: Stack + 'static,
    G: FnMut() -> S::Item + Clone + Send + 'static,
{
    let mut pool = ThreadPool::new();
    let collection_size = config.collection_size;
    for _ in 0..config.repeats {
        let generator = generator.clone();
        pool.submit(move || run_job::<S, G>(collection_size, generator));
    }

    pool.start(config.threads)?;
    let timings = pool.stop()?;
    if timings.len() != config.repeats {
        return Err(ProfileError::MissingResults {
            expected: config.repeats,
            found: timings.len(),
        });
    }

    let report = summarize(S::NAME, *config, timings)?;
    info!(
        container = report.name,
        repeats = config.repeats,
        collection_size,
        push_ms = report.mean_push_ms(),
        pop_ms = report.mean_pop_ms(),
        "profile complete"
    );
    Ok(report)
}

fn run_job<S, G>(collection_size: usize, mut generator: G) -> JobTiming
where
    S: Stack,
    G: FnMut() -> S::Item,
{
    let mut stack = S::default();

    let start = Instant::now();
    for _ in 0..collection_size {
        stack.push(generator());
    }
    let push = start.elapsed();

    let start = Instant::now();
    for _ in 0..collection_size {
        black_box(stack.pop());
    }
    let pop = start.elapsed();

    JobTiming { push, pop }
}

fn summarize(
    name: &'static str,
    config: ProfileConfig,
    timings: Vec<JobTiming>,
) -> Result<ProfileReport, ProfileError> {
    let mut push_histogram = Histogram::<u64>::new(3)?;
    let mut pop_histogram = Histogram::<u64>::new(3)?;
    let mut push_total = Duration::ZERO;
    let mut pop_total = Duration::ZERO;

    for timing in &timings {
        push_histogram.saturating_record(nanos(timing.push));
        pop_histogram.saturating_record(nanos(timing.pop));
        push_total += timing.push;
        pop_total += timing.pop;
    }

    let mean_push = mean(push_total, timings.len());
    let mean_pop = mean(pop_total, timings.len());

    Ok(ProfileReport {
        name,
        config,
        timings,
        mean_push,
        mean_pop,
        push_histogram,
        pop_histogram,
    })
}

fn mean(total: Duration, count: usize) -> Duration {
    if count == 0 {
        return Duration::ZERO;
    }
    Duration::from_nanos(u64::try_from(total.as_nanos() / count as u128).unwrap_or(u64::MAX))
}

#[inline]
fn nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::Array;
    use crate::growth::{Amortized, Exact};
    use crate::list::{DoublyTailList, SinglyList};

    fn timing(push_ms: u64, pop_ms: u64) -> JobTiming {
        JobTiming {
            push: Duration::from_millis(push_ms),
            pop: Duration::from_millis(pop_ms),
        }
    }

    #[test]
    fn mean_is_sum_over_repeats() {
        let config = ProfileConfig {
            repeats: 3,
            ..ProfileConfig::default()
        };
        let timings = vec![timing(1, 4), timing(2, 5), timing(6, 6)];
        let report = summarize("test", config, timings).unwrap();
        assert_eq!(report.mean_push, Duration::from_millis(3));
        assert_eq!(report.mean_pop, Duration::from_millis(5));
        assert_eq!(report.push_histogram.len(), 3);
        assert_eq!(report.pop_percentiles().max, report.pop_histogram.max());
    }

    #[test]
    fn empty_profile_has_zero_means() {
        let config = ProfileConfig {
            repeats: 0,
            ..ProfileConfig::default()
        };
        let report = summarize("empty", config, Vec::new()).unwrap();
        assert_eq!(report.mean_push, Duration::ZERO);
        assert_eq!(report.mean_pop, Duration::ZERO);
    }

    #[test]
    fn display_matches_cli_format() {
        let report =
            summarize("array-exact", ProfileConfig::default(), vec![timing(2, 1)]).unwrap();
        assert_eq!(report.to_string(), "array-exact:\n\tpush: 2.000ms\n\tpop: 1.000ms");
    }

    #[test]
    fn one_result_per_repeat() {
        let config = ProfileConfig {
            repeats: 6,
            collection_size: 500,
            threads: 3,
        };
        let report = profile_push_pop::<Array<i32, Amortized>, _>(&config, || 10).unwrap();
        assert_eq!(report.name, "array-amortized");
        assert_eq!(report.timings.len(), 6);
        assert_eq!(report.config, config);

        let report = profile_push_pop::<DoublyTailList<i32>, _>(&config, || 10).unwrap();
        assert_eq!(report.timings.len(), 6);
    }

    #[test]
    fn generator_state_is_per_job() {
        let config = ProfileConfig {
            repeats: 2,
            collection_size: 10,
            threads: 1,
        };
        let mut next = 0;
        let counting = move || {
            next += 1;
            next
        };
        let report = profile_push_pop::<SinglyList<i32>, _>(&config, counting).unwrap();
        assert_eq!(report.timings.len(), 2);

        let report = profile_push_pop::<Array<u64, Exact>, _>(&config, || 1u64).unwrap();
        assert_eq!(report.name, "array-exact");
    }
}
