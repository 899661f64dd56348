//! Randomized push/pop workloads validated against a reference stack.
//!
//! A [`CommandGenerator`] produces an endless, seeded stream of
//! [`Command`]s. [`replay`] applies them to any [`Stack`] and to a plain
//! `Vec`, and after every command checks that the container's cursor yields
//! exactly the reference contents.
//!
//! # Example
//!
//! ```
//! use nexus_stack::workload::{CommandGenerator, WorkloadConfig, replay};
//! use nexus_stack::SinglyTailList;
//!
//! let config = WorkloadConfig { commands: 500, ..WorkloadConfig::default() };
//! let mut list = SinglyTailList::new();
//! let summary = replay(&mut list, CommandGenerator::new(&config).take(config.commands)).unwrap();
//! assert_eq!(summary.pushes + summary.pops, 500);
//! ```

use core::fmt::Debug;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::cursor::Cursor;
use crate::error::WorkloadError;
use crate::stack::Stack;

/// One step of a workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<T> {
    /// Push the value.
    Push(T),
    /// Pop the top value, if any.
    Pop,
}

/// Parameters of a generated workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadConfig {
    /// Number of commands to replay.
    pub commands: usize,
    /// Smallest pushed value (inclusive).
    pub min_value: i32,
    /// Largest pushed value (inclusive).
    pub max_value: i32,
    /// Seed of the command stream.
    pub seed: u64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            commands: 100_000,
            min_value: -100_000,
            max_value: 100_000,
            seed: 0x5eed,
        }
    }
}

/// Seeded source of [`Command`]s: pushes and pops with equal probability,
/// values uniform in `[min_value, max_value]`.
///
/// The iterator never ends; bound it with [`Iterator::take`].
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    rng: SmallRng,
    min_value: i32,
    max_value: i32,
}

impl CommandGenerator {
    /// Creates a generator from `config`.
    ///
    /// # Panics
    ///
    /// Panics if `min_value > max_value`.
    pub fn new(config: &WorkloadConfig) -> Self {
        assert!(
            config.min_value <= config.max_value,
            "empty value range {}..={}",
            config.min_value,
            config.max_value
        );
        Self {
            rng: SmallRng::seed_from_u64(config.seed),
            min_value: config.min_value,
            max_value: config.max_value,
        }
    }

    /// Draws a value from the configured range.
    #[inline]
    pub fn next_value(&mut self) -> i32 {
        self.rng.random_range(self.min_value..=self.max_value)
    }

    /// Draws the next command.
    #[inline]
    pub fn next_command(&mut self) -> Command<i32> {
        if self.rng.random_bool(0.5) {
            Command::Push(self.next_value())
        } else {
            Command::Pop
        }
    }
}

impl Iterator for CommandGenerator {
    type Item = Command<i32>;

    #[inline]
    fn next(&mut self) -> Option<Command<i32>> {
        Some(self.next_command())
    }
}

/// Counters collected by [`replay`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Number of push commands.
    pub pushes: usize,
    /// Number of pop commands, including pops of an empty stack.
    pub pops: usize,
    /// Pops issued while the stack was empty.
    pub empty_pops: usize,
    /// Largest length reached.
    pub max_len: usize,
    /// Length after the last command.
    pub final_len: usize,
}

/// Checks that `stack`'s cursor yields exactly `reference`, bottom to top.
///
/// # Errors
///
/// Returns [`WorkloadError::Mismatch`] at the first differing element and
/// [`WorkloadError::LengthMismatch`] when one side runs out first. `step` is
/// reported in the error.
pub fn compare_with_reference<S>(
    stack: &S,
    reference: &[S::Item],
    step: usize,
) -> Result<(), WorkloadError>
where
    S: Stack,
    S::Item: PartialEq + Debug,
{
    let mut cursor = stack.cursor();
    let mut position = 0;
    while let Some(found) = cursor.current() {
        let Some(expected) = reference.get(position) else {
            return Err(length_mismatch(stack, reference, step));
        };
        if found != expected {
            return Err(WorkloadError::Mismatch {
                step,
                position,
                expected: format!("{expected:?}"),
                found: format!("{found:?}"),
            });
        }
        cursor.advance();
        position += 1;
    }

    if position != reference.len() || stack.len() != reference.len() {
        return Err(length_mismatch(stack, reference, step));
    }
    Ok(())
}

fn length_mismatch<S: Stack>(stack: &S, reference: &[S::Item], step: usize) -> WorkloadError {
    let mut found = 0;
    let mut cursor = stack.cursor();
    while cursor.has_value() {
        found += 1;
        cursor.advance();
    }
    WorkloadError::LengthMismatch {
        step,
        expected: reference.len(),
        found,
    }
}

/// Applies `commands` to `stack` and to a reference `Vec`, validating after
/// every command.
///
/// Popped values are compared too: a pop that returns a different value
/// from the reference is reported as a mismatch at the old top position.
///
/// # Errors
///
/// Returns the first divergence found; see [`compare_with_reference`].
pub fn replay<S, I>(stack: &mut S, commands: I) -> Result<ReplaySummary, WorkloadError>
where
    S: Stack,
    S::Item: Clone + PartialEq + Debug,
    I: IntoIterator<Item = Command<S::Item>>,
{
    let mut reference: Vec<S::Item> = stack_contents(stack);
    let mut summary = ReplaySummary {
        max_len: reference.len(),
        ..ReplaySummary::default()
    };

    for (step, command) in commands.into_iter().enumerate() {
        match command {
            Command::Push(value) => {
                stack.push(value.clone());
                reference.push(value);
                summary.pushes += 1;
            }
            Command::Pop => {
                summary.pops += 1;
                let position = reference.len().saturating_sub(1);
                let expected = reference.pop();
                let found = stack.pop();
                if expected.is_none() {
                    summary.empty_pops += 1;
                }
                if found != expected {
                    return Err(WorkloadError::Mismatch {
                        step,
                        position,
                        expected: format!("{expected:?}"),
                        found: format!("{found:?}"),
                    });
                }
            }
        }
        summary.max_len = summary.max_len.max(reference.len());
        compare_with_reference(stack, &reference, step)?;
    }

    summary.final_len = reference.len();
    Ok(summary)
}

/// Generates `config.commands` commands and replays them on a fresh `S`.
///
/// # Errors
///
/// See [`replay`].
pub fn run_workload<S>(config: &WorkloadConfig) -> Result<ReplaySummary, WorkloadError>
where
    S: Stack<Item = i32>,
{
    let mut stack = S::default();
    let commands = CommandGenerator::new(config).take(config.commands);
    let summary = replay(&mut stack, commands)?;
    debug!(
        container = S::NAME,
        commands = config.commands,
        pushes = summary.pushes,
        pops = summary.pops,
        max_len = summary.max_len,
        "workload validated"
    );
    Ok(summary)
}

fn stack_contents<S>(stack: &S) -> Vec<S::Item>
where
    S: Stack,
    S::Item: Clone,
{
    let mut out = Vec::with_capacity(stack.len());
    let mut cursor = stack.cursor();
    while let Some(value) = cursor.current() {
        out.push(value.clone());
        cursor.advance();
    }
    out
}
