//! The matrix resolution engine.
//!
//! [`Resolver`] drives the brute-force search: advance the odometer, persist
//! the ordinal, write the exact-pin constraint file, hand it to pip-compile,
//! and either halt on success or classify the failure and continue. The loop
//! runs on one sequential lane - validation fully completes, retries
//! included, before the next combination is attempted.
//!
//! Control (`pause`/`resume`/`stop`) arrives over a watch channel from a
//! [`ControlHandle`] and is observed only at safe points: the top of a cycle,
//! never mid-write and never by aborting an in-flight pip-compile attempt.
//! Progress and log output leave the engine as [`ResolverEvent`]s; the
//! engine itself never prints.
//!
//! Resumability: the ordinal is persisted *before* each validation attempt.
//! An operator stop and a process crash are therefore equivalent - both
//! resume by reconstructing the digit vector from the stored ordinal
//! ([`odometer::ordinal_to_vector`]) and re-validating the same combination,
//! which can repeat work but can never silently skip a viable combination.

pub mod constraints;
pub mod odometer;
pub mod state;

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

use crate::candidates::CandidateSet;
use crate::config::Config;
use crate::constants::MAX_MEANINGFUL_TOTAL;
use crate::pip::compile::CompileRunner;
use crate::utils::ensure_dir;
use state::IterationStateStore;

/// Externally visible run state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    /// No run has started yet
    Idle,
    /// The loop is advancing through combinations
    Running,
    /// The loop is parked between iterations
    Paused,
    /// The operator stopped the run; `start` may re-enter from persisted state
    Stopped,
    /// A combination validated; carries the resolved lock path
    Succeeded(PathBuf),
    /// Every combination was tried without success
    Exhausted,
}

/// Events emitted by the engine for the surrounding application.
#[derive(Debug, Clone)]
pub enum ResolverEvent {
    /// A human-readable log line (attempt start, classification, outcome)
    LogMessage(String),
    /// Progress after a failed attempt
    ProgressChanged {
        /// Combinations fully attempted so far
        attempts: u64,
        /// Total combinations, when the product is computable
        total: Option<u128>,
        /// Completion estimate, when the total is small enough to be
        /// meaningful (capped at 100)
        percent: Option<f64>,
    },
    /// Exactly one per successful run, carrying the output artifact path
    SuccessCompiled(PathBuf),
    /// Run-state transition
    StateChanged(RunState),
}

/// Control requests checked by the loop at safe points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControlRequest {
    Run,
    Pause,
    Stop,
}

/// Handle for pausing, resuming, and stopping a running resolver.
///
/// Safe to call from any task at any time; requests take effect at the
/// loop's next safe point. Requests sent while the engine is in a terminal
/// state are ignored.
#[derive(Clone)]
pub struct ControlHandle {
    tx: Arc<watch::Sender<ControlRequest>>,
}

impl ControlHandle {
    /// Requests a pause before the next combination is attempted.
    ///
    /// Never aborts an in-flight validation attempt.
    pub fn pause(&self) {
        let _ = self.tx.send(ControlRequest::Pause);
    }

    /// Returns a paused loop to running.
    pub fn resume(&self) {
        let _ = self.tx.send(ControlRequest::Run);
    }

    /// Requests a cooperative stop at the next safe point.
    pub fn stop(&self) {
        let _ = self.tx.send(ControlRequest::Stop);
    }
}

/// How a completed `run` call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A combination validated; the resolved lock is at this path
    Succeeded(PathBuf),
    /// The search space is fully covered without success
    Exhausted,
    /// The operator stopped the run
    Stopped,
}

/// The matrix resolution controller.
///
/// Owns the odometer vector and run state exclusively; the iteration-state
/// store has single-writer discipline (only this controller writes it).
pub struct Resolver {
    config: Config,
    candidates: CandidateSet,
    store: IterationStateStore,
    runner: CompileRunner,
    events: mpsc::UnboundedSender<ResolverEvent>,
    control: Arc<watch::Sender<ControlRequest>>,
}

impl Resolver {
    /// Creates a resolver plus its control handle and event stream.
    pub fn new(
        config: Config,
        candidates: CandidateSet,
    ) -> (Self, ControlHandle, mpsc::UnboundedReceiver<ResolverEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (control_tx, _) = watch::channel(ControlRequest::Run);
        let control = Arc::new(control_tx);

        let resolver = Self {
            store: IterationStateStore::new(config.state_file()),
            runner: CompileRunner::new(&config),
            config,
            candidates,
            events: events_tx,
            control: Arc::clone(&control),
        };
        let handle = ControlHandle {
            tx: control,
        };
        (resolver, handle, events_rx)
    }

    fn emit(&self, event: ResolverEvent) {
        // A dropped receiver means nobody is listening; the run goes on.
        let _ = self.events.send(event);
    }

    fn log(&self, line: impl Into<String>) {
        let line = line.into();
        tracing::info!(target: "resolver", "{line}");
        self.emit(ResolverEvent::LogMessage(line));
    }

    fn set_state(&self, state: RunState) {
        self.emit(ResolverEvent::StateChanged(state));
    }

    /// Runs the search to a terminal outcome.
    ///
    /// Entering here is the `start` transition: the persisted ordinal is
    /// read, the digit vector reconstructed from it, and the loop begins.
    /// Calling `run` again after a [`RunOutcome::Stopped`] return resumes
    /// from the last persisted ordinal, even across process restarts.
    ///
    /// Per-combination validation failures never abort the run. The only
    /// fatal conditions are a missing interpreter, a failure to persist the
    /// ordinal, and an unwritable working directory.
    pub async fn run(&mut self) -> Result<RunOutcome> {
        ensure_dir(&self.config.work_dir)?;
        crate::pip::find_python(&self.config.python)?;

        // A fresh run() call always re-enters Running, clearing any stale
        // stop request from a previous run.
        let _ = self.control.send(ControlRequest::Run);
        let mut control_rx = self.control.subscribe();

        let max_indices = self.candidates.max_indices();
        let total = odometer::total_combinations(&max_indices);
        let mut ordinal = self.store.read()?;
        let mut vector = odometer::ordinal_to_vector(u128::from(ordinal), &max_indices);

        match total {
            Some(total_count) if u128::from(ordinal) >= total_count => {
                self.log("All combinations exhausted.");
                self.set_state(RunState::Exhausted);
                return Ok(RunOutcome::Exhausted);
            }
            _ => {}
        }

        if ordinal > 0 {
            self.log(format!("Resuming from attempt #{}", ordinal + 1));
        }
        self.log(match total {
            Some(total_count) => format!(
                "Starting matrix resolution: {} packages, {} combinations",
                self.candidates.len(),
                total_count
            ),
            None => format!(
                "Starting matrix resolution: {} packages, combination count too large to display",
                self.candidates.len()
            ),
        });
        self.set_state(RunState::Running);

        let constraints_path = self.config.constraints_file();

        loop {
            // Safe point: act on pause/stop before touching any state. The
            // watch guard must not be held across an await, so the request
            // is copied out before matching.
            let request = *control_rx.borrow_and_update();
            match request {
                ControlRequest::Stop => return self.finish_stopped(),
                ControlRequest::Pause => {
                    self.set_state(RunState::Paused);
                    self.log("Resolution paused.");
                    loop {
                        if control_rx.changed().await.is_err() {
                            // All control handles dropped while paused;
                            // nothing can ever resume us.
                            return self.finish_stopped();
                        }
                        let request = *control_rx.borrow_and_update();
                        match request {
                            ControlRequest::Run => break,
                            ControlRequest::Stop => return self.finish_stopped(),
                            ControlRequest::Pause => {}
                        }
                    }
                    self.set_state(RunState::Running);
                    self.log("Resolution resumed.");
                }
                ControlRequest::Run => {}
            }

            // Persist before validating: the stored ordinal must always
            // cover the combination in flight.
            self.store.write(ordinal)?;

            constraints::write(&self.candidates, &vector, &constraints_path)?;

            let attempt = ordinal + 1;
            self.log(format!(
                "Attempt #{attempt}: {}",
                constraints::display(&self.candidates, &vector)
            ));

            let output_path = self.config.output_file(attempt);
            let verdict = self
                .runner
                .validate(&constraints_path, &output_path, self.config.compile_retries)
                .await?;

            match verdict {
                Ok(()) => {
                    self.log(format!("Success: resolved lock written to {}", output_path.display()));
                    self.emit(ResolverEvent::SuccessCompiled(output_path.clone()));
                    self.set_state(RunState::Succeeded(output_path.clone()));
                    return Ok(RunOutcome::Succeeded(output_path));
                }
                Err(failure) => {
                    self.log(format!("Attempt #{attempt} failed: {}", failure.classification));
                    self.emit(ResolverEvent::ProgressChanged {
                        attempts: attempt,
                        total,
                        percent: progress_percent(attempt, total),
                    });
                }
            }

            let (next, exhausted) = odometer::increment(&vector, &max_indices);
            if exhausted {
                self.log("All combinations exhausted.");
                self.set_state(RunState::Exhausted);
                return Ok(RunOutcome::Exhausted);
            }
            vector = next;
            ordinal += 1;
        }
    }

    fn finish_stopped(&self) -> Result<RunOutcome> {
        self.log("Resolution stopped by operator.");
        self.set_state(RunState::Stopped);
        Ok(RunOutcome::Stopped)
    }
}

/// Completion estimate for a given attempt count.
///
/// `None` when the total is unknown (product overflow) or too large for a
/// percentage to mean anything; otherwise `attempts / total * 100`, capped
/// at 100.
pub fn progress_percent(attempts: u64, total: Option<u128>) -> Option<f64> {
    match total {
        Some(total_count) if total_count > 0 && total_count <= MAX_MEANINGFUL_TOTAL => {
            let percent = (attempts as f64 / total_count as f64) * 100.0;
            Some(percent.min(100.0))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_is_ratio_of_attempts_to_total() {
        assert_eq!(progress_percent(1, Some(4)), Some(25.0));
        assert_eq!(progress_percent(4, Some(4)), Some(100.0));
    }

    #[test]
    fn percent_caps_at_one_hundred() {
        assert_eq!(progress_percent(9, Some(4)), Some(100.0));
    }

    #[test]
    fn percent_suppressed_for_huge_or_unknown_totals() {
        assert_eq!(progress_percent(10, None), None);
        assert_eq!(progress_percent(10, Some(MAX_MEANINGFUL_TOTAL + 1)), None);
    }
}
