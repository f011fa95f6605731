//! pipmatrix - brute-force pip dependency matrix resolution.
//!
//! pipmatrix takes a requirements list, expands each package into an ordered
//! set of candidate versions, and walks the Cartesian product of those sets
//! like an odometer, validating every combination with `pip-compile` until
//! one resolves. The position in the search is persisted as a single integer
//! before each attempt, so a crash or an operator stop resumes exactly where
//! it left off, never skipping a combination.
//!
//! # Architecture
//!
//! - [`requirements`] - loading (file or URL) and per-line validation of the
//!   input requirements
//! - [`candidates`] - the enumerable search space: per-package candidate
//!   version lists, expanded via `pip index versions`
//! - [`resolver`] - the engine: pure odometer math, constraint rendering,
//!   durable iteration state, and the controller driving the loop
//! - [`pip`] - subprocess plumbing for `pip` and `pip-compile`, including
//!   timeouts, retries, and failure classification
//! - [`config`] - `pipmatrix.toml` discovery and defaults
//! - [`cli`] - the `resolve` / `validate` / `status` / `reset` commands
//!
//! The engine treats pip-compile as a black-box oracle: a non-zero exit is
//! data about the combination, not a program error. Only environmental
//! problems (missing interpreter, unwritable state) abort a run.

#![warn(clippy::all)]

pub mod candidates;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod pip;
pub mod requirements;
pub mod resolver;
pub mod utils;
