//! # echo-fault-stub
//!
//! A scripted stand-in process for tests that exercise process spawning
//! and IPC, plus the async harness that drives it.
//!
//! The stub reads one JSON object from stdin and then, in this order:
//! writes `error` to stderr, writes `info` to stdout, aborts if asked to via
//! `exception`, sleeps, and exits with `exitcode`.
//!
//! ## Binaries
//!
//! - `stub-sleep`: sleeps for `sleep` microseconds only when it is set;
//!   `exception` is ignored.
//! - `stub-delay`: always sleeps for `delay` microseconds; a non-empty
//!   `exception` aborts the process (no exit code, `SIGABRT` on Unix).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use echo_fault_stub::harness::{config::HarnessConfig, spawner::StubHarness};
//! use echo_fault_stub::stub::request::StubRequest;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let harness = StubHarness::new(HarnessConfig::new("stub-delay").timeout_ms(5000));
//!     let request = StubRequest::new().info("hello").delay(1000).exitcode(3);
//!
//!     let report = harness.run_request(&request).await?;
//!     assert_eq!(report.stdout_str(), "hello");
//!     assert_eq!(report.termination.exit_code(), Some(3));
//!     Ok(())
//! }
//! ```
//!
//! ## In-process use
//!
//! ```rust
//! use echo_fault_stub::stub::{config::StubConfig, outcome::StubOutcome, runner::StubRunner};
//!
//! let mut stdout: Vec<u8> = Vec::new();
//! let mut stderr: Vec<u8> = Vec::new();
//! let outcome = StubRunner::new(StubConfig::delay_variant())
//!     .run(&br#"{"error":"bad thing","exitcode":7}"#[..], &mut stdout, &mut stderr)
//!     .unwrap();
//!
//! assert_eq!(outcome, StubOutcome::Exit(7));
//! assert_eq!(stderr, b"bad thing");
//! ```
//!
//! ## Logging
//!
//! Stdout and stderr belong to the request, so the binaries only log when
//! `ECHO_FAULT_STUB_LOG_DIR` names a directory. `ECHO_FAULT_STUB_LOG` sets
//! the filter (default `debug`).
//!
//! ## Optional Features
//!
//! - `harness` (default): the tokio based [`harness`] module
//! - `tracing` (default): structured logging integration

pub mod helper;
pub mod stub;

#[cfg(feature = "harness")]
pub mod harness;
