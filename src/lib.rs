//! Leakprobe - native-memory leak probe for class load/unload cycles
//!
//! Detects whether native allocations attributed to the runtime's
//! method-identifier registry grow across two equivalent rounds of
//! repeated class load/unload work. Each round performs a configured
//! number of cycles, then captures one sample from a native-memory
//! detail diff produced by an external diagnostic tool; strict growth
//! between the two samples is reported as a leak.
//!
//! The probe is deliberately synchronous and sequential: every external
//! invocation blocks until it exits, and round 2 starts only after
//! round 1's report has been captured.
//!
//! # Example
//!
//! ```ignore
//! use leakprobe_core::{CommandWorkload, JcmdSampler, LeakProbe, ProbeConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let sampler = JcmdSampler::new(4242);
//!     let workload = CommandWorkload::new("java", vec![
//!         "-cp".into(), "drivers".into(), "CycleDriver".into(),
//!     ]);
//!     let mut probe = LeakProbe::new(sampler, workload, ProbeConfig::default());
//!
//!     let outcome = probe.run()?;
//!     println!("{}", outcome);
//!     std::process::exit(outcome.exit_code());
//! }
//! ```

pub mod config;
pub mod error;
pub mod probe;
pub mod report;
pub mod sampler;
pub mod workload;

// Re-export commonly used types
pub use config::{ParseMissPolicy, ProbeConfig, DEFAULT_CYCLES};
pub use error::{ProbeError, Result};
pub use probe::{LeakProbe, Outcome};
pub use report::{scan_malloc_kb, ScanOutcome, JMETHOD_ID_MARKER};
pub use sampler::{BaselineToken, JcmdSampler, MemorySampler};
pub use workload::{CommandWorkload, Workload};
