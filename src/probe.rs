//! Memory-growth detection protocol
//!
//! The probe runs two equivalent rounds of repeated load/unload work
//! against one externally-established baseline and compares the two
//! resulting samples. Strict growth between round 1 and round 2 is the
//! leak signal.
//!
//! Exactly two rounds are compared, not a trend line: a leak that only
//! manifests from the third round onward is missed. Known limitation,
//! accepted for the bounded-duration diagnostic this is.

use crate::config::{ParseMissPolicy, ProbeConfig};
use crate::error::{ProbeError, Result};
use crate::report::{scan_malloc_kb, ScanOutcome};
use crate::sampler::{BaselineToken, MemorySampler};
use crate::workload::Workload;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Three-valued probe outcome.
///
/// Skipped is distinct from both pass and fail so callers cannot read
/// "inconclusive" as "no leak".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum Outcome {
    /// Precondition unmet; the probe body never ran
    Skipped { reason: String },

    /// No growth between the two rounds
    Pass { first_kb: u64, second_kb: u64 },

    /// Monitored allocations grew between the two rounds
    Fail { first_kb: u64, second_kb: u64 },
}

impl Outcome {
    /// Whether this outcome signals a leak
    pub fn is_leak(&self) -> bool {
        matches!(self, Outcome::Fail { .. })
    }

    /// Process exit code for this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Pass { .. } => 0,
            Outcome::Skipped { .. } => 1,
            Outcome::Fail { .. } => 2,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Skipped { reason } => write!(f, "Skipped: {}", reason),
            Outcome::Pass {
                first_kb,
                second_kb,
            } => write!(
                f,
                "No growth: round 1: {}KB, round 2: {}KB",
                first_kb, second_kb
            ),
            Outcome::Fail {
                first_kb,
                second_kb,
            } => write!(
                f,
                "Found memory leak: round 1: {}KB, round 2: {}KB",
                first_kb, second_kb
            ),
        }
    }
}

/// Leak probe over a sampler and a workload
pub struct LeakProbe<S: MemorySampler, W: Workload> {
    sampler: S,
    workload: W,
    config: ProbeConfig,
}

impl<S: MemorySampler, W: Workload> LeakProbe<S, W> {
    pub fn new(sampler: S, workload: W, config: ProbeConfig) -> Self {
        Self {
            sampler,
            workload,
            config,
        }
    }

    /// Run the full probe: precondition check, baseline, two rounds,
    /// verdict.
    ///
    /// The rounds are strictly sequential; round 2 starts only after
    /// round 1's diff report has been fully captured, since both share
    /// the one baseline and one target identity.
    pub fn run(&mut self) -> Result<Outcome> {
        if !self.sampler.attribution_reliable()? {
            return Ok(Outcome::Skipped {
                reason: "target is not a debug build; call-site attribution is unreliable"
                    .to_string(),
            });
        }

        let baseline = self.sampler.establish_baseline()?;

        let first_kb = self.run_round(&baseline)?;
        info!(round = 1, sample_kb = first_kb, "Round complete");

        let second_kb = self.run_round(&baseline)?;
        info!(round = 2, sample_kb = second_kb, "Round complete");

        if second_kb > first_kb {
            Ok(Outcome::Fail {
                first_kb,
                second_kb,
            })
        } else {
            Ok(Outcome::Pass {
                first_kb,
                second_kb,
            })
        }
    }

    /// One round: `cycles` workload repetitions, one diff report, one
    /// sample
    fn run_round(&mut self, baseline: &BaselineToken) -> Result<u64> {
        for cycle in 0..self.config.cycles {
            debug!(cycle, "Workload cycle");
            self.workload.run_cycle()?;
        }

        let report = self.sampler.detail_diff_kb(baseline)?;

        match scan_malloc_kb(report.lines(), &self.config.marker)? {
            ScanOutcome::Found(kb) => Ok(kb),
            miss => match self.config.parse_miss {
                ParseMissPolicy::ZeroDefault => {
                    warn!(?miss, "Report scan missed; treating sample as 0KB");
                    Ok(0)
                }
                ParseMissPolicy::Strict => Err(ProbeError::ScanMiss(format!(
                    "report contains no usable `malloc=` entry for marker {:?} ({:?})",
                    self.config.marker, miss
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_exit_codes() {
        let pass = Outcome::Pass {
            first_kb: 1,
            second_kb: 1,
        };
        let skip = Outcome::Skipped {
            reason: "x".to_string(),
        };
        let fail = Outcome::Fail {
            first_kb: 1,
            second_kb: 2,
        };

        assert_eq!(pass.exit_code(), 0);
        assert_eq!(skip.exit_code(), 1);
        assert_eq!(fail.exit_code(), 2);
        assert!(fail.is_leak());
        assert!(!pass.is_leak());
        assert!(!skip.is_leak());
    }

    #[test]
    fn test_fail_message_carries_both_samples() {
        let fail = Outcome::Fail {
            first_kb: 120,
            second_kb: 256,
        };
        let msg = fail.to_string();
        assert!(msg.contains("120"));
        assert!(msg.contains("256"));
    }

    #[test]
    fn test_outcome_json_shape() {
        let fail = Outcome::Fail {
            first_kb: 120,
            second_kb: 256,
        };
        let json = serde_json::to_value(&fail).unwrap();
        assert_eq!(json["outcome"], "fail");
        assert_eq!(json["first_kb"], 120);
        assert_eq!(json["second_kb"], 256);
    }
}
