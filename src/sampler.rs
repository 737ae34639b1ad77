//! Native-memory sampling via an external diagnostic tool
//!
//! The probe never inspects the target runtime directly; it talks to it
//! through the narrow [`MemorySampler`] interface. The production
//! implementation shells out to `jcmd`, the JDK's diagnostic command
//! front end, and blocks until each invocation exits.

use crate::error::{ProbeError, Result};
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, warn};

/// Capability proving a baseline has been established for one target.
///
/// The diagnostic tool keeps its baseline as hidden per-process state;
/// modeling it as an explicit token means a diff can only be requested
/// against a target whose baseline this probe actually set, and two
/// probes against different targets cannot cross-contaminate.
#[derive(Debug)]
pub struct BaselineToken {
    target: u32,
}

impl BaselineToken {
    /// Construct a token for a target whose baseline has been set.
    ///
    /// Samplers call this from `establish_baseline` once the external
    /// tool has acknowledged the baseline; holders should never mint
    /// tokens for targets they did not baseline.
    pub fn new(target: u32) -> Self {
        Self { target }
    }

    /// Identity of the target process the baseline was set on
    pub fn target(&self) -> u32 {
        self.target
    }
}

/// Narrow interface over the external diagnostic sampler
pub trait MemorySampler {
    /// Whether the target attributes allocations to call sites reliably.
    ///
    /// Optimizing builds may inline the monitored frame away, so the
    /// probe must not run against them; the caller maps `false` to a
    /// skipped outcome.
    fn attribution_reliable(&mut self) -> Result<bool>;

    /// Mark the target's current allocation bookkeeping as the baseline
    fn establish_baseline(&mut self) -> Result<BaselineToken>;

    /// Produce a detail-diff-against-baseline report scaled to KB
    fn detail_diff_kb(&mut self, baseline: &BaselineToken) -> Result<String>;
}

/// Sampler backed by the `jcmd` diagnostic tool
pub struct JcmdSampler {
    jcmd: PathBuf,
    pid: u32,
}

impl JcmdSampler {
    /// Create a sampler for the given target process, resolving `jcmd`
    /// from PATH
    pub fn new(pid: u32) -> Self {
        Self {
            jcmd: PathBuf::from("jcmd"),
            pid,
        }
    }

    /// Create a sampler using an explicit `jcmd` binary
    pub fn with_jcmd(jcmd: impl Into<PathBuf>, pid: u32) -> Self {
        Self {
            jcmd: jcmd.into(),
            pid,
        }
    }

    /// Target process id
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Whether the target process is currently alive (signal 0)
    pub fn target_alive(&self) -> bool {
        use nix::sys::signal::kill;
        use nix::unistd::Pid;

        kill(Pid::from_raw(self.pid as i32), None).is_ok()
    }

    /// Run one jcmd invocation against the target, blocking until exit
    fn run_jcmd(&self, args: &[&str]) -> Result<String> {
        debug!(pid = self.pid, ?args, "Invoking jcmd");

        let output = Command::new(&self.jcmd)
            .arg(self.pid.to_string())
            .args(args)
            .output()
            .map_err(|e| {
                ProbeError::SamplerLaunch(format!(
                    "failed to launch {}: {}",
                    self.jcmd.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            return Err(ProbeError::SamplerCommand {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl MemorySampler for JcmdSampler {
    fn attribution_reliable(&mut self) -> Result<bool> {
        let banner = self.run_jcmd(&["VM.version"])?;
        let reliable = version_reports_debug_build(&banner);
        if !reliable {
            warn!(
                pid = self.pid,
                "Target VM is not a debug build; call-site attribution may be inlined away"
            );
        }
        Ok(reliable)
    }

    fn establish_baseline(&mut self) -> Result<BaselineToken> {
        debug!(pid = self.pid, "Establishing native-memory baseline");
        self.run_jcmd(&["VM.native_memory", "baseline=true"])?;
        Ok(BaselineToken::new(self.pid))
    }

    fn detail_diff_kb(&mut self, baseline: &BaselineToken) -> Result<String> {
        if baseline.target != self.pid {
            return Err(ProbeError::BaselineMismatch {
                token_target: baseline.target,
                sampler_target: self.pid,
            });
        }

        self.run_jcmd(&["VM.native_memory", "detail.diff", "scale=KB"])
    }
}

/// Whether a `VM.version` banner describes a debug-capable build.
///
/// Release banners carry "mixed mode" alone; debug builds qualify the
/// build kind, e.g. "debug", "fastdebug" or "slowdebug".
pub fn version_reports_debug_build(banner: &str) -> bool {
    banner.lines().any(|line| line.contains("debug"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_banner_detected() {
        let banner = "\
1234:
OpenJDK 64-Bit Server VM version 21-internal-adhoc (fastdebug build 21)
JDK 21.0.1
";
        assert!(version_reports_debug_build(banner));
    }

    #[test]
    fn test_slowdebug_banner_detected() {
        let banner = "OpenJDK 64-Bit Server VM (slowdebug build, mixed mode)";
        assert!(version_reports_debug_build(banner));
    }

    #[test]
    fn test_release_banner_rejected() {
        let banner = "\
1234:
OpenJDK 64-Bit Server VM version 21.0.1+12
JDK 21.0.1
";
        assert!(!version_reports_debug_build(banner));
    }

    #[test]
    fn test_empty_banner_rejected() {
        assert!(!version_reports_debug_build(""));
    }

    #[test]
    fn test_baseline_token_bound_to_target() {
        let mut sampler = JcmdSampler::new(4242);
        let token = BaselineToken::new(9999);

        let err = sampler.detail_diff_kb(&token).unwrap_err();
        assert!(matches!(
            err,
            crate::error::ProbeError::BaselineMismatch {
                token_target: 9999,
                sampler_target: 4242,
            }
        ));
    }

    #[test]
    fn test_missing_jcmd_is_a_launch_error() {
        let mut sampler = JcmdSampler::with_jcmd("/nonexistent/jcmd", 1);
        let err = sampler.establish_baseline().unwrap_err();
        assert!(matches!(err, crate::error::ProbeError::SamplerLaunch(_)));
    }
}
