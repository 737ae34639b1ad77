//! Load/unload workload interface
//!
//! One cycle is the external "unit of work": load the two driver
//! classes under a fresh disposable loader, instantiate them, drop all
//! references and ask the runtime to reclaim unreachable loaders. How
//! that happens is the target's business; the probe only needs a way to
//! trigger it and to know it completed.

use crate::error::{ProbeError, Result};
use std::process::Command;
use tracing::debug;

/// One load/unload cycle against the target runtime
pub trait Workload {
    fn run_cycle(&mut self) -> Result<()>;
}

/// Workload that spawns a configured command once per cycle.
///
/// The command is expected to drive the target through one full
/// load/instantiate/drop/unload cycle and exit zero when the cycle
/// completed. Each spawn blocks until the command exits.
#[derive(Debug)]
pub struct CommandWorkload {
    program: String,
    args: Vec<String>,
}

impl CommandWorkload {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a full command line, first element being the program
    pub fn from_command_line(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| ProbeError::Config("empty workload command".to_string()))?;
        Ok(Self::new(program.clone(), args.to_vec()))
    }
}

impl Workload for CommandWorkload {
    fn run_cycle(&mut self) -> Result<()> {
        debug!(program = %self.program, "Running workload cycle");

        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|e| {
                ProbeError::Workload(format!("failed to launch {}: {}", self.program, e))
            })?;

        if !output.status.success() {
            return Err(ProbeError::Workload(format!(
                "{} exited with status {}: {}",
                self.program,
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_command_line_rejected() {
        let err = CommandWorkload::from_command_line(&[]).unwrap_err();
        assert!(matches!(err, ProbeError::Config(_)));
    }

    #[test]
    fn test_successful_cycle() {
        let mut workload = CommandWorkload::new("true", vec![]);
        assert!(workload.run_cycle().is_ok());
    }

    #[test]
    fn test_failing_cycle() {
        let mut workload = CommandWorkload::new("false", vec![]);
        let err = workload.run_cycle().unwrap_err();
        assert!(matches!(err, ProbeError::Workload(_)));
    }

    #[test]
    fn test_missing_program() {
        let mut workload = CommandWorkload::new("/nonexistent/cycle-driver", vec![]);
        let err = workload.run_cycle().unwrap_err();
        assert!(err.to_string().contains("failed to launch"));
    }
}
