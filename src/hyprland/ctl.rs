//! [`Hyprctl`] implementation that spawns the `hyprctl` binary.
//!
//! Every call is a short-lived, synchronous child process; callers on the
//! UI thread block until it exits.

use crate::traits::Hyprctl;
use log::{debug, warn};
use std::process::Command;

/// Runs `hyprctl` (or a configured replacement) as a child process.
#[derive(Debug, Clone)]
pub struct HyprctlCommand {
    program: String,
}

impl Default for HyprctlCommand {
    fn default() -> Self {
        Self::new("hyprctl")
    }
}

impl HyprctlCommand {
    /// Use `program` as the control binary.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Hyprctl for HyprctlCommand {
    fn run(&self, args: &[&str]) -> Option<String> {
        debug!("{} {}", self.program, args.join(" "));
        let output = match Command::new(&self.program).args(args).output() {
            Ok(output) => output,
            Err(e) => {
                warn!("failed to launch {}: {}", self.program, e);
                return None;
            }
        };

        if !output.status.success() {
            warn!(
                "{} {} failed ({}): {}",
                self.program,
                args.join(" "),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return None;
        }

        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_yields_none() {
        let ctl = HyprctlCommand::new("/nonexistent/hyprctl-for-tests");
        assert_eq!(ctl.run(&["clients", "-j"]), None);
    }

    #[test]
    fn stdout_is_returned_trimmed() {
        let ctl = HyprctlCommand::new("echo");
        assert_eq!(ctl.run(&["ok"]).as_deref(), Some("ok"));
    }

    #[test]
    fn failure_status_yields_none() {
        let ctl = HyprctlCommand::new("false");
        assert_eq!(ctl.run(&[]), None);
    }
}
