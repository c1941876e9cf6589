use std::borrow::Cow;
use std::process::ExitStatus;
use std::time::Duration;

/// Exit-status convention of consumers that read a single integer
pub const LEGACY_TIMEOUT_STATUS: i32 = -1;

/// How the process under test ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Exited on its own with a status code
    Exited(i32),
    /// Killed by a signal it did not handle (Unix)
    Signaled(i32),
    /// Killed by the harness after `timeout_ms`
    TimedOut,
}

impl Termination {
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Termination::Exited(code) => Some(*code),
            _ => None,
        }
    }

    /// True for anything a clean `exit(0..=255)` cannot produce
    pub fn is_abnormal(&self) -> bool {
        match self {
            Termination::Exited(code) => !(0..=255).contains(code),
            Termination::Signaled(_) | Termination::TimedOut => true,
        }
    }

    /// Collapse into one integer: the exit code, or -1 when there is none
    pub fn legacy_status(&self) -> i32 {
        match self {
            Termination::Exited(code) => *code,
            Termination::Signaled(_) | Termination::TimedOut => LEGACY_TIMEOUT_STATUS,
        }
    }

    #[cfg(unix)]
    pub fn signal_name(&self) -> Option<&'static str> {
        match self {
            Termination::Signaled(sig) => nix::sys::signal::Signal::try_from(*sig)
                .ok()
                .map(|s| s.as_str()),
            _ => None,
        }
    }
}

impl From<ExitStatus> for Termination {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Termination::Exited(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(sig) = status.signal() {
                return Termination::Signaled(sig);
            }
        }
        // no code and no signal: treat as outside the valid range
        Termination::Exited(LEGACY_TIMEOUT_STATUS)
    }
}

/// Everything observed from one run of the process under test
#[derive(Debug, Clone)]
pub struct HarnessReport {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub termination: Termination,
    /// Time from spawn until the process was reaped
    pub elapsed: Duration,
}

impl HarnessReport {
    pub fn stdout_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    pub fn stderr_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }
}
