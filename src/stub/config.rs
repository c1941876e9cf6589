use serde::{Deserialize, Serialize};

use crate::stub::error::StubError;

/// Environment variable naming the log directory
pub const LOG_DIR_ENV: &str = "ECHO_FAULT_STUB_LOG_DIR";
/// Environment variable holding the log filter directive
pub const LOG_FILTER_ENV: &str = "ECHO_FAULT_STUB_LOG";

/// How the stub decides whether to suspend before exiting
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SuspendPolicy {
    /// Read `sleep`, suspend only when it is set
    WhenSet,
    /// Read `delay`, always suspend (zero allowed)
    Always,
}

impl Default for SuspendPolicy {
    fn default() -> Self {
        Self::WhenSet
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct StubConfig {
    /// Suspension policy
    pub suspend: SuspendPolicy,

    /// Honour the `exception` field
    pub faults: bool,

    /// Directory for the log file, logging is off when unset
    pub log_dir: Option<String>,

    /// `EnvFilter` directive for the log file
    pub log_filter: Option<String>,
}

impl Default for StubConfig {
    fn default() -> Self {
        StubConfig::sleep_variant()
    }
}

impl StubConfig {
    /// Conditional `sleep`, no fault path
    pub fn sleep_variant() -> Self {
        StubConfig {
            suspend: SuspendPolicy::WhenSet,
            faults: false,
            log_dir: None,
            log_filter: None,
        }
    }

    /// Unconditional `delay`, `exception` aborts
    pub fn delay_variant() -> Self {
        StubConfig {
            suspend: SuspendPolicy::Always,
            faults: true,
            ..Self::sleep_variant()
        }
    }

    pub fn suspend(mut self, policy: SuspendPolicy) -> Self {
        self.suspend = policy;
        self
    }

    pub fn faults(mut self, enabled: bool) -> Self {
        self.faults = enabled;
        self
    }

    pub fn log_dir(mut self, dir: impl Into<String>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = Some(filter.into());
        self
    }

    /// Overlay logging settings from the process environment
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay logging settings from an arbitrary lookup
    ///
    /// Empty values are treated as absent.
    pub fn with_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(LOG_DIR_ENV).filter(|v| !v.is_empty()) {
            self.log_dir = Some(dir);
        }
        if let Some(filter) = lookup(LOG_FILTER_ENV).filter(|v| !v.is_empty()) {
            self.log_filter = Some(filter);
        }
        self
    }

    pub fn validate(&self) -> Result<(), StubError> {
        const MAX_LOG_DIR_LEN: usize = 4096;

        if let Some(dir) = &self.log_dir {
            if dir.is_empty() {
                return Err(StubError::InvalidConfiguration(
                    "Log directory cannot be empty".to_string(),
                ));
            }
            if dir.trim() != dir {
                return Err(StubError::InvalidConfiguration(
                    "Log directory cannot have leading/trailing whitespace".to_string(),
                ));
            }
            if dir.len() > MAX_LOG_DIR_LEN {
                return Err(StubError::InvalidConfiguration(
                    "Log directory path exceeds maximum length".to_string(),
                ));
            }
            if std::path::Path::new(dir).is_file() {
                return Err(StubError::InvalidConfiguration(format!(
                    "Log directory '{}' is a file",
                    dir
                )));
            }
        }

        if let Some(filter) = &self.log_filter {
            if filter.trim().is_empty() {
                return Err(StubError::InvalidConfiguration(
                    "Log filter cannot be empty".to_string(),
                ));
            }
            if filter.trim() != filter {
                return Err(StubError::InvalidConfiguration(
                    "Log filter cannot have leading/trailing whitespace".to_string(),
                ));
            }
        }

        Ok(())
    }
}
