use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::stub::error::StubError;

/// How to launch the process under test
///
/// `command` may carry leading arguments separated by whitespace
/// (`"php receive.php"`); they are placed before `args`.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct HarnessConfig {
    /// The command or executable to run
    pub command: String,

    /// Arguments to pass to the command
    pub args: Option<Vec<String>>,

    /// Working directory for the command
    pub working_dir: Option<String>,

    /// Environment variables for the command
    pub env: Option<HashMap<String, String>>,

    /// Kill the process once it has run this long
    pub timeout_ms: Option<u64>,
}

impl HarnessConfig {
    pub fn new(command: impl Into<String>) -> Self {
        HarnessConfig {
            command: command.into(),
            ..Default::default()
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    pub fn working_dir(mut self, dir: impl Into<String>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn env<K, V, I>(mut self, env: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.env = Some(env.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    pub fn timeout_ms(mut self, timeout: u64) -> Self {
        self.timeout_ms = Some(timeout);
        self
    }

    /// Program followed by every argument, in launch order
    pub fn program_and_args(&self) -> (Option<&str>, Vec<&str>) {
        let mut parts = self.command.split_whitespace();
        let program = parts.next();
        let mut args: Vec<&str> = parts.collect();
        if let Some(extra) = &self.args {
            args.extend(extra.iter().map(String::as_str));
        }
        (program, args)
    }

    pub fn validate(&self) -> Result<(), StubError> {
        const MAX_COMMAND_LEN: usize = 4096;
        const MAX_ARG_LEN: usize = 4096;
        const MAX_ENV_KEY_LEN: usize = 1024;

        if self.command.is_empty() {
            return Err(StubError::InvalidConfiguration(
                "Command cannot be empty".to_string(),
            ));
        }
        if self.command.trim() != self.command {
            return Err(StubError::InvalidConfiguration(
                "Command cannot have leading or trailing whitespace".to_string(),
            ));
        }
        if self.command.len() > MAX_COMMAND_LEN {
            return Err(StubError::InvalidConfiguration(
                "Command length exceeds maximum allowed length".to_string(),
            ));
        }

        if let Some(args) = &self.args {
            for arg in args {
                if arg.is_empty() {
                    return Err(StubError::InvalidConfiguration(
                        "Arguments cannot be empty".to_string(),
                    ));
                }
                if arg.len() > MAX_ARG_LEN {
                    return Err(StubError::InvalidConfiguration(format!(
                        "Argument '{}' exceeds maximum length",
                        arg
                    )));
                }
            }
        }

        if let Some(dir) = &self.working_dir {
            let path = std::path::Path::new(dir);
            if !path.is_dir() {
                return Err(StubError::InvalidConfiguration(format!(
                    "Working directory '{}' does not exist or is not a directory",
                    dir
                )));
            }
        }

        if let Some(env) = &self.env {
            for k in env.keys() {
                if k.is_empty() {
                    return Err(StubError::InvalidConfiguration(
                        "Environment variable key cannot be empty".to_string(),
                    ));
                }
                if k.contains('=') || k.contains(' ') {
                    return Err(StubError::InvalidConfiguration(format!(
                        "Environment variable key '{}' cannot contain '=' or spaces",
                        k
                    )));
                }
                if k.len() > MAX_ENV_KEY_LEN {
                    return Err(StubError::InvalidConfiguration(format!(
                        "Environment variable key '{}' exceeds maximum length",
                        k
                    )));
                }
            }
        }

        if self.timeout_ms == Some(0) {
            return Err(StubError::InvalidConfiguration(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
