use std::io::{Read, Write};
use std::time::Duration;

use crate::stub::{
    config::{StubConfig, SuspendPolicy},
    error::StubError,
    outcome::StubOutcome,
    request::StubRequest,
};

/// Executes requests against a fixed configuration
///
/// The runner owns none of the streams; the process wrapper hands it the
/// real stdio while tests hand it buffers.
#[derive(Debug, Clone)]
pub struct StubRunner {
    pub(crate) config: StubConfig,
}

impl StubRunner {
    pub fn new(config: StubConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StubConfig {
        &self.config
    }

    /// Read the whole input, decode it and execute it
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(suspend = ?self.config.suspend)))]
    pub fn run<R, O, E>(
        &self,
        mut input: R,
        stdout: &mut O,
        stderr: &mut E,
    ) -> Result<StubOutcome, StubError>
    where
        R: Read,
        O: Write,
        E: Write,
    {
        let mut message = Vec::new();
        input.read_to_end(&mut message)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(bytes = message.len(), "Request read");

        let request = StubRequest::from_slice(&message)?;
        self.execute(&request, stdout, stderr)
    }

    /// Perform the effects of an already decoded request, in order
    pub fn execute<O, E>(
        &self,
        request: &StubRequest,
        stdout: &mut O,
        stderr: &mut E,
    ) -> Result<StubOutcome, StubError>
    where
        O: Write,
        E: Write,
    {
        if let Some(text) = request.error_text() {
            stderr.write_all(text.as_bytes())?;
            stderr.flush()?;
            #[cfg(feature = "tracing")]
            tracing::debug!(bytes = text.len(), "Error text written");
        }

        if let Some(text) = request.info_text() {
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
            #[cfg(feature = "tracing")]
            tracing::debug!(bytes = text.len(), "Info text written");
        }

        if self.config.faults {
            if let Some(message) = request.exception_text() {
                #[cfg(feature = "tracing")]
                tracing::warn!(message = %message, "Fault requested, skipping suspension");
                return Ok(StubOutcome::Abort(message));
            }
        }

        let micros = match self.config.suspend {
            SuspendPolicy::WhenSet => request.sleep_micros()?,
            SuspendPolicy::Always => Some(request.delay_micros()?),
        };
        if let Some(micros) = micros {
            #[cfg(feature = "tracing")]
            tracing::debug!(micros, "Suspending");
            std::thread::sleep(Duration::from_micros(micros));
        }

        let code = request.exit_code()?;
        #[cfg(feature = "tracing")]
        tracing::debug!(code, "Exiting");
        Ok(StubOutcome::Exit(code))
    }
}
