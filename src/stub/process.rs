use std::io::{self, Write};

use crate::stub::{config::StubConfig, error::StubError, outcome::StubOutcome, runner::StubRunner};

/// Prefix for diagnostics about failures of the stub itself
pub const DIAGNOSTIC_PREFIX: &str = "echo-fault-stub";

/// Run the stub against the real stdio and terminate the process
///
/// Never returns: the outcome becomes an exit status or an abort.
pub fn run_process(config: StubConfig) -> ! {
    let result = drive(config.with_env());

    let stderr = io::stderr();
    let mut stderr = stderr.lock();
    match result {
        Ok(StubOutcome::Exit(code)) => {
            let _ = io::stdout().flush();
            std::process::exit(i32::from(code));
        }
        Ok(StubOutcome::Abort(message)) => {
            let _ = write_abort(&mut stderr, &message);
            std::process::abort();
        }
        Err(e) => {
            let _ = write_failure(&mut stderr, &e);
            std::process::abort();
        }
    }
}

/// Everything up to termination, so the log guard is dropped (and flushed)
/// before the process goes away.
fn drive(config: StubConfig) -> Result<StubOutcome, StubError> {
    config.validate()?;

    #[cfg(feature = "tracing")]
    let _guard = crate::helper::logging::init_file_logging(&config)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let stderr = io::stderr();
    let result = StubRunner::new(config).run(
        stdin.lock(),
        &mut stdout.lock(),
        &mut stderr.lock(),
    );

    #[cfg(feature = "tracing")]
    {
        if let Err(e) = &result {
            tracing::error!(error = %e, "Stub failed");
        }
    }

    result
}

/// Diagnostic line for a requested fault
pub fn write_abort<W: Write>(out: &mut W, message: &str) -> io::Result<()> {
    writeln!(out, "{}", message)?;
    out.flush()
}

/// Diagnostic line for a failure of the stub itself
pub fn write_failure<W: Write>(out: &mut W, error: &StubError) -> io::Result<()> {
    writeln!(out, "{}: {}", DIAGNOSTIC_PREFIX, error)?;
    out.flush()
}
