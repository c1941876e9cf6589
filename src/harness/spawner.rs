use std::io;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStdin, Command};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout};

use crate::harness::config::HarnessConfig;
use crate::harness::report::{HarnessReport, Termination};
use crate::helper::tracing::MaybeInstrument;
use crate::stub::{error::StubError, request::StubRequest};

/// How long the IO tasks may keep draining once a timed run has ended
pub const DRAIN_GRACE: Duration = Duration::from_millis(500);

type SharedBuffer = Arc<Mutex<Vec<u8>>>;

/// Launches a process, feeds it one message and records what it does
#[derive(Debug, Clone)]
pub struct StubHarness {
    pub(crate) config: HarnessConfig,
}

impl StubHarness {
    pub fn new(config: HarnessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub async fn run_request(&self, request: &StubRequest) -> Result<HarnessReport, StubError> {
        let input = request.to_json()?;
        self.run(&input).await
    }

    /// Write `input` to the child's stdin, close it, and wait for the child
    ///
    /// Output is drained concurrently so neither pipe can fill up and stall
    /// the child. On timeout the child's whole process group is killed;
    /// whatever it wrote before that is still reported. With a timeout set,
    /// the IO tasks get [`DRAIN_GRACE`] after the child is reaped and are
    /// aborted after that, so a descendant holding the pipes open cannot
    /// stall the run.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(command = %self.config.command)))]
    pub async fn run(&self, input: &[u8]) -> Result<HarnessReport, StubError> {
        self.config.validate()?;

        let mut cmd = build_command(&self.config)?;
        let started = Instant::now();
        let mut child = cmd.spawn().map_err(|e| {
            #[cfg(feature = "tracing")]
            tracing::error!(error = %e, "Failed to spawn child process");
            StubError::Spawn(format!("{}: {}", self.config.command, e))
        })?;

        #[cfg(feature = "tracing")]
        tracing::debug!(pid = ?child.id(), "Child process spawned");

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| StubError::Spawn("stdin was not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| StubError::Spawn("stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| StubError::Spawn("stderr was not captured".to_string()))?;

        let command = self.config.command.as_str();
        let pid = child.id();
        let stdout_buf = SharedBuffer::default();
        let stderr_buf = SharedBuffer::default();
        let stdin_handle = tokio::spawn(write_input(stdin, input.to_vec()));
        let stdout_handle = tokio::spawn(read_stream(stdout, stdout_buf.clone()));
        let stderr_handle = tokio::spawn(read_stream(stderr, stderr_buf.clone()));

        let termination = match self.config.timeout_ms {
            Some(timeout_ms) => {
                match timeout(Duration::from_millis(timeout_ms), child.wait())
                    .maybe_instrument("wait", command)
                    .await
                {
                    Ok(status) => Termination::from(status?),
                    Err(_) => {
                        #[cfg(feature = "tracing")]
                        tracing::warn!(timeout_ms, "Child process timed out, killing");
                        kill_group(pid);
                        child.kill().await?;
                        Termination::TimedOut
                    }
                }
            }
            None => Termination::from(child.wait().maybe_instrument("wait", command).await?),
        };
        let elapsed = started.elapsed();

        let grace = self.config.timeout_ms.map(|_| DRAIN_GRACE);
        finish(stdin_handle, grace).await?;
        finish(stdout_handle, grace).await?;
        finish(stderr_handle, grace).await?;
        let stdout = std::mem::take(&mut *stdout_buf.lock().await);
        let stderr = std::mem::take(&mut *stderr_buf.lock().await);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            termination = ?termination,
            elapsed_ms = elapsed.as_millis() as u64,
            stdout_bytes = stdout.len(),
            stderr_bytes = stderr.len(),
            "Child process finished"
        );

        Ok(HarnessReport {
            stdout,
            stderr,
            termination,
            elapsed,
        })
    }
}

fn build_command(config: &HarnessConfig) -> Result<Command, StubError> {
    let (program, args) = config.program_and_args();
    let program = program
        .ok_or_else(|| StubError::InvalidConfiguration("Empty command".to_string()))?;

    let mut cmd = Command::new(program);
    cmd.args(args);

    if let Some(dir) = &config.working_dir {
        cmd.current_dir(dir);
    }

    if let Some(envs) = &config.env {
        cmd.envs(envs);
    }

    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // own group, so a timeout can take descendants down too
    #[cfg(unix)]
    {
        cmd.process_group(0);
    }

    Ok(cmd)
}

/// A child that exits without reading its input closes the pipe early;
/// that is its business, not a harness failure.
async fn write_input(mut stdin: ChildStdin, input: Vec<u8>) -> io::Result<()> {
    let result = async {
        stdin.write_all(&input).await?;
        stdin.shutdown().await
    }
    .await;
    match result {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

/// Appends into a shared buffer chunk by chunk so the output read so far
/// survives the task being aborted.
async fn read_stream<T>(mut stream: T, buf: SharedBuffer) -> io::Result<()>
where
    T: AsyncRead + Unpin,
{
    let mut chunk = [0u8; 8192];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.lock().await.extend_from_slice(&chunk[..n]);
    }
}

#[cfg(unix)]
fn kill_group(pid: Option<u32>) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Some(pgid) = pid.and_then(|p| i32::try_from(p).ok()) else {
        return;
    };
    // ESRCH just means the group is already gone
    if let Err(_e) = killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
        #[cfg(feature = "tracing")]
        tracing::debug!(error = %_e, pgid, "Process group kill failed");
    }
}

#[cfg(not(unix))]
fn kill_group(_pid: Option<u32>) {}

/// Join an IO task, giving up after `grace` when one is set
async fn finish(
    mut handle: JoinHandle<io::Result<()>>,
    grace: Option<Duration>,
) -> Result<(), StubError> {
    let joined = match grace {
        Some(grace) => match timeout(grace, &mut handle).await {
            Ok(joined) => joined,
            Err(_) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(?grace, "IO task still busy after grace, aborting");
                handle.abort();
                return Ok(());
            }
        },
        None => handle.await,
    };
    joined.map_err(|e| StubError::Io(io::Error::other(format!("IO task join failed: {}", e))))??;
    Ok(())
}
