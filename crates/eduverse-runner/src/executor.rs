//! Process execution for scratch programs.
//!
//! The program runs as the leader of its own process group. When the direct
//! child exits, or the time limit passes, the whole group is killed, so
//! anything the program forked cannot outlive the call.

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

use eduverse_core::results::ExecutionOutcome;

use crate::sandbox::{build_env, ScratchFile};

/// How long to wait for the output pipes to close once the group is killed.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Interpreter invocation: `<program> <args...> <scratch file>`.
#[derive(Debug, Clone)]
pub struct Interpreter {
    pub program: String,
    pub args: Vec<String>,
}

impl Interpreter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }
}

/// Run the program stored in `scratch`, killing its process group if it
/// outlives `timeout`.
///
/// `on_spawn` is called once the process exists. `start` marks the beginning
/// of the whole execution so `elapsed` covers scratch setup too.
pub async fn run(
    interpreter: &Interpreter,
    scratch: &ScratchFile,
    timeout: Duration,
    start: Instant,
    on_spawn: impl FnOnce(),
) -> ExecutionOutcome {
    let mut cmd = Command::new(&interpreter.program);
    cmd.args(&interpreter.args)
        .arg(scratch.path())
        .current_dir(scratch.dir())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    for (key, val) in build_env() {
        cmd.env(&key, &val);
    }

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            return ExecutionOutcome::internal(
                format!("failed to spawn {}: {e}", interpreter.program),
                start.elapsed(),
            )
        }
    };
    on_spawn();
    let pid = child.id();
    tracing::debug!(pid, "spawned {}", interpreter.program);

    // Pipes are drained on their own tasks; a forked grandchild holding them
    // open must not delay noticing that the direct child has exited.
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    match tokio::time::timeout(timeout, child.wait()).await {
        Ok(Ok(status)) => {
            kill_group(pid);
            ExecutionOutcome::exited(
                status.code(),
                collect(stdout).await,
                collect(stderr).await,
                start.elapsed(),
            )
        }
        Ok(Err(e)) => {
            kill_group(pid);
            stdout.abort();
            stderr.abort();
            ExecutionOutcome::internal(
                format!("failed to wait for {}: {e}", interpreter.program),
                start.elapsed(),
            )
        }
        Err(_) => {
            kill_group(pid);
            if let Err(e) = child.kill().await {
                tracing::debug!("kill after timeout: {e}");
            }
            stdout.abort();
            stderr.abort();
            tracing::debug!(limit_ms = timeout.as_millis() as u64, "killed after timeout");
            ExecutionOutcome::timed_out(timeout, start.elapsed())
        }
    }
}

fn drain<R>(pipe: Option<R>) -> JoinHandle<Vec<u8>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            if let Err(e) = pipe.read_to_end(&mut buf).await {
                tracing::debug!("reading child output: {e}");
            }
        }
        buf
    })
}

/// Output read so far; a pipe still held open after the grace period (by a
/// process that escaped the group) is abandoned.
async fn collect(handle: JoinHandle<Vec<u8>>) -> String {
    let abort = handle.abort_handle();
    match tokio::time::timeout(DRAIN_GRACE, handle).await {
        Ok(Ok(buf)) => String::from_utf8_lossy(&buf).into_owned(),
        Ok(Err(_)) => String::new(),
        Err(_) => {
            abort.abort();
            String::new()
        }
    }
}

/// SIGKILL every process in the group led by `pid`.
#[cfg(unix)]
fn kill_group(pid: Option<u32>) {
    let Some(pgid) = pid.and_then(|p| i32::try_from(p).ok()) else {
        return;
    };
    // SAFETY: kill(2) with a negative pid only signals that process group.
    let rc = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if rc != 0 {
        tracing::trace!(pgid, "process group already gone");
    }
}

#[cfg(not(unix))]
fn kill_group(_pid: Option<u32>) {}
