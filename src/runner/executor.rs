//! Command runner
//!
//! Spawns one child per call with the parent environment plus caller overrides,
//! gathers stdout and stderr into a single buffer in write order, and waits for
//! exit or cancellation. No retries and no timeout: the caller owns cancellation
//! through the [`CancellationToken`].
//!
//! On unix both streams share one pipe, so the buffer holds exactly the order the
//! child wrote in. The child leads its own session and cancellation kills the whole
//! process group, including anything it started in the background. Elsewhere the
//! streams use separate pipes and interleave in arrival order.

use super::command::CommandLine;
use super::outcome::ExecutionOutcome;
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const READ_CHUNK_SIZE: usize = 8192;

/// Failures after the child started that leave no usable outcome
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Failed waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Default)]
pub struct CommandRunner;

impl CommandRunner {
    pub fn new() -> Self {
        Self
    }

    pub async fn run(
        &self,
        command: &CommandLine,
        working_dir: &Path,
        env_overrides: &HashMap<String, String>,
        cancel: &CancellationToken,
    ) -> Result<ExecutionOutcome, RunnerError> {
        debug!(
            command = %command,
            working_dir = %working_dir.display(),
            env_overrides = env_overrides.len(),
            "Spawning command"
        );

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .current_dir(working_dir)
            .envs(env_overrides)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut child = match spawn_with_output(cmd, tx) {
            Ok(child) => child,
            Err(e) => {
                warn!(command = %command, error = %e, "Failed to start command");
                return Ok(ExecutionOutcome::SpawnFailed {
                    message: e.to_string(),
                });
            }
        };

        let mut output = Vec::new();
        let finished = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            status = collect(&mut child, &mut rx, &mut output) => Some(status),
        };

        match finished {
            Some(Ok(status)) => {
                let exit_code = exit_code(status);
                info!(command = %command, exit_code, output_len = output.len(), "Command finished");
                Ok(ExecutionOutcome::Exited { exit_code, output })
            }
            Some(Err(source)) => Err(RunnerError::Wait {
                program: command.program.display().to_string(),
                source,
            }),
            None => {
                if let Err(e) = terminate(&mut child).await {
                    warn!(command = %command, error = %e, "Failed to kill cancelled command");
                }
                while let Ok(chunk) = rx.try_recv() {
                    output.extend_from_slice(&chunk);
                }
                info!(command = %command, "Command cancelled");
                Ok(ExecutionOutcome::Cancelled { output })
            }
        }
    }
}

/// Spawn `cmd` with stdout and stderr on one pipe feeding `tx`.
///
/// The command is consumed so that its copies of the write end close once the
/// child has them. The reader then sees EOF when the child and every descendant
/// holding the pipe have exited.
#[cfg(unix)]
fn spawn_with_output(mut cmd: Command, tx: UnboundedSender<Vec<u8>>) -> io::Result<Child> {
    use tokio::net::unix::pipe;

    let (read, write) = output_pipe()?;
    let receiver = pipe::Receiver::from_owned_fd(read)?;

    cmd.stdout(Stdio::from(write.try_clone()?))
        .stderr(Stdio::from(write));
    // SAFETY: the hook only calls setsid(2), which is async-signal-safe.
    unsafe {
        cmd.pre_exec(|| {
            if libc::setsid() == -1 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        });
    }

    let child = cmd.spawn()?;
    drop(cmd);

    tokio::spawn(forward(receiver, tx));
    Ok(child)
}

#[cfg(not(unix))]
fn spawn_with_output(mut cmd: Command, tx: UnboundedSender<Vec<u8>>) -> io::Result<Child> {
    let mut child = cmd.stdout(Stdio::piped()).stderr(Stdio::piped()).spawn()?;
    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(forward(stdout, tx.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(forward(stderr, tx));
    }
    Ok(child)
}

/// A close-on-exec pipe as `(read, write)`.
#[cfg(unix)]
fn output_pipe() -> io::Result<(std::os::fd::OwnedFd, std::os::fd::OwnedFd)> {
    use std::os::fd::{FromRawFd, OwnedFd};

    let mut fds: [libc::c_int; 2] = [-1, -1];

    #[cfg(any(target_os = "linux", target_os = "android"))]
    // SAFETY: `fds` has room for the two descriptors pipe2(2) writes.
    let rc = unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC) };
    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    // SAFETY: `fds` has room for the two descriptors pipe(2) writes.
    let rc = unsafe { libc::pipe(fds.as_mut_ptr()) };

    if rc == -1 {
        return Err(io::Error::last_os_error());
    }

    // SAFETY: the call succeeded, so both descriptors are open and owned only here.
    let (read, write) = unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) };

    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    {
        use std::os::fd::AsRawFd;
        for fd in [&read, &write] {
            // SAFETY: `fd` is an open descriptor owned by this function.
            if unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_SETFD, libc::FD_CLOEXEC) } == -1 {
                return Err(io::Error::last_os_error());
            }
        }
    }

    Ok((read, write))
}

/// Kill the child and everything in its process group, then reap the child.
async fn terminate(child: &mut Child) -> io::Result<()> {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            // SAFETY: killpg(2) has no memory-safety preconditions. The child is not
            // reaped yet, so its pid still names its own group.
            if unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) } == 0 {
                child.wait().await?;
                return Ok(());
            }
        }
    }
    child.kill().await
}

async fn forward<R: AsyncRead + Unpin>(mut reader: R, tx: UnboundedSender<Vec<u8>>) {
    let mut buf = vec![0u8; READ_CHUNK_SIZE];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
        }
    }
}

/// Drain the output until every writer closes, then reap the child.
async fn collect(
    child: &mut Child,
    rx: &mut UnboundedReceiver<Vec<u8>>,
    output: &mut Vec<u8>,
) -> io::Result<ExitStatus> {
    while let Some(chunk) = rx.recv().await {
        output.extend_from_slice(&chunk);
    }
    child.wait().await
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn sh(script: &str) -> CommandLine {
        CommandLine::new("sh").arg("-c").arg(script)
    }

    async fn run(cmd: &CommandLine, dir: &Path) -> ExecutionOutcome {
        CommandRunner::new()
            .run(cmd, dir, &HashMap::new(), &CancellationToken::new())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_zero_exit() {
        let dir = TempDir::new().unwrap();
        let outcome = run(&sh("echo hello"), dir.path()).await;

        assert!(outcome.success());
        assert_eq!(outcome.exit_code(), Some(0));
        assert_eq!(outcome.output(), b"hello\n");
    }

    #[tokio::test]
    async fn test_non_zero_exit_keeps_output() {
        let dir = TempDir::new().unwrap();
        let outcome = run(&sh("echo out; echo err >&2; exit 3"), dir.path()).await;

        assert!(!outcome.success());
        assert_eq!(outcome.exit_code(), Some(3));
        assert_eq!(outcome.output(), b"out\nerr\n");
        assert_eq!(outcome.error_message(), None);
    }

    #[tokio::test]
    async fn test_streams_keep_write_order() {
        let dir = TempDir::new().unwrap();
        let script = "for i in 1 2 3 4 5; do echo out$i; echo err$i >&2; done";
        let outcome = run(&sh(script), dir.path()).await;

        let expected: String = (1..=5).map(|i| format!("out{i}\nerr{i}\n")).collect();
        assert_eq!(outcome.output(), expected.as_bytes());
    }

    #[tokio::test]
    async fn test_background_writer_output_is_collected() {
        let dir = TempDir::new().unwrap();
        let outcome = run(&sh("(sleep 0.2; echo late) & echo early"), dir.path()).await;

        assert!(outcome.success());
        assert_eq!(outcome.output(), b"early\nlate\n");
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_failure() {
        let dir = TempDir::new().unwrap();
        let outcome = run(
            &CommandLine::new(dir.path().join("vendor/bin/does-not-exist")),
            dir.path(),
        )
        .await;

        assert!(matches!(outcome, ExecutionOutcome::SpawnFailed { .. }));
        assert_eq!(outcome.exit_code(), None);
    }

    #[tokio::test]
    async fn test_working_dir_and_env_overrides() {
        let dir = TempDir::new().unwrap();
        let mut env = HashMap::new();
        env.insert("APP_ENV".to_string(), "testing".to_string());

        let outcome = CommandRunner::new()
            .run(
                &sh("pwd; echo $APP_ENV; test -n \"$PATH\" && echo inherited"),
                dir.path(),
                &env,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let text = String::from_utf8_lossy(outcome.output()).to_string();
        let canonical = dir.path().canonicalize().unwrap();
        assert!(text.contains(canonical.to_str().unwrap()));
        assert!(text.contains("testing"));
        assert!(text.contains("inherited"));
    }

    #[tokio::test]
    async fn test_cancellation_terminates_child() {
        let dir = TempDir::new().unwrap();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.cancel();
        });

        let outcome = tokio::time::timeout(
            Duration::from_secs(10),
            CommandRunner::new().run(
                &sh("echo started; exec sleep 30"),
                dir.path(),
                &HashMap::new(),
                &cancel,
            ),
        )
        .await
        .expect("cancellation should not hang")
        .unwrap();

        assert!(outcome.is_cancelled());
        assert_eq!(outcome.exit_code(), None);
    }

    #[cfg(target_os = "linux")]
    fn process_alive(pid: u32) -> bool {
        match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
            Ok(stat) => stat
                .rsplit_once(") ")
                .map_or(false, |(_, rest)| !rest.starts_with('Z')),
            Err(_) => false,
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_cancellation_kills_background_children() {
        let dir = TempDir::new().unwrap();
        let pid_file = dir.path().join("child.pid");
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();

        let watched = pid_file.clone();
        tokio::spawn(async move {
            while !watched.exists() {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            trigger.cancel();
        });

        let outcome = tokio::time::timeout(
            Duration::from_secs(10),
            CommandRunner::new().run(
                &sh("sleep 30 & echo $! > child.tmp && mv child.tmp child.pid; wait"),
                dir.path(),
                &HashMap::new(),
                &cancel,
            ),
        )
        .await
        .expect("cancellation should not hang")
        .unwrap();
        assert!(outcome.is_cancelled());

        let pid: u32 = std::fs::read_to_string(&pid_file)
            .unwrap()
            .trim()
            .parse()
            .unwrap();
        let mut alive = process_alive(pid);
        for _ in 0..50 {
            if !alive {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
            alive = process_alive(pid);
        }
        assert!(!alive, "background sleep {} survived cancellation", pid);
    }

    #[tokio::test]
    async fn test_already_cancelled_token() {
        let dir = TempDir::new().unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = CommandRunner::new()
            .run(&sh("sleep 30"), dir.path(), &HashMap::new(), &cancel)
            .await
            .unwrap();
        assert!(outcome.is_cancelled());
    }
}
