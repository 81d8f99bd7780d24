//! Script execution with process-group isolation and a hard deadline.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::result::{ExecutionResult, ExitKind};

/// Maximum bytes kept per output stream (1MB).
pub const MAX_OUTPUT_SIZE: usize = 1024 * 1024;

/// Flag that makes the interpreter treat the next argument as source text.
pub const DEFAULT_INLINE_FLAG: &str = "-e";

const READ_CHUNK: usize = 8 * 1024;

/// How long output may stay open after the interpreter exits.
const DRAIN_GRACE: Duration = Duration::from_millis(200);

/// Which script to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptRef {
    /// A file, relative to the runner's script directory unless absolute.
    File(PathBuf),
    /// Source text passed to the interpreter directly.
    Inline(String),
}

impl ScriptRef {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn inline(source: impl Into<String>) -> Self {
        Self::Inline(source.into())
    }
}

impl fmt::Display for ScriptRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Inline(_) => f.write_str("<inline>"),
        }
    }
}

/// Runs one script to completion or deadline.
///
/// Implementations never return an error: every failure mode is folded into
/// [`ExitKind`]. Calls are independent and may run concurrently.
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    async fn run(&self, script: &ScriptRef, args: &[String], timeout: Duration) -> ExecutionResult;

    /// Whether the interpreter can be found at all.
    fn interpreter_available(&self) -> bool {
        true
    }
}

/// Runs scripts through an `osascript`-compatible interpreter.
#[derive(Debug, Clone)]
pub struct OsaScriptRunner {
    interpreter: OsString,
    script_dir: PathBuf,
    inline_flag: String,
}

impl OsaScriptRunner {
    pub fn new(interpreter: impl Into<OsString>, script_dir: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            script_dir: script_dir.into(),
            inline_flag: DEFAULT_INLINE_FLAG.to_string(),
        }
    }

    /// Override the flag used to pass inline source (`-c` for POSIX shells).
    pub fn with_inline_flag(mut self, flag: impl Into<String>) -> Self {
        self.inline_flag = flag.into();
        self
    }

    fn build_command(&self, script: &ScriptRef, args: &[String]) -> Result<Command, String> {
        let mut cmd = Command::new(&self.interpreter);
        match script {
            ScriptRef::File(relative) => {
                let path = self.script_dir.join(relative);
                if !path.is_file() {
                    return Err(format!("script not found: {}", path.display()));
                }
                cmd.arg(path);
            }
            ScriptRef::Inline(source) => {
                cmd.arg(&self.inline_flag).arg(source);
            }
        }
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        {
            // SAFETY: setpgid only changes the process group of the child.
            unsafe {
                cmd.pre_exec(|| {
                    if libc::setpgid(0, 0) == -1 {
                        return Err(std::io::Error::last_os_error());
                    }
                    Ok(())
                });
            }
        }

        Ok(cmd)
    }
}

#[async_trait]
impl ScriptRunner for OsaScriptRunner {
    async fn run(&self, script: &ScriptRef, args: &[String], timeout: Duration) -> ExecutionResult {
        let mut cmd = match self.build_command(script, args) {
            Ok(cmd) => cmd,
            Err(reason) => return ExecutionResult::spawn_failure(reason),
        };

        let start = Instant::now();
        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                return ExecutionResult::spawn_failure(format!(
                    "{}: {e}",
                    self.interpreter.to_string_lossy()
                ));
            }
        };
        let pid = child.id();
        debug!(script = %script, args = args.len(), pid = ?pid, "script started");

        let stdout = tokio::spawn(read_capped(child.stdout.take()));
        let stderr = tokio::spawn(read_capped(child.stderr.take()));

        let status = match tokio::time::timeout(timeout, child.wait()).await {
            Ok(status) => status,
            Err(_) => {
                warn!(
                    script = %script,
                    timeout_ms = timeout.as_millis() as u64,
                    "script timed out, killing"
                );
                terminate(&mut child).await;
                stdout.abort();
                stderr.abort();
                return ExecutionResult::timeout(timeout);
            }
        };

        let exit_kind = match status {
            Ok(status) if status.success() => ExitKind::Success,
            Ok(status) => ExitKind::NonZeroExit {
                code: status.code(),
            },
            Err(e) => ExitKind::SpawnFailure {
                reason: format!("failed to wait for interpreter: {e}"),
            },
        };
        let (stdout, stderr) = collect_output(pid, stdout, stderr).await;
        debug!(
            script = %script,
            elapsed_ms = start.elapsed().as_millis() as u64,
            exit = ?exit_kind,
            "script finished"
        );
        ExecutionResult {
            exit_kind,
            stdout: render_output(stdout),
            stderr: render_output(stderr),
        }
    }

    fn interpreter_available(&self) -> bool {
        which::which(&self.interpreter).is_ok()
    }
}

/// Captured bytes of one output stream.
#[derive(Debug, Default)]
struct Captured {
    kept: Vec<u8>,
    total: usize,
    read_error: Option<String>,
}

/// Wait for both readers once the child has exited.
///
/// Anything the script left running in its group may still hold the pipes
/// open. After [`DRAIN_GRACE`] the group is killed so the readers see EOF.
async fn collect_output(
    pid: Option<u32>,
    stdout: JoinHandle<Captured>,
    stderr: JoinHandle<Captured>,
) -> (Captured, Captured) {
    let aborts = [stdout.abort_handle(), stderr.abort_handle()];
    let mut readers = Box::pin(async move {
        let (stdout, stderr) = tokio::join!(stdout, stderr);
        (stdout.unwrap_or_default(), stderr.unwrap_or_default())
    });

    if let Ok(captured) = tokio::time::timeout(DRAIN_GRACE, &mut readers).await {
        return captured;
    }
    debug!(pid = ?pid, "output still open after exit, killing process group");
    kill_group(pid);

    match tokio::time::timeout(DRAIN_GRACE, &mut readers).await {
        Ok(captured) => captured,
        Err(_) => {
            warn!(pid = ?pid, "script output still open after killing its process group");
            for handle in aborts {
                handle.abort();
            }
            (Captured::default(), Captured::default())
        }
    }
}

/// SIGKILL every process in the group led by `pid`.
fn kill_group(pid: Option<u32>) {
    #[cfg(unix)]
    {
        if let Some(pid) = pid {
            // SAFETY: the child leads its own process group, created in pre_exec.
            unsafe {
                libc::killpg(pid as libc::pid_t, libc::SIGKILL);
            }
        }
    }
    #[cfg(not(unix))]
    let _ = pid;
}

/// Kill the whole process group, then reap the child.
async fn terminate(child: &mut Child) {
    kill_group(child.id());
    let _ = child.start_kill();
    if let Err(e) = child.wait().await {
        warn!(error = %e, "failed to reap timed out script");
    }
}

/// Drain a stream to EOF, keeping at most [`MAX_OUTPUT_SIZE`] bytes.
///
/// Reading continues past the cap so the child never blocks on a full pipe.
async fn read_capped<R: AsyncRead + Unpin>(reader: Option<R>) -> Captured {
    let mut captured = Captured::default();
    let Some(mut reader) = reader else {
        return captured;
    };
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                captured.total += n;
                let room = MAX_OUTPUT_SIZE.saturating_sub(captured.kept.len());
                captured.kept.extend_from_slice(&chunk[..n.min(room)]);
            }
            Err(e) => {
                warn!(error = %e, read = captured.total, "failed to read script output");
                captured.read_error = Some(e.to_string());
                break;
            }
        }
    }
    captured
}

fn render_output(captured: Captured) -> String {
    let text = String::from_utf8_lossy(&captured.kept);
    let mut text = text.trim().to_string();
    if captured.total > MAX_OUTPUT_SIZE {
        text.push_str(&format!("\n[output truncated, {} bytes total]", captured.total));
    }
    if let Some(error) = captured.read_error {
        text.push_str(&format!("\n[output incomplete: {error}]"));
    }
    text
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn sh_runner(dir: &TempDir) -> OsaScriptRunner {
        OsaScriptRunner::new("sh", dir.path()).with_inline_flag("-c")
    }

    fn write_script(dir: &TempDir, name: &str, body: &str) -> ScriptRef {
        std::fs::write(dir.path().join(name), body).unwrap();
        ScriptRef::file(name)
    }

    const TIMEOUT: Duration = Duration::from_secs(10);

    #[tokio::test]
    async fn captures_trimmed_stdout() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "hello.sh", "printf '  hello %s  \\n' \"$1\"\n");

        let result = sh_runner(&dir)
            .run(&script, &["world".to_string()], TIMEOUT)
            .await;

        assert_eq!(result.exit_kind, ExitKind::Success);
        assert_eq!(result.stdout, "hello world");
        assert_eq!(result.stderr, "");
    }

    #[tokio::test]
    async fn hostile_arguments_arrive_verbatim() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "echo.sh", "printf '%s|%s' \"$1\" \"$2\"\n");
        let args = vec![
            r#"he said "hi"; rm -rf / && `id`"#.to_string(),
            "$(whoami) \\ 'quoted'".to_string(),
        ];

        let result = sh_runner(&dir).run(&script, &args, TIMEOUT).await;

        assert!(result.is_success());
        assert_eq!(result.stdout, format!("{}|{}", args[0], args[1]));
    }

    #[tokio::test]
    async fn inline_source_runs_through_flag() {
        let dir = TempDir::new().unwrap();
        let script = ScriptRef::inline("printf 'inline:%s' \"$0\"");

        let result = sh_runner(&dir)
            .run(&script, &["payload".to_string()], TIMEOUT)
            .await;

        assert_eq!(result.stdout, "inline:payload");
    }

    #[tokio::test]
    async fn non_zero_exit_keeps_stderr() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "fail.sh", "echo partial\necho boom >&2\nexit 3\n");

        let result = sh_runner(&dir).run(&script, &[], TIMEOUT).await;

        assert_eq!(result.exit_kind, ExitKind::NonZeroExit { code: Some(3) });
        assert_eq!(result.stdout, "partial");
        assert_eq!(result.stderr, "boom");
    }

    #[tokio::test]
    async fn timeout_kills_and_reaps_the_child() {
        let dir = TempDir::new().unwrap();
        let pid_file = dir.path().join("pid");
        let script = write_script(
            &dir,
            "hang.sh",
            &format!("echo $$ > '{}'\nexec sleep 30\n", pid_file.display()),
        );
        let deadline = Duration::from_millis(500);

        let start = Instant::now();
        let result = sh_runner(&dir).run(&script, &[], deadline).await;

        assert_eq!(result.exit_kind, ExitKind::Timeout { after: deadline });
        assert!(start.elapsed() < Duration::from_secs(5));

        let pid: libc::pid_t = std::fs::read_to_string(&pid_file)
            .unwrap()
            .trim()
            .parse()
            .unwrap();
        // SAFETY: signal 0 only checks for existence.
        let alive = unsafe { libc::kill(pid, 0) } == 0;
        assert!(!alive, "timed out script {pid} is still running");
    }

    #[tokio::test]
    async fn missing_interpreter_is_a_spawn_failure() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "noop.sh", "true\n");
        let runner = OsaScriptRunner::new("definitely-not-an-interpreter-1c5e", dir.path());

        let result = runner.run(&script, &[], TIMEOUT).await;

        assert!(matches!(result.exit_kind, ExitKind::SpawnFailure { .. }));
        assert!(!runner.interpreter_available());
    }

    #[tokio::test]
    async fn missing_script_file_is_a_spawn_failure() {
        let dir = TempDir::new().unwrap();

        let result = sh_runner(&dir)
            .run(&ScriptRef::file("playback/nope.applescript"), &[], TIMEOUT)
            .await;

        match result.exit_kind {
            ExitKind::SpawnFailure { reason } => assert!(reason.contains("script not found")),
            other => panic!("unexpected exit kind: {other:?}"),
        }
    }

    #[tokio::test]
    async fn oversized_output_is_truncated() {
        let dir = TempDir::new().unwrap();
        let script = write_script(
            &dir,
            "flood.sh",
            "head -c 1500000 /dev/zero | tr '\\0' 'a'\n",
        );

        let result = sh_runner(&dir).run(&script, &[], TIMEOUT).await;

        assert!(result.is_success());
        assert!(result.stdout.starts_with("aaaa"));
        assert!(
            result
                .stdout
                .ends_with("[output truncated, 1500000 bytes total]")
        );
        assert!(result.stdout.len() < MAX_OUTPUT_SIZE + 64);
    }

    #[tokio::test]
    async fn invocations_run_concurrently() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "nap.sh", "sleep 0.5\necho done\n");
        let runner = Arc::new(sh_runner(&dir));

        let start = Instant::now();
        let mut tasks = Vec::new();
        for _ in 0..3 {
            let runner = Arc::clone(&runner);
            let script = script.clone();
            tasks.push(tokio::spawn(async move {
                runner.run(&script, &[], TIMEOUT).await
            }));
        }
        for task in tasks {
            assert_eq!(task.await.unwrap().stdout, "done");
        }
        assert!(start.elapsed() < Duration::from_millis(1400));
    }

    #[tokio::test]
    async fn background_children_do_not_turn_exit_into_timeout() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "detach.sh", "sleep 5 &\necho done\nexit 0\n");
        let deadline = Duration::from_secs(2);

        let start = Instant::now();
        let result = sh_runner(&dir).run(&script, &[], deadline).await;

        assert_eq!(result.exit_kind, ExitKind::Success);
        assert_eq!(result.stdout, "done");
        assert!(start.elapsed() < deadline);
    }

    #[tokio::test]
    async fn read_errors_mark_output_incomplete() {
        use std::pin::Pin;
        use std::task::{Context, Poll};
        use tokio::io::ReadBuf;

        struct BrokenPipe {
            pending: Option<&'static [u8]>,
        }

        impl AsyncRead for BrokenPipe {
            fn poll_read(
                mut self: Pin<&mut Self>,
                _cx: &mut Context<'_>,
                buf: &mut ReadBuf<'_>,
            ) -> Poll<std::io::Result<()>> {
                match self.pending.take() {
                    Some(bytes) => {
                        buf.put_slice(bytes);
                        Poll::Ready(Ok(()))
                    }
                    None => Poll::Ready(Err(std::io::Error::other("pipe broke"))),
                }
            }
        }

        let captured = read_capped(Some(BrokenPipe {
            pending: Some(b"Now playing"),
        }))
        .await;

        assert_eq!(
            render_output(captured),
            "Now playing\n[output incomplete: pipe broke]"
        );
    }

    #[test]
    fn sh_is_found_on_path() {
        let dir = TempDir::new().unwrap();
        assert!(sh_runner(&dir).interpreter_available());
    }

    #[test]
    fn non_executable_interpreter_is_unavailable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let fake = dir.path().join("fake-osascript");
        std::fs::write(&fake, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o644)).unwrap();

        let runner = OsaScriptRunner::new(&fake, dir.path());
        assert!(!runner.interpreter_available());

        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert!(runner.interpreter_available());
    }

    #[test]
    fn display_hides_inline_source() {
        assert_eq!(ScriptRef::inline("tell app").to_string(), "<inline>");
        assert_eq!(
            ScriptRef::file("queue/clear-queue.applescript").to_string(),
            "queue/clear-queue.applescript"
        );
    }
}
