//! Script build proxy: drives the external script compiler.
//!
//! Two modes:
//! - [`build_scripts`]: compile once, wait for exit, map the exit code.
//! - [`ScriptCompilerProcess::spawn`]: start the compiler in its own watch
//!   mode and hand back the owned process; the caller keeps it alive for the
//!   rest of the session.
//!
//! The compiler always runs in the project directory, where it finds its own
//! project file.
//!
//! Diagnostics: stdout is read chunk by chunk, stripped of ANSI escapes (the
//! compiler's watch mode clears the screen otherwise), and a chunk is
//! forwarded whole when it mentions `error`, so code frames stay attached to
//! their diagnostic. Stderr is forwarded verbatim.

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::OnceLock;

use regex::Regex;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use appforge_core::{BuildConfig, BuildOutcome, Pipeline, ScriptCompilerConfig};

use crate::error::{io_err, BuildError};
use crate::minify::minify_output;

/// Compile the whole project once.
///
/// Succeeds only when the compiler exits with code 0. With compact density
/// and a configured minifier, every emitted `.js` file is minified afterwards.
pub async fn build_scripts(config: &BuildConfig) -> BuildOutcome {
    tracing::info!("> Transpiling scripts...");
    let started = Instant::now();

    run_once(config)
        .await
        .map_err(|e| e.into_failure(Pipeline::Script))?;

    tracing::info!(
        "> Scripts transpiled in {:.3}s!",
        started.elapsed().as_secs_f64()
    );

    if config.density.is_compact() {
        if let Some(minifier) = &config.minifier {
            minify_output(&config.project_dir, &config.output_root, minifier)
                .await
                .map_err(|e| e.into_failure(Pipeline::Script))?;
        }
    }
    Ok(())
}

async fn run_once(config: &BuildConfig) -> Result<(), BuildError> {
    let compiler = &config.script_compiler;
    let mut child = spawn_compiler(compiler, &config.project_dir, false)?;
    let diagnostics = Diagnostics::attach(&mut child);

    let status = child
        .wait()
        .await
        .map_err(|e| io_err(&compiler.program, e))?;
    diagnostics.drain().await;

    exit_result(&compiler.program, status)
}

fn exit_result(program: &str, status: ExitStatus) -> Result<(), BuildError> {
    if status.success() {
        Ok(())
    } else {
        Err(BuildError::Exit {
            program: program.to_string(),
            code: status.code(),
        })
    }
}

/// The single long-lived compiler process of a watch session.
///
/// Acquired once when continuous mode starts and never respawned. The child
/// is killed if the handle is dropped, so the compiler cannot outlive the
/// orchestrator.
#[derive(Debug)]
pub struct ScriptCompilerProcess {
    program: String,
    child: Child,
    exit: Option<ExitStatus>,
    _diagnostics: Diagnostics,
}

impl ScriptCompilerProcess {
    /// Start the compiler in its own watch mode. Returns as soon as the
    /// process is running.
    pub fn spawn(config: &BuildConfig) -> Result<Self, BuildError> {
        let compiler = &config.script_compiler;
        let mut child = spawn_compiler(compiler, &config.project_dir, true)?;
        let diagnostics = Diagnostics::attach(&mut child);
        tracing::info!(
            "> Script compiler watching (pid {})",
            child.id().map(|id| id.to_string()).unwrap_or_else(|| "?".into())
        );
        Ok(Self {
            program: compiler.program.clone(),
            child,
            exit: None,
            _diagnostics: diagnostics,
        })
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn is_running(&self) -> bool {
        self.exit.is_none()
    }

    /// Wait for the compiler to exit. Resolves immediately once it has.
    pub async fn wait(&mut self) -> Result<ExitStatus, BuildError> {
        if let Some(status) = self.exit {
            return Ok(status);
        }
        let status = self
            .child
            .wait()
            .await
            .map_err(|e| io_err(&self.program, e))?;
        self.exit = Some(status);
        Ok(status)
    }
}

fn spawn_compiler(
    compiler: &ScriptCompilerConfig,
    project_dir: &Path,
    watch: bool,
) -> Result<Child, BuildError> {
    let mut args = compiler.args.clone();
    if watch {
        args.extend(compiler.watch_args.iter().cloned());
    }

    let mut command = platform_command(&compiler.program, &args);
    command
        .current_dir(project_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(watch);

    command.spawn().map_err(|source| BuildError::Spawn {
        program: compiler.program.clone(),
        source,
    })
}

/// Node tooling ships as `.cmd` shims on Windows, which only a shell resolves.
#[cfg(windows)]
fn platform_command(program: &str, args: &[String]) -> Command {
    let mut command = Command::new("cmd");
    command.arg("/C").arg(program).args(args);
    command
}

#[cfg(not(windows))]
fn platform_command(program: &str, args: &[String]) -> Command {
    let mut command = Command::new(program);
    command.args(args);
    command
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// Forwarding tasks for a child's stdout and stderr.
#[derive(Debug)]
struct Diagnostics {
    stdout: Option<JoinHandle<()>>,
    stderr: Option<JoinHandle<()>>,
}

impl Diagnostics {
    fn attach(child: &mut Child) -> Self {
        Self {
            stdout: child.stdout.take().map(forward_stdout),
            stderr: child.stderr.take().map(forward_stderr),
        }
    }

    /// Wait until both streams hit EOF.
    async fn drain(self) {
        for handle in [self.stdout, self.stderr].into_iter().flatten() {
            let _ = handle.await;
        }
    }
}

fn forward_stdout(mut stdout: ChildStdout) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut buf = vec![0u8; 8 * 1024];
        loop {
            match stdout.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if let Some(chunk) = filter_stdout(&String::from_utf8_lossy(&buf[..n])) {
                        println!("{chunk}");
                    }
                }
            }
        }
    })
}

fn forward_stderr(mut stderr: ChildStderr) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut out = tokio::io::stderr();
        let _ = tokio::io::copy(&mut stderr, &mut out).await;
    })
}

fn ansi_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\x1b(?:\[[0-?]*[ -/]*[@-~]|\][^\x07\x1b]*(?:\x07|\x1b\\)|[@-~])")
            .expect("static ANSI pattern is valid")
    })
}

/// Strip ANSI escapes and stray ESC bytes from compiler output.
pub fn strip_ansi(text: &str) -> String {
    ansi_pattern().replace_all(text, "").replace('\x1b', "")
}

/// Decide whether a chunk of compiler stdout is worth showing.
///
/// Returns the whole cleaned, trimmed chunk when any part of it reports an
/// error.
pub fn filter_stdout(chunk: &str) -> Option<String> {
    let cleaned = strip_ansi(chunk);
    let cleaned = cleaned.trim();
    if cleaned.contains("error") {
        Some(cleaned.to_string())
    } else {
        None
    }
}
