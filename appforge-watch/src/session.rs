use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::Arc;

use notify::{recommended_watcher, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use appforge_build::{build_styles, AssetMirror, BuildError, MirrorResult, ScriptCompilerProcess};
use appforge_core::{BuildConfig, Classifier};
use appforge_styles::StyleCompiler;

use crate::dispatch::{normalize, plan, Action, WatchEvent};
use crate::error::{io_err, WatchError};
use crate::single_flight::SingleFlight;

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Applies the actions for each watch event.
///
/// Asset actions complete before `handle` returns, so they land in event
/// order. Style rebuilds go through the single-flight scheduler.
pub struct Dispatcher {
    mirror: AssetMirror,
    styles: SingleFlight,
}

impl Dispatcher {
    pub fn new(config: &BuildConfig, compiler: Arc<dyn StyleCompiler>) -> Self {
        let shared = Arc::new(config.clone());
        let styles = SingleFlight::new(move || {
            let config = Arc::clone(&shared);
            let compiler = Arc::clone(&compiler);
            async move {
                if let Err(failure) = build_styles(&config, compiler).await {
                    tracing::error!(error = %failure, "style rebuild failed");
                }
            }
        });
        Self {
            mirror: AssetMirror::new(config),
            styles,
        }
    }

    pub fn classifier(&self) -> &Classifier {
        self.mirror.classifier()
    }

    /// Handle one normalised event. Failures are logged, never returned.
    pub async fn handle(&self, event: &WatchEvent) {
        tracing::info!("{}", event.describe());
        for action in plan(event, self.classifier()) {
            match action {
                Action::RebuildStyles => self.styles.request(),
                Action::MirrorFile(path) => {
                    report(&path, self.mirror.mirror_one(&path).await.map(|r| vec![r]))
                }
                Action::RemoveFile(path) => {
                    report(&path, self.mirror.remove_one(&path).await.map(|r| vec![r]))
                }
                Action::MirrorDir(dir) => report(&dir, self.mirror.mirror_dir(&dir).await),
                Action::RemoveDir(dir) => {
                    report(&dir, self.mirror.remove_dir(&dir).await.map(|r| vec![r]))
                }
            }
        }
    }

    /// Resolve once no style rebuild is running or pending.
    pub async fn wait_idle(&self) {
        self.styles.wait_idle().await;
    }
}

fn report(source: &Path, result: Result<Vec<MirrorResult>, BuildError>) {
    match result {
        Ok(results) => {
            for result in results {
                match result {
                    MirrorResult::Copied { to, .. } => {
                        tracing::debug!(path = %to.display(), "asset copied")
                    }
                    MirrorResult::CreatedDir { path } => {
                        tracing::debug!(path = %path.display(), "directory created")
                    }
                    MirrorResult::Removed { path } => {
                        tracing::debug!(path = %path.display(), "mirrored copy removed")
                    }
                    MirrorResult::Absent { path } => {
                        tracing::debug!(path = %path.display(), "nothing to remove")
                    }
                    MirrorResult::Skipped { path } => {
                        tracing::debug!(path = %path.display(), "not an asset")
                    }
                }
            }
        }
        Err(err) => {
            tracing::error!(path = %source.display(), error = %err, "asset update failed")
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Continuous mode: one filesystem subscription plus the script compiler's
/// own watch process, alive until ctrl-c.
pub struct WatchSession {
    dispatcher: Dispatcher,
    script: Option<ScriptCompilerProcess>,
    _watcher: RecommendedWatcher,
    events: mpsc::UnboundedReceiver<notify::Result<Event>>,
    roots: Vec<PathBuf>,
}

impl WatchSession {
    /// Subscribe to every source root and start the script compiler in watch
    /// mode. A compiler that cannot be started is logged and the session runs
    /// without it.
    pub fn start(
        config: &BuildConfig,
        compiler: Arc<dyn StyleCompiler>,
    ) -> Result<Self, WatchError> {
        let mut session = Self::watch_only(config, compiler)?;
        match ScriptCompilerProcess::spawn(config) {
            Ok(process) => session.script = Some(process),
            Err(err) => tracing::error!(error = %err, "script compiler not started"),
        }
        Ok(session)
    }

    /// Subscribe to every source root without starting the script compiler.
    pub fn watch_only(
        config: &BuildConfig,
        compiler: Arc<dyn StyleCompiler>,
    ) -> Result<Self, WatchError> {
        let config = canonical_roots(config)?;

        let (event_tx, events) = mpsc::unbounded_channel::<notify::Result<Event>>();
        let mut watcher: RecommendedWatcher = recommended_watcher(move |event| {
            let _ = event_tx.send(event);
        })?;

        let mut roots = Vec::new();
        for root in config.watched_roots() {
            if !root.is_dir() {
                tracing::warn!(path = %root.display(), "source root missing, not watched");
                continue;
            }
            watcher.watch(&root, RecursiveMode::Recursive)?;
            tracing::info!(path = %root.display(), "watching");
            roots.push(root);
        }
        if roots.is_empty() {
            return Err(WatchError::NoRoots);
        }

        Ok(Self {
            dispatcher: Dispatcher::new(&config, compiler),
            script: None,
            _watcher: watcher,
            events,
            roots,
        })
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Dispatch events until ctrl-c.
    pub async fn run(self) -> Result<(), WatchError> {
        let shutdown = tokio::signal::ctrl_c();
        self.run_until(shutdown).await
    }

    /// Dispatch events until `shutdown` resolves.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), WatchError>
    where
        F: std::future::Future<Output = std::io::Result<()>>,
    {
        let Self {
            dispatcher,
            mut script,
            _watcher,
            mut events,
            ..
        } = self;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                signal = &mut shutdown => {
                    if let Err(err) = signal {
                        tracing::error!(error = %err, "ctrl-c handler failed");
                    }
                    tracing::info!("shutting down watch session");
                    break;
                }
                event = events.recv() => {
                    let Some(event) = event else {
                        return Err(WatchError::ChannelClosed("filesystem events"));
                    };
                    let event = match event {
                        Ok(event) => event,
                        Err(err) => {
                            tracing::warn!(error = %err, "watcher event error");
                            continue;
                        }
                    };
                    for change in normalize(&event, dispatcher.classifier()) {
                        dispatcher.handle(&change).await;
                    }
                }
                status = compiler_exit(&mut script) => {
                    log_compiler_exit(script.as_ref(), status);
                    script = None;
                }
            }
        }

        dispatcher.wait_idle().await;
        Ok(())
    }
}

/// Resolves when the compiler exits; pending forever without one.
async fn compiler_exit(
    script: &mut Option<ScriptCompilerProcess>,
) -> Result<ExitStatus, BuildError> {
    match script {
        Some(process) => process.wait().await,
        None => std::future::pending().await,
    }
}

fn log_compiler_exit(
    script: Option<&ScriptCompilerProcess>,
    status: Result<ExitStatus, BuildError>,
) {
    let program = script.map(|p| p.program()).unwrap_or("script compiler");
    match status {
        Ok(status) => tracing::warn!(
            program,
            code = ?status.code(),
            "script compiler exited; script changes are no longer compiled"
        ),
        Err(err) => tracing::error!(program, error = %err, "lost track of script compiler"),
    }
}

/// Backends report canonical paths, so roots must be canonical too for the
/// classifier's prefix checks to match.
fn canonical_roots(config: &BuildConfig) -> Result<BuildConfig, WatchError> {
    let mut config = config.clone();
    config.script_root = canonical(&config.script_root)?;
    config.style_root = canonical(&config.style_root)?;
    config.output_root = canonical(&config.output_root)?;
    if let Some(asset_root) = config.asset_root.take() {
        config.asset_root = Some(canonical(&asset_root)?);
    }
    Ok(config)
}

fn canonical(path: &Path) -> Result<PathBuf, WatchError> {
    match std::fs::canonicalize(path) {
        Ok(resolved) => Ok(resolved),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(path.to_path_buf()),
        Err(err) => Err(io_err(path, err)),
    }
}
