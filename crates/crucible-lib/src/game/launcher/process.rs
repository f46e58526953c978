/// Process supervision and game launch orchestration
use crate::game::launcher::arguments::{build_command, ArgumentContext};
use crate::game::launcher::assets::{self, materialize_legacy_assets};
use crate::game::launcher::classpath::classpath_entries;
use crate::game::launcher::natives::{cleanup_staging, remove_stale_staging, stage_natives};
use crate::game::launcher::rules::{filter_libraries, ResolvedLibraries};
use crate::game::launcher::types::{LaunchError, LaunchRequest, Platform};
use crate::game::launcher::version_parser::{VersionCatalog, VersionDescriptor};
use crate::models::settings::LaunchSettings;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;

/// Drain tasks publish at most this many undelivered lines before they
/// back off; the game writes in bursts during startup.
const LOG_CHANNEL_CAPACITY: usize = 256;

/// Which child stream a log line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamSource {
    Stdout,
    Stderr,
}

impl StreamSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamSource::Stdout => "stdout",
            StreamSource::Stderr => "stderr",
        }
    }
}

/// Live log consumer callback, fed one decoded line at a time.
pub type LogCallback = Arc<dyn Fn(StreamSource, String) + Send + Sync + 'static>;

#[derive(Debug)]
struct LogLine {
    stream: StreamSource,
    text: String,
}

/// Launch lifecycle flags shared between the supervision tasks and any
/// external poller.
#[derive(Debug, Default)]
pub struct LaunchState {
    started: AtomicBool,
    alive: AtomicBool,
    error: AtomicBool,
}

impl LaunchState {
    /// Whether a launch sequence has begun and not yet fully torn down.
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Whether the spawned process is still alive.
    pub fn is_running(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Consuming read: reports the error flag and resets it, so callers
    /// must poll rather than assume persistence.
    pub fn take_error(&self) -> bool {
        self.error.swap(false, Ordering::SeqCst)
    }

    fn set_started(&self, value: bool) {
        self.started.store(value, Ordering::SeqCst);
    }

    fn set_alive(&self, value: bool) {
        self.alive.store(value, Ordering::SeqCst);
    }

    fn flag_error(&self) {
        self.error.store(true, Ordering::SeqCst);
    }
}

/// Supervises one game process at a time: resolves the version, prepares
/// natives and assets, spawns the process, drains its output streams and
/// guarantees staging cleanup on every exit path.
pub struct GameLauncher {
    state: Arc<LaunchState>,
    settings: LaunchSettings,
    log_callback: Option<LogCallback>,
}

impl GameLauncher {
    pub fn new(settings: LaunchSettings) -> Self {
        Self {
            state: Arc::new(LaunchState::default()),
            settings,
            log_callback: None,
        }
    }

    /// Attach a live log consumer, fed when `show_game_log` is enabled.
    pub fn with_log_callback(mut self, callback: LogCallback) -> Self {
        self.log_callback = Some(callback);
        self
    }

    /// Shared lifecycle flags, for pollers that outlive this handle.
    pub fn state(&self) -> Arc<LaunchState> {
        Arc::clone(&self.state)
    }

    pub fn is_started(&self) -> bool {
        self.state.is_started()
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Consuming read; the error flag resets to false once observed.
    pub fn has_error(&self) -> bool {
        self.state.take_error()
    }

    /// Prepare and spawn the game for `request`.
    ///
    /// Callers must run the [`Downloader`](crate::game::downloader::Downloader)
    /// to completion first; a verified on-disk layout is a precondition.
    /// Returns once the process is spawned and its supervision tasks are
    /// running — it does not block until the game exits.
    pub async fn launch(&self, request: &LaunchRequest) -> Result<(), LaunchError> {
        self.state.set_started(true);
        log::info!("game launch work has started");

        match self.prepare_and_spawn(request).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.state.set_started(false);
                Err(err)
            }
        }
    }

    async fn prepare_and_spawn(&self, request: &LaunchRequest) -> Result<(), LaunchError> {
        if self.state.is_running() {
            return Err(LaunchError::AlreadyRunning);
        }

        let platform = Platform::current();
        let paths = &request.paths;

        let catalog = VersionCatalog::new(paths.versions_dir())
            .with_latest(request.latest_release.clone(), request.latest_snapshot.clone());
        let version_id = catalog.version_for_profile(&request.profile).ok_or_else(|| {
            LaunchError::NoLaunchableVersion {
                profile: request.profile.id.clone(),
            }
        })?;
        let version = catalog.resolve(&version_id).await?;
        if version.main_class.is_none() {
            return Err(LaunchError::MissingMainClass {
                id: version.id.clone(),
            });
        }

        let working_dir = match &request.profile.game_dir {
            Some(dir) => dir.clone(),
            None => paths.data_dir.clone(),
        };
        tokio::fs::create_dir_all(&working_dir).await?;
        log::info!("launching {} on {working_dir:?}", version.id);

        let libraries = filter_libraries(&version.libraries, &platform);
        log::debug!(
            "{} classpath libraries and {} natives apply on this platform",
            libraries.classpath.len(),
            libraries.natives.len()
        );

        let version_dir = paths.version_dir(&version.id);
        tokio::fs::create_dir_all(&version_dir).await?;
        remove_stale_staging(&version_dir);

        let staging = stage_natives(
            &libraries.natives,
            &paths.data_dir,
            &version_dir,
            &version.id,
            &platform,
        )?;
        if !staging.failures.is_empty() {
            log::warn!(
                "{} of {} native libraries failed to extract",
                staging.failures.len(),
                libraries.natives.len()
            );
        }
        let natives_dir = staging.staged_dir.clone();

        // From here on the staging directory must be removed on every
        // failure path; success hands ownership to the monitor task.
        let result = self
            .spawn_supervised(request, &version, &libraries, &natives_dir, &working_dir, platform)
            .await;
        if result.is_err() {
            cleanup_staging(&natives_dir);
        }
        result
    }

    async fn spawn_supervised(
        &self,
        request: &LaunchRequest,
        version: &VersionDescriptor,
        libraries: &ResolvedLibraries<'_>,
        natives_dir: &Path,
        working_dir: &Path,
        platform: Platform,
    ) -> Result<(), LaunchError> {
        let assets_root = request.paths.assets_dir();
        let assets_dir = match version.asset_index_id() {
            Some(assets::LEGACY_INDEX_ID) => match materialize_legacy_assets(&assets_root).await {
                Ok(report) => report.virtual_dir,
                Err(err) => {
                    // Partial or missing assets degrade the game, not the
                    // launch.
                    log::warn!("failed to build virtual asset folder: {err:#}");
                    assets_root.join("virtual").join(assets::LEGACY_INDEX_ID)
                }
            },
            _ => assets_root,
        };

        let classpath =
            classpath_entries(&libraries.classpath, &request.paths.data_dir, &version.relative_jar());

        let ctx = ArgumentContext {
            profile: &request.profile,
            version,
            session: &request.session,
            platform,
            working_dir,
            assets_dir: &assets_dir,
            natives_dir,
            classpath: &classpath,
            helper_jar: request.helper_jar.as_deref(),
        };
        let command_line = build_command(&ctx);
        log::debug!("full launch command: {command_line:?}");

        let mut command = tokio::process::Command::new(&command_line[0]);
        command
            .args(&command_line[1..])
            .current_dir(working_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(err) => {
                log::error!("failed to spawn game process: {err}");
                self.state.flag_error();
                return Err(LaunchError::Spawn(err));
            }
        };
        self.state.set_alive(true);
        match child.id() {
            Some(pid) => log::info!("game process started with pid {pid}"),
            None => log::info!("game process started"),
        }

        let (line_tx, line_rx) = mpsc::channel(LOG_CHANNEL_CAPACITY);
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(drain_stream(
                stdout,
                StreamSource::Stdout,
                line_tx.clone(),
                Arc::clone(&self.state),
            ));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(drain_stream(
                stderr,
                StreamSource::Stderr,
                line_tx.clone(),
                Arc::clone(&self.state),
            ));
        }
        drop(line_tx);

        let callback = if self.settings.show_game_log {
            self.log_callback.clone()
        } else {
            None
        };
        tokio::spawn(consume_lines(line_rx, callback));

        tokio::spawn(supervise(
            child,
            Arc::clone(&self.state),
            natives_dir.to_path_buf(),
        ));

        Ok(())
    }
}

/// Read one child stream to end, decoding each line as single-byte legacy
/// text and publishing it for the log consumer. A read failure flags the
/// error state; the sibling stream keeps draining on its own.
async fn drain_stream<R>(
    stream: R,
    source: StreamSource,
    lines: mpsc::Sender<LogLine>,
    state: Arc<LaunchState>,
) where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                while matches!(buf.last(), Some(b'\n' | b'\r')) {
                    buf.pop();
                }
                let line = LogLine {
                    stream: source,
                    text: decode_latin1(&buf),
                };
                if lines.send(line).await.is_err() {
                    break;
                }
            }
            Err(err) => {
                log::warn!("failed to read game {} stream: {err}", source.as_str());
                state.flag_error();
                break;
            }
        }
    }
}

/// Game streams carry legacy single-byte text, not UTF-8; every byte maps
/// to the code point of the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Forward published lines to the logging sink and the optional live
/// consumer. Runs until both drain tasks hang up.
async fn consume_lines(mut lines: mpsc::Receiver<LogLine>, callback: Option<LogCallback>) {
    while let Some(line) = lines.recv().await {
        log::info!("[game:{}] {}", line.stream.as_str(), line.text);
        if let Some(callback) = &callback {
            callback(line.stream, line.text);
        }
    }
}

/// Wait for the child to exit, record an abnormal stop, then tear down
/// launch state and the staging directory regardless of how it ended.
async fn supervise(mut child: tokio::process::Child, state: Arc<LaunchState>, natives_dir: PathBuf) {
    match child.wait().await {
        Ok(status) if status.success() => {
            log::info!("game exited normally");
        }
        Ok(status) => {
            state.flag_error();
            log::error!("game stopped unexpectedly: {status}");
        }
        Err(err) => {
            state.flag_error();
            log::error!("failed to wait for game process: {err}");
        }
    }

    state.set_alive(false);
    log::info!("deleting natives dir {natives_dir:?}");
    cleanup_staging(&natives_dir);
    state.set_started(false);
}
