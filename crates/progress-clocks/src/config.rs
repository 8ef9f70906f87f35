use crate::events::AppEvent;
use async_channel::{Receiver, Sender};
use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_SOCKET_PATH: &str = "/tmp/progress-clocks.sock";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Session file used for loading, autosave and `save` without a path.
    pub session_path: Option<PathBuf>,
    pub open_last_on_launch: bool,
    /// 0 disables autosave.
    pub autosave_secs: u64,
    pub tick_ms: u64,
    pub socket_path: PathBuf,
    /// Ring the terminal bell on every completed dial, even when the group has it off.
    pub bell_on_complete: bool,
    pub canvas_width: f64,
    pub canvas_height: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            session_path: None,
            open_last_on_launch: true,
            autosave_secs: 300,
            tick_ms: clockwork::TICK_MS,
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            bell_on_complete: false,
            canvas_width: 900.0,
            canvas_height: 650.0,
        }
    }
}

impl Settings {
    /// The configured session file, falling back to the data directory.
    pub fn resolved_session_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.session_path {
            Some(p) => Ok(p.clone()),
            None => Ok(project_dirs()?.data_dir().join("session.json")),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No home directory to keep config and session files in")]
    ConfigDirNotFound,
    #[error("Invalid settings: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Cannot watch config file: {0}")]
    Notify(#[from] notify::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn project_dirs() -> Result<ProjectDirs, ConfigError> {
    ProjectDirs::from("org", "progressclocks", "progress-clocks")
        .ok_or(ConfigError::ConfigDirNotFound)
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

pub fn load_settings() -> Result<Settings, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(config::Environment::with_prefix("PROGRESS_CLOCKS").try_parsing(true))
        .build()?;

    Ok(s.try_deserialize()?)
}

/// Settings from disk, or defaults when the file is missing or broken.
pub fn load_or_default() -> Settings {
    match load_settings() {
        Ok(s) => s,
        Err(e) => {
            log::error!("Failed to load config, using defaults: {}", e);
            Settings::default()
        }
    }
}

/// Writes the commented default file unless one exists. Returns the path and whether it
/// was written.
pub fn write_default_config() -> Result<(PathBuf, bool), ConfigError> {
    let path = get_config_path()?;
    if path.exists() {
        return Ok((path, false));
    }
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    fs_err::write(&path, DEFAULT_CONFIG)?;
    Ok((path, true))
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// Editors save in bursts (write, rename, chmod); one reload per burst.
const RELOAD_DEBOUNCE: Duration = Duration::from_millis(200);

fn touches_config(event: &notify::Event, config_path: &Path) -> bool {
    let relevant = matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    );
    relevant
        && event
            .paths
            .iter()
            .any(|p| p.file_name() == config_path.file_name())
}

fn spawn_watcher(config_path: &Path) -> Result<(RecommendedWatcher, Receiver<()>), ConfigError> {
    let dir = config_path.parent().ok_or(ConfigError::ConfigDirNotFound)?;
    fs_err::create_dir_all(dir)?;

    let (changed_tx, changed_rx) = async_channel::unbounded();
    let target = config_path.to_path_buf();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        match res {
            Ok(event) if touches_config(&event, &target) => {
                let _ = changed_tx.try_send(());
            }
            Ok(_) => {}
            Err(e) => log::error!("Watch error: {}", e),
        }
    })?;
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    Ok((watcher, changed_rx))
}

/// Sends [`AppEvent::ConfigReload`] once per burst of changes to `config.toml`.
pub async fn watch_config(tx: Sender<AppEvent>) {
    let spawned = get_config_path().and_then(|path| spawn_watcher(&path));
    let (_watcher, changes) = match spawned {
        Ok(w) => w,
        Err(e) => {
            log::error!("Config watcher disabled: {}", e);
            return;
        }
    };

    while changes.recv().await.is_ok() {
        while let Ok(Ok(())) = tokio::time::timeout(RELOAD_DEBOUNCE, changes.recv()).await {}
        if tx.send(AppEvent::ConfigReload).await.is_err() {
            break;
        }
    }
}
