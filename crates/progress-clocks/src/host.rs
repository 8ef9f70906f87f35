use crate::commands::{Notice, Workspace};
use crate::config::{self, Settings};
use crate::events::{AppEvent, Request};
use async_channel::Receiver;
use clockwork::Session;
use std::io::Write;
use std::ops::ControlFlow;
use std::path::PathBuf;

/// Where notices end up.
pub trait Notifier {
    fn notify(&mut self, notice: &Notice, bell: bool);
}

/// Logs notices and rings the terminal bell on stderr.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&mut self, notice: &Notice, bell: bool) {
        log::info!("{}", notice);
        if bell {
            let mut stderr = std::io::stderr();
            let _ = stderr.write_all(b"\x07").and_then(|_| stderr.flush());
        }
    }
}

/// Builds a workspace for `session_path`, reading the file when asked and present.
pub fn open_workspace(
    settings: &Settings,
    session_path: PathBuf,
    load: bool,
) -> clockwork::Result<Workspace> {
    let session = if load && session_path.exists() {
        let session = Session::load(&session_path)?;
        log::info!(
            "Loaded {} clocks from {}",
            session.len(),
            session_path.display()
        );
        session
    } else {
        Session::new()
    };
    Ok(Workspace::new(session, session_path)
        .with_canvas(settings.canvas_width, settings.canvas_height))
}

pub struct Host<N: Notifier = TerminalNotifier> {
    workspace: Workspace,
    settings: Settings,
    notifier: N,
}

impl<N: Notifier> Host<N> {
    pub fn new(workspace: Workspace, settings: Settings, notifier: N) -> Self {
        Self {
            workspace,
            settings,
            notifier,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Processes events until shutdown or until every sender is gone.
    pub fn run(&mut self, rx: Receiver<AppEvent>) {
        while let Ok(event) = rx.recv_blocking() {
            if self.handle(event).is_break() {
                return;
            }
        }
        self.save_if_dirty();
    }

    pub fn handle(&mut self, event: AppEvent) -> ControlFlow<()> {
        match event {
            AppEvent::Command(request) => self.command(request),
            AppEvent::Tick(delta_ms) => {
                let notices = self.workspace.tick(delta_ms);
                self.deliver(&notices);
            }
            AppEvent::Autosave => {
                if self.workspace.dirty {
                    self.save_if_dirty();
                }
            }
            AppEvent::ConfigReload => self.reload_config(),
            AppEvent::Shutdown => {
                log::info!("Shutting down");
                self.save_if_dirty();
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn command(&mut self, request: Request) {
        let Request { line, reply } = request;
        let result = match self.workspace.execute(&line) {
            Ok(outcome) => {
                log::debug!("'{}': {}", line, outcome.message);
                self.deliver(&outcome.notices);
                Ok(outcome.message)
            }
            Err(e) => {
                log::warn!("Rejected command '{}': {}", line, e);
                Err(e.to_string())
            }
        };
        if let Some(reply) = reply {
            let _ = reply.send(result);
        }
    }

    fn deliver(&mut self, notices: &[Notice]) {
        for notice in notices {
            let bell = match notice {
                Notice::DialCompleted { beep, .. } => *beep || self.settings.bell_on_complete,
                Notice::GroupStopped { .. } | Notice::Tally { .. } => false,
            };
            self.notifier.notify(notice, bell);
        }
    }

    fn save_if_dirty(&mut self) {
        if !self.workspace.dirty {
            return;
        }
        match self.workspace.save() {
            Ok(true) => log::info!("Saved session to {}", self.workspace.session_path.display()),
            Ok(false) => log::debug!("Session is empty, nothing saved"),
            Err(e) => log::error!("Failed to save session: {}", e),
        }
    }

    fn reload_config(&mut self) {
        match config::load_settings() {
            Ok(settings) => {
                self.apply_settings(settings);
                log::info!("Configuration reloaded");
            }
            Err(e) => log::error!("Failed to reload config: {}", e),
        }
    }

    /// Takes over new settings. Tick and autosave cadence only change on restart.
    pub fn apply_settings(&mut self, settings: Settings) {
        self.workspace.canvas_width = settings.canvas_width;
        self.workspace.canvas_height = settings.canvas_height;
        if let Some(path) = &settings.session_path
            && path != &self.workspace.session_path
        {
            log::info!("Session path is now {}", path.display());
            self.workspace.session_path = path.clone();
        }
        self.settings = settings;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<(Notice, bool)>);

    impl Notifier for Recorder {
        fn notify(&mut self, notice: &Notice, bell: bool) {
            self.0.push((notice.clone(), bell));
        }
    }

    fn host() -> Host<Recorder> {
        let path = std::env::temp_dir().join(format!("progress-clocks-host-{}.json", std::process::id()));
        Host::new(
            Workspace::new(Session::new(), path),
            Settings::default(),
            Recorder::default(),
        )
    }

    fn send(host: &mut Host<Recorder>, line: &str) -> Result<String, String> {
        let (request, mut rx) = Request::new(line);
        assert!(host.handle(AppEvent::Command(request)).is_continue());
        rx.try_recv().unwrap()
    }

    #[test]
    fn test_commands_reply() {
        let mut host = host();
        assert_eq!(send(&mut host, "add danger").unwrap(), "added 0: Danger Clock 1");
        let err = send(&mut host, "fill 3 0").unwrap_err();
        assert!(err.contains("out of range"), "{err}");
        assert!(host.workspace().dirty);
    }

    #[test]
    fn test_ticks_ring_bell_when_asked() {
        let mut host = host();
        send(&mut host, "add linked").unwrap();
        send(&mut host, "timer 0 0 1").unwrap();
        send(&mut host, "timer 0 1 1").unwrap();
        send(&mut host, "start 0").unwrap();

        host.handle(AppEvent::Tick(1000));
        assert_eq!(host.notifier().0.len(), 1);
        assert!(!host.notifier().0[0].1);

        host.apply_settings(Settings {
            bell_on_complete: true,
            ..Default::default()
        });
        host.handle(AppEvent::Tick(1000));
        let rung: Vec<bool> = host.notifier().0.iter().map(|(_, bell)| *bell).collect();
        assert_eq!(rung, vec![false, true, false]);
    }

    #[test]
    fn test_apply_settings_moves_session_path() {
        let mut host = host();
        host.apply_settings(Settings {
            session_path: Some(PathBuf::from("/srv/elsewhere.json")),
            canvas_width: 400.0,
            ..Default::default()
        });
        assert_eq!(
            host.workspace().session_path,
            PathBuf::from("/srv/elsewhere.json")
        );
        assert_eq!(host.workspace().canvas_width, 400.0);
    }

    #[test]
    fn test_shutdown_saves() {
        let mut host = host();
        let path = host.workspace().session_path.clone();
        send(&mut host, "add tug").unwrap();
        assert!(host.handle(AppEvent::Shutdown).is_break());
        assert!(!host.workspace().dirty);
        assert_eq!(Session::load(&path).unwrap().len(), 1);
        let _ = std::fs::remove_file(path);
    }
}
