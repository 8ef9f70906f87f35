use clap::{CommandFactory, Parser, Subcommand};
use progress_clocks::commands::{Command, Workspace};
use progress_clocks::config::{self, Settings};
use progress_clocks::host::{self, Host, TerminalNotifier};
use progress_clocks::sys::{client, runtime};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "progress-clocks", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Session file to use instead of the configured one
    #[arg(short = 's', long, global = true)]
    session: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Run the clock daemon in the foreground.
    Daemon,
    /// Send a command to the running daemon, e.g. `send fill 0 2`.
    Send {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        words: Vec<String>,
    },
    /// Apply a command directly to the session file, without a daemon.
    Apply {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        words: Vec<String>,
    },
    /// Write the default config file if none exists yet.
    InitConfig,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let settings = config::load_or_default();

    match cli.command {
        Some(Commands::Daemon) => run_daemon(settings, cli.session),
        Some(Commands::Send { words }) => {
            let line = shell_words::join(&words);
            let reply = client::send_command(&settings.socket_path, &line)?;
            if !reply.is_empty() {
                println!("{}", reply);
            }
            Ok(())
        }
        Some(Commands::Apply { words }) => apply_offline(&settings, cli.session, words),
        Some(Commands::InitConfig) => {
            let (path, written) = config::write_default_config()?;
            if written {
                println!("Wrote {}", path.display());
            } else {
                println!("{} already exists", path.display());
            }
            Ok(())
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

fn session_path(settings: &Settings, explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => Ok(settings.resolved_session_path()?),
    }
}

fn run_daemon(settings: Settings, explicit: Option<PathBuf>) -> anyhow::Result<()> {
    let path = session_path(&settings, explicit)?;
    let workspace = match host::open_workspace(&settings, path.clone(), settings.open_last_on_launch) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to open session {}: {}", path.display(), e);
            Workspace::new(Default::default(), path)
                .with_canvas(settings.canvas_width, settings.canvas_height)
        }
    };

    let (tx, rx) = async_channel::bounded(32);

    // Start Background Services
    runtime::start_background_services(tx, &settings);

    let socket_path = settings.socket_path.clone();
    let mut host = Host::new(workspace, settings, TerminalNotifier);
    host.run(rx);
    runtime::cleanup_socket(&socket_path);
    Ok(())
}

fn apply_offline(
    settings: &Settings,
    explicit: Option<PathBuf>,
    words: Vec<String>,
) -> anyhow::Result<()> {
    let path = session_path(settings, explicit)?;
    let mut workspace = host::open_workspace(settings, path, true)?;
    let command = Command::from_words(words)?;
    let outcome = workspace.apply(command)?;

    for notice in &outcome.notices {
        println!("{}", notice);
    }
    if workspace.dirty && !workspace.save()? {
        log::info!("Session is empty, nothing saved");
    }
    if !outcome.message.is_empty() {
        println!("{}", outcome.message);
    }
    Ok(())
}
