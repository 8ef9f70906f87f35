use crate::config::{self, Settings};
use crate::events::AppEvent;
use async_channel::Sender;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tokio::time::MissedTickBehavior;

pub fn start_background_services(tx: Sender<AppEvent>, settings: &Settings) {
    let socket_path = settings.socket_path.clone();
    let tick_ms = settings.tick_ms.max(1);
    let autosave_secs = settings.autosave_secs;

    thread::spawn(move || {
        let rt = Runtime::new().expect("Failed to create Tokio runtime");

        rt.block_on(async {
            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    crate::sys::server::run_server(tx, socket_path).await;
                });
            }

            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    config::watch_config(tx).await;
                });
            }

            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    run_ticker(tx, tick_ms).await;
                });
            }

            if autosave_secs > 0 {
                let tx = tx.clone();
                tokio::spawn(async move {
                    run_autosave(tx, autosave_secs).await;
                });
            }

            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    match tokio::signal::ctrl_c().await {
                        Ok(()) => {
                            let _ = tx.send(AppEvent::Shutdown).await;
                        }
                        Err(e) => log::error!("Failed to listen for Ctrl-C: {}", e),
                    }
                });
            }

            std::future::pending::<()>().await;
        });
    });
}

/// Sends the real time elapsed since the previous tick, so a slow consumer never loses time.
async fn run_ticker(tx: Sender<AppEvent>, tick_ms: u64) {
    let mut interval = tokio::time::interval(Duration::from_millis(tick_ms));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await;
    let mut last = Instant::now();

    loop {
        interval.tick().await;
        let now = Instant::now();
        let elapsed = now.duration_since(last).as_millis() as u64;
        last = now;
        if tx.send(AppEvent::Tick(elapsed)).await.is_err() {
            break;
        }
    }
}

async fn run_autosave(tx: Sender<AppEvent>, secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(secs));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately.
    interval.tick().await;

    loop {
        interval.tick().await;
        if tx.send(AppEvent::Autosave).await.is_err() {
            break;
        }
    }
}

/// Removes the control socket on the way out.
pub fn cleanup_socket(socket_path: &Path) {
    if socket_path.exists()
        && let Err(e) = fs_err::remove_file(socket_path)
    {
        log::warn!("Failed to remove socket: {}", e);
    }
}
