use clockwork::Session;
use progress_clocks::commands::Workspace;
use progress_clocks::events::AppEvent;
use progress_clocks::sys::{client, server};
use std::path::PathBuf;
use std::time::Duration;

fn socket_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("progress-clocks-{}-{}.sock", name, std::process::id()))
}

async fn wait_for(path: &PathBuf) {
    for _ in 0..200 {
        if path.exists() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("socket {} never appeared", path.display());
}

#[tokio::test]
async fn test_commands_round_trip_over_socket() {
    let path = socket_path("round-trip");
    let (tx, rx) = async_channel::bounded(8);
    tokio::spawn(server::run_server(tx, path.clone()));

    tokio::spawn(async move {
        let mut workspace = Workspace::new(Session::new(), PathBuf::from("unused.json"));
        while let Ok(event) = rx.recv().await {
            if let AppEvent::Command(request) = event {
                let result = workspace
                    .execute(&request.line)
                    .map(|o| o.message)
                    .map_err(|e| e.to_string());
                if let Some(reply) = request.reply {
                    let _ = reply.send(result);
                }
            }
        }
    });

    wait_for(&path).await;

    let p = path.clone();
    let added = tokio::task::spawn_blocking(move || client::send_command(&p, "add tug"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(added, "added 0: Tug-of-War Clock 1");

    let p = path.clone();
    let err = tokio::task::spawn_blocking(move || client::send_command(&p, "fill 7 0"))
        .await
        .unwrap()
        .unwrap_err();
    assert!(err.to_string().contains("out of range"), "{err}");

    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn test_reply_when_daemon_gone() {
    let path = socket_path("gone");
    let (tx, rx) = async_channel::bounded::<AppEvent>(8);
    tokio::spawn(server::run_server(tx, path.clone()));
    wait_for(&path).await;
    drop(rx);

    let p = path.clone();
    let err = tokio::task::spawn_blocking(move || client::send_command(&p, "list"))
        .await
        .unwrap()
        .unwrap_err();
    assert!(err.to_string().contains("shutting down"), "{err}");

    let _ = std::fs::remove_file(path);
}

#[test]
fn test_connect_without_daemon_fails() {
    let path = socket_path("missing");
    let err = client::send_command(&path, "list").unwrap_err();
    assert!(err.to_string().contains("Is it running?"), "{err}");
}
