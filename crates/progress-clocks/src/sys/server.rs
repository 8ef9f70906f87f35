use crate::events::{AppEvent, Request};
use async_channel::Sender;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};

pub async fn run_server(tx: Sender<AppEvent>, socket_path: PathBuf) {
    if std::fs::metadata(&socket_path).is_ok() {
        let _ = std::fs::remove_file(&socket_path);
    }

    let listener = match UnixListener::bind(&socket_path) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket {}: {}", socket_path.display(), e);
            return;
        }
    };
    log::info!("Listening on {}", socket_path.display());

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    if let Err(e) = serve_connection(stream, tx).await {
                        log::error!("Connection error: {}", e);
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}

/// Answers each non-blank line with a status line (`ok` or `error`) followed by the body.
async fn serve_connection(mut stream: UnixStream, tx: Sender<AppEvent>) -> std::io::Result<()> {
    let (reader, mut writer) = stream.split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (request, reply) = Request::new(line);
        let answer = if tx.send(AppEvent::Command(request)).await.is_err() {
            Err("daemon is shutting down".to_string())
        } else {
            reply
                .await
                .unwrap_or_else(|_| Err("command was dropped".to_string()))
        };

        let response = match answer {
            Ok(body) => format!("ok\n{}\n", body),
            Err(msg) => format!("error\n{}\n", msg),
        };
        writer.write_all(response.as_bytes()).await?;
    }
    writer.flush().await
}
