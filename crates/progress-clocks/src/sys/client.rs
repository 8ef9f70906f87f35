use anyhow::Context;
use std::io::{Read, Write};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::Path;

/// Sends one command line to the daemon and returns its reply body.
pub fn send_command(socket_path: &Path, line: &str) -> anyhow::Result<String> {
    let mut stream = UnixStream::connect(socket_path).with_context(|| {
        format!(
            "Failed to connect to progress-clocks daemon at {}. Is it running?",
            socket_path.display()
        )
    })?;

    writeln!(stream, "{}", line)?;
    stream.shutdown(Shutdown::Write)?;

    let mut response = String::new();
    stream.read_to_string(&mut response)?;
    parse_response(&response)
}

pub fn parse_response(response: &str) -> anyhow::Result<String> {
    let (status, body) = response.split_once('\n').unwrap_or((response, ""));
    let body = body.trim_end_matches('\n').to_string();
    match status.trim() {
        "ok" => Ok(body),
        "error" => anyhow::bail!("{}", body),
        "" => anyhow::bail!("Daemon closed the connection without replying"),
        other => anyhow::bail!("Unexpected reply from daemon: {}", other),
    }
}
