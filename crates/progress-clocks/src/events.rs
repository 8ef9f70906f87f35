use tokio::sync::oneshot;

/// Outcome text for a socket command; `Err` carries the message shown to the client.
pub type Reply = Result<String, String>;

/// A command line received from a client, plus where to send the answer.
#[derive(Debug)]
pub struct Request {
    pub line: String,
    pub reply: Option<oneshot::Sender<Reply>>,
}

impl Request {
    pub fn new(line: impl Into<String>) -> (Self, oneshot::Receiver<Reply>) {
        let (tx, rx) = oneshot::channel();
        let request = Self {
            line: line.into(),
            reply: Some(tx),
        };
        (request, rx)
    }
}

#[derive(Debug)]
pub enum AppEvent {
    Command(Request),
    /// Milliseconds since the previous tick.
    Tick(u64),
    Autosave,
    ConfigReload,
    Shutdown,
}
