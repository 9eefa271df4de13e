//! mpsc-backed ProgressPort. The job sends, the prompt loop consumes.
//!
//! Unbounded channel: the producer side must never block or await, since the
//! job keeps running while the caller decides how (or whether) to display
//! progress.

use crate::ports::ProgressPort;
use tokio::sync::mpsc;

pub struct ChannelProgress {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelProgress {
    /// Create the port and the receiving end for the UI.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressPort for ChannelProgress {
    fn notify(&self, status: String) {
        // A closed receiver means nobody is watching; that is not the
        // job's problem.
        let _ = self.tx.send(status);
    }
}
