//! Optimizer progress adapters.

use std::sync::mpsc::{self, Receiver, Sender};

use tracing::debug;

use crate::ports::progress_port::ProgressPort;

/// Forwards progress lines over a channel to another thread. A dropped
/// receiver is not an error; lines are then discarded.
pub struct ChannelProgress {
    sender: Sender<String>,
}

impl ChannelProgress {
    pub fn new() -> (Self, Receiver<String>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }
}

impl ProgressPort for ChannelProgress {
    fn report(&self, message: &str) {
        debug!(target: "rulesim::optimizer", "{}", message);
        let _ = self.sender.send(message.to_string());
    }
}
