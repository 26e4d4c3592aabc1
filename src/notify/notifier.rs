use std::sync::mpsc;

use log::warn;

use crate::notify::task_update::{TaskEvent, TaskUpdate};

/// Outbound live-update channel. Sends are fire-and-forget: delivery and
/// ordering belong to whatever sits behind the implementation.
pub trait Notifier {
    fn emit(&self, room: &str, update: TaskUpdate);
}

/// Drops every update. Used for tasks loaded outside a web server.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn emit(&self, _room: &str, _update: TaskUpdate) {}
}

/// Forwards updates into an `mpsc` channel as [`TaskEvent`]s.
///
/// If the receiver has been dropped the update is discarded with a warning;
/// recording continues either way.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::Sender<TaskEvent>,
}

impl ChannelNotifier {
    pub fn new(tx: mpsc::Sender<TaskEvent>) -> Self {
        ChannelNotifier { tx }
    }

    /// Convenience constructor returning the notifier and its receiving end.
    pub fn channel() -> (Self, mpsc::Receiver<TaskEvent>) {
        let (tx, rx) = mpsc::channel();
        (ChannelNotifier { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn emit(&self, room: &str, update: TaskUpdate) {
        let kind = update.kind();
        let event = TaskEvent { room: room.to_owned(), update };
        if self.tx.send(event).is_err() {
            warn!("no listener for {} update in room {}", kind, room);
        }
    }
}
