//! Advisory messages the engine sends to the game host.
//!
//! Messages are addressed to a chat room. The host decides where they end up;
//! the engine never waits on delivery.

use std::fmt;
use std::sync::mpsc::Sender;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Room {
    Player,
    Spectator,
}

impl Room {
    pub const ALL: [Room; 2] = [Room::Player, Room::Spectator];

    pub const fn as_str(self) -> &'static str {
        match self {
            Room::Player => "player",
            Room::Spectator => "spectator",
        }
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub room: Room,
    pub text: String,
}

pub trait MessageSink {
    fn send_message(&mut self, room: Room, text: &str);

    /// Sends `text` to every room. Empty text is dropped.
    fn broadcast(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        for room in Room::ALL {
            self.send_message(room, text);
        }
    }
}

/// Writes messages through the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl MessageSink for LogSink {
    fn send_message(&mut self, room: Room, text: &str) {
        if !text.is_empty() {
            log::info!("[{room}] {text}");
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl MessageSink for NullSink {
    fn send_message(&mut self, _room: Room, _text: &str) {}
}

/// Forwards messages to a receiver owned by the host. A hung-up receiver is
/// not an engine error; the message is dropped.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<ChatMessage>,
}

impl ChannelSink {
    pub fn new(tx: Sender<ChatMessage>) -> Self {
        Self { tx }
    }
}

impl MessageSink for ChannelSink {
    fn send_message(&mut self, room: Room, text: &str) {
        if text.is_empty() {
            return;
        }
        let message = ChatMessage {
            room,
            text: text.to_owned(),
        };
        if self.tx.send(message).is_err() {
            log::debug!("chat receiver closed; dropping message for {room}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    #[test]
    fn broadcast_reaches_both_rooms_in_order() {
        let (tx, rx) = channel();
        let mut sink = ChannelSink::new(tx);
        sink.broadcast("Switching to depth 2.");

        let received: Vec<ChatMessage> = rx.try_iter().collect();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].room, Room::Player);
        assert_eq!(received[1].room, Room::Spectator);
        assert!(received.iter().all(|m| m.text == "Switching to depth 2."));
    }

    #[test]
    fn empty_text_is_never_sent() {
        let (tx, rx) = channel();
        let mut sink = ChannelSink::new(tx);
        sink.broadcast("");
        sink.send_message(Room::Player, "");
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn closed_receiver_is_ignored() {
        let (tx, rx) = channel();
        drop(rx);
        let mut sink = ChannelSink::new(tx);
        sink.broadcast("nobody listening");
    }

    #[test]
    fn room_names() {
        assert_eq!(Room::Player.to_string(), "player");
        assert_eq!(Room::Spectator.as_str(), "spectator");
    }
}
