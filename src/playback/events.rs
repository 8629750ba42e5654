//! Audio lifecycle events.
//!
//! The audio player runs on its own thread; the playback engine is mutated
//! only from the frame loop. Events cross that boundary through a bounded
//! channel and are drained non-blocking at the top of each frame.

use crossbeam_channel::{Receiver, Sender, TrySendError};
use tracing::warn;

/// Bound on queued events; an utterance produces at most a handful.
const EVENT_QUEUE_SIZE: usize = 16;

/// Discrete lifecycle events from the external audio player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioEvent {
    /// Playback of the current utterance's audio has started.
    Started,
    /// Playback reached the end of the audio.
    Ended,
    /// Playback failed; carries the player's error message.
    Error(String),
}

/// Sending half handed to the audio player.
#[derive(Debug, Clone)]
pub struct AudioEventSender {
    tx: Sender<AudioEvent>,
}

impl AudioEventSender {
    /// Send an event without blocking; a full queue drops the event with a
    /// warning rather than stalling the audio thread.
    pub fn send(&self, event: AudioEvent) {
        if let Err(TrySendError::Full(event)) = self.tx.try_send(event) {
            warn!("audio event queue full, dropping {event:?}");
        }
    }
}

/// Receiving half owned by the frame loop.
#[derive(Debug)]
pub struct AudioEventQueue {
    tx: Sender<AudioEvent>,
    rx: Receiver<AudioEvent>,
}

impl AudioEventQueue {
    /// Create a bounded event queue.
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::bounded(EVENT_QUEUE_SIZE);
        Self { tx, rx }
    }

    /// A cloneable sender for the audio player side.
    pub fn sender(&self) -> AudioEventSender {
        AudioEventSender {
            tx: self.tx.clone(),
        }
    }

    /// Drain all pending events without blocking.
    pub fn drain(&self) -> Vec<AudioEvent> {
        self.rx.try_iter().collect()
    }
}

impl Default for AudioEventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn events_arrive_in_order() {
        let queue = AudioEventQueue::new();
        let sender = queue.sender();
        sender.send(AudioEvent::Started);
        sender.send(AudioEvent::Ended);
        assert_eq!(queue.drain(), vec![AudioEvent::Started, AudioEvent::Ended]);
    }

    #[test]
    fn drain_on_empty_queue_is_empty() {
        let queue = AudioEventQueue::new();
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn full_queue_drops_instead_of_blocking() {
        let queue = AudioEventQueue::new();
        let sender = queue.sender();
        for _ in 0..EVENT_QUEUE_SIZE + 4 {
            sender.send(AudioEvent::Started);
        }
        assert_eq!(queue.drain().len(), EVENT_QUEUE_SIZE);
    }
}
