// SPDX-License-Identifier: GPL-3.0-only

//! Outbound interface of the keyboard state machine.
//!
//! The keyboard reports every state change it makes through a
//! [`KeyboardSink`] supplied by the host. Callbacks run synchronously, in the
//! order the state machine performs the corresponding transitions.
//!
//! Three sinks ship with the crate:
//!
//! - [`EventQueue`]: Collects events until the host drains them
//! - [`ChannelSink`]: Forwards events into a `futures` channel
//! - [`NullSink`]: Discards everything

use crate::input::ModifierMask;
use crate::keyboard::{KeyId, Level, Symbol};
use futures::channel::mpsc;
use serde::{Deserialize, Serialize};

/// Whether an activation reports a press or a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyState {
    /// Key was pressed down.
    Pressed,
    /// Key was released.
    Released,
}

/// A resolved key event forwarded to the system input pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activation {
    /// Hardware keycode of the key
    pub keycode: u32,
    /// Symbol resolved for the key at the time of the event
    pub symbol: Symbol,
    /// Global modifiers after the state machine processed the event
    pub modifiers: ModifierMask,
    pub state: KeyState,
    /// Timestamp in milliseconds (usually from compositor)
    pub timestamp: u32,
}

impl Activation {
    pub fn is_press(&self) -> bool {
        self.state == KeyState::Pressed
    }
}

/// Host-implemented observer of keyboard state changes.
pub trait KeyboardSink {
    /// A key press or release resolved to a symbol.
    fn on_key_activated(&mut self, activation: &Activation);

    /// A modifier-producing key became locked.
    fn on_key_locked(&mut self, _key: KeyId) {}

    /// A previously locked key was unlocked.
    fn on_key_unlocked(&mut self, _key: KeyId) {}

    /// The displayed group or level changed.
    fn on_symbol_index_changed(&mut self, _group: usize, _level: Level) {}
}

impl<S: KeyboardSink + ?Sized> KeyboardSink for &mut S {
    fn on_key_activated(&mut self, activation: &Activation) {
        (**self).on_key_activated(activation);
    }

    fn on_key_locked(&mut self, key: KeyId) {
        (**self).on_key_locked(key);
    }

    fn on_key_unlocked(&mut self, key: KeyId) {
        (**self).on_key_unlocked(key);
    }

    fn on_symbol_index_changed(&mut self, group: usize, level: Level) {
        (**self).on_symbol_index_changed(group, level);
    }
}

impl<S: KeyboardSink + ?Sized> KeyboardSink for Box<S> {
    fn on_key_activated(&mut self, activation: &Activation) {
        (**self).on_key_activated(activation);
    }

    fn on_key_locked(&mut self, key: KeyId) {
        (**self).on_key_locked(key);
    }

    fn on_key_unlocked(&mut self, key: KeyId) {
        (**self).on_key_unlocked(key);
    }

    fn on_symbol_index_changed(&mut self, group: usize, level: Level) {
        (**self).on_symbol_index_changed(group, level);
    }
}

/// Every observable state change, as a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum KeyboardEvent {
    Activated(Activation),
    Locked { key: KeyId },
    Unlocked { key: KeyId },
    SymbolIndexChanged { group: usize, level: Level },
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl KeyboardSink for NullSink {
    fn on_key_activated(&mut self, _activation: &Activation) {}
}

/// Sink that queues events until the host takes them.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    pending_events: Vec<KeyboardEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes all pending events, leaving the queue empty.
    pub fn take_events(&mut self) -> Vec<KeyboardEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn pending_events(&self) -> &[KeyboardEvent] {
        &self.pending_events
    }

    /// Pending activations only, in order.
    pub fn activations(&self) -> impl Iterator<Item = &Activation> {
        self.pending_events.iter().filter_map(|event| match event {
            KeyboardEvent::Activated(activation) => Some(activation),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.pending_events.clear();
    }
}

impl KeyboardSink for EventQueue {
    fn on_key_activated(&mut self, activation: &Activation) {
        self.pending_events
            .push(KeyboardEvent::Activated(activation.clone()));
    }

    fn on_key_locked(&mut self, key: KeyId) {
        self.pending_events.push(KeyboardEvent::Locked { key });
    }

    fn on_key_unlocked(&mut self, key: KeyId) {
        self.pending_events.push(KeyboardEvent::Unlocked { key });
    }

    fn on_symbol_index_changed(&mut self, group: usize, level: Level) {
        self.pending_events
            .push(KeyboardEvent::SymbolIndexChanged { group, level });
    }
}

/// Sink that forwards events into an unbounded `futures` channel.
///
/// Events sent after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<KeyboardEvent>,
}

impl ChannelSink {
    /// Creates a sink and the receiver the host listens on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<KeyboardEvent>) {
        let (tx, rx) = mpsc::unbounded();
        (Self { tx }, rx)
    }

    fn send(&self, event: KeyboardEvent) {
        if let Err(e) = self.tx.unbounded_send(event) {
            tracing::debug!("Keyboard event receiver gone, dropping event: {:?}", e.into_inner());
        }
    }
}

impl KeyboardSink for ChannelSink {
    fn on_key_activated(&mut self, activation: &Activation) {
        self.send(KeyboardEvent::Activated(activation.clone()));
    }

    fn on_key_locked(&mut self, key: KeyId) {
        self.send(KeyboardEvent::Locked { key });
    }

    fn on_key_unlocked(&mut self, key: KeyId) {
        self.send(KeyboardEvent::Unlocked { key });
    }

    fn on_symbol_index_changed(&mut self, group: usize, level: Level) {
        self.send(KeyboardEvent::SymbolIndexChanged { group, level });
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn activation(state: KeyState) -> Activation {
        Activation {
            keycode: 30,
            symbol: Symbol::new("a"),
            modifiers: ModifierMask::empty(),
            state,
            timestamp: 7,
        }
    }

    /// Test the queue keeps events in order and drains them
    #[test]
    fn test_event_queue_order_and_take() {
        let mut queue = EventQueue::new();
        queue.on_key_activated(&activation(KeyState::Pressed));
        queue.on_key_locked(KeyId::new(0, 1));
        queue.on_symbol_index_changed(0, Level::LettersUpper);
        queue.on_key_activated(&activation(KeyState::Released));

        assert_eq!(queue.pending_events().len(), 4);
        assert_eq!(queue.activations().count(), 2);
        assert!(queue.activations().next().unwrap().is_press());

        let events = queue.take_events();
        assert_eq!(events[1], KeyboardEvent::Locked { key: KeyId::new(0, 1) });
        assert!(queue.pending_events().is_empty(), "Queue should be empty after take");
    }

    /// Test the channel sink delivers events to the receiver
    #[tokio::test]
    async fn test_channel_sink_delivers() {
        let (mut sink, mut rx) = ChannelSink::new();
        sink.on_key_activated(&activation(KeyState::Pressed));
        sink.on_key_unlocked(KeyId::new(2, 0));

        match rx.next().await {
            Some(KeyboardEvent::Activated(a)) => assert_eq!(a.keycode, 30),
            other => panic!("Expected activation, got {:?}", other),
        }
        assert_eq!(
            rx.next().await,
            Some(KeyboardEvent::Unlocked { key: KeyId::new(2, 0) })
        );
    }

    /// Test sending after the receiver is gone does not panic
    #[test]
    fn test_channel_sink_closed_receiver() {
        let (mut sink, rx) = ChannelSink::new();
        drop(rx);
        sink.on_key_locked(KeyId::new(0, 0));
    }

    /// Test events serialise with a tag
    #[test]
    fn test_event_serialization() {
        let event = KeyboardEvent::Locked { key: KeyId::new(1, 2) };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "locked");
        assert_eq!(json["key"]["section"], 1);
    }
}
