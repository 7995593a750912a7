//=========================================================================
// Event Collector
//=========================================================================
//
// Bounded, non-blocking drain of a window-event channel.
//
// Architecture:
//   Sender<WindowEvent> (platform) → Receiver → collect_frame() → &[WindowEvent]
//
// The drain is bounded so an event flood cannot starve the frame. The
// frame loop paces itself, so the collector never sleeps.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, TryRecvError};
use log::warn;

//=== Internal Dependencies ===============================================

use super::WindowEvent;

//=== EventCollector ======================================================

const MAX_EVENTS_PER_FRAME: usize = 256;

/// Collects pending window events once per frame.
#[derive(Debug)]
pub struct EventCollector {
    receiver: Receiver<WindowEvent>,
    events: Vec<WindowEvent>,
    disconnected: bool,
}

impl EventCollector {
    pub fn new(receiver: Receiver<WindowEvent>) -> Self {
        Self {
            receiver,
            events: Vec::with_capacity(32),
            disconnected: false,
        }
    }

    /// Drains up to a fixed number of pending events.
    ///
    /// A disconnected channel means the event source is gone; it is
    /// reported once as [`WindowEvent::CloseRequested`].
    pub fn collect_frame(&mut self) -> &[WindowEvent] {
        self.events.clear();

        while self.events.len() < MAX_EVENTS_PER_FRAME {
            match self.receiver.try_recv() {
                Ok(event) => self.events.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.disconnected {
                        warn!(target: "platform", "Event source disconnected, requesting close");
                        self.disconnected = true;
                        self.events.push(WindowEvent::CloseRequested);
                    }
                    break;
                }
            }
        }

        if self.events.len() >= MAX_EVENTS_PER_FRAME {
            warn!(
                target: "platform",
                "Event queue backlog: drained {} events this frame",
                self.events.len()
            );
        }

        &self.events
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::{InputEvent, KeyCode, Modifiers};
    use crossbeam_channel::unbounded;

    #[test]
    fn collect_handles_empty_queue() {
        let (_tx, rx) = unbounded::<WindowEvent>();
        let mut collector = EventCollector::new(rx);
        assert!(collector.collect_frame().is_empty());
    }

    #[test]
    fn collect_preserves_arrival_order() {
        let (tx, rx) = unbounded();
        let mut collector = EventCollector::new(rx);

        let key = WindowEvent::Input(InputEvent::KeyDown {
            key: KeyCode::KeyA,
            modifiers: Modifiers::NONE,
        });
        tx.send(key).unwrap();
        tx.send(WindowEvent::Minimized(true)).unwrap();

        assert_eq!(collector.collect_frame(), &[key, WindowEvent::Minimized(true)]);
    }

    #[test]
    fn collect_clears_previous_frame() {
        let (tx, rx) = unbounded();
        let mut collector = EventCollector::new(rx);

        tx.send(WindowEvent::Focused(true)).unwrap();
        assert_eq!(collector.collect_frame().len(), 1);
        assert!(collector.collect_frame().is_empty());
    }

    #[test]
    fn collect_is_bounded_per_frame() {
        let (tx, rx) = unbounded();
        let mut collector = EventCollector::new(rx);

        for _ in 0..MAX_EVENTS_PER_FRAME + 10 {
            tx.send(WindowEvent::Focused(true)).unwrap();
        }

        assert_eq!(collector.collect_frame().len(), MAX_EVENTS_PER_FRAME);
        assert_eq!(collector.collect_frame().len(), 10, "Backlog carries over");
    }

    #[test]
    fn disconnect_requests_close_once() {
        let (tx, rx) = unbounded::<WindowEvent>();
        let mut collector = EventCollector::new(rx);
        drop(tx);

        assert_eq!(collector.collect_frame(), &[WindowEvent::CloseRequested]);
        assert!(collector.collect_frame().is_empty());
    }
}
