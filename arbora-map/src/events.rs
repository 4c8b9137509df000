//! Page-scoped event channel
//!
//! Callbacks handed to the drawing tool, markers and popups cannot borrow
//! the page, so they send a [`PageEvent`] instead and the page drains the
//! channel in `process_events`. The channel lives and dies with the page:
//!
//! ```text
//! draw tool ─┐
//! marker    ─┼─▶ EventEmitter ──▶ mpsc ──▶ PageEvents::drain ──▶ MapPage
//! popup     ─┘        │
//!                     └── shutdown token cancelled on unmount ⇒ emit dropped
//! ```

use shared::LngLat;
use shared::types::ElementId;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// Drawing tool result; empty when the shape was rejected or removed
    RingUpdated(Vec<LngLat>),
    MarkerClicked(ElementId),
    DeleteElementRequested(ElementId),
    AddIncidentRequested(ElementId),
}

/// Cloneable sending half
#[derive(Debug, Clone)]
pub struct EventEmitter {
    tx: mpsc::UnboundedSender<PageEvent>,
    shutdown: CancellationToken,
}

impl EventEmitter {
    /// `false` once the page has been torn down
    pub fn emit(&self, event: PageEvent) -> bool {
        if self.shutdown.is_cancelled() {
            tracing::trace!(?event, "Page closed, event dropped");
            return false;
        }
        match self.tx.send(event) {
            Ok(()) => true,
            Err(mpsc::error::SendError(event)) => {
                tracing::trace!(?event, "Page closed, event dropped");
                false
            }
        }
    }
}

#[derive(Debug)]
pub struct PageEvents {
    tx: mpsc::UnboundedSender<PageEvent>,
    rx: mpsc::UnboundedReceiver<PageEvent>,
    shutdown: CancellationToken,
}

impl Default for PageEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl PageEvents {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn emitter(&self) -> EventEmitter {
        EventEmitter {
            tx: self.tx.clone(),
            shutdown: self.shutdown.child_token(),
        }
    }

    /// Everything queued so far, in emit order
    pub fn drain(&mut self) -> Vec<PageEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Stop accepting events and discard anything still queued
    pub fn close(&mut self) {
        self.shutdown.cancel();
        self.rx.close();
        let dropped = self.drain().len();
        if dropped > 0 {
            tracing::debug!(dropped, "Discarded queued page events");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_in_order() {
        let mut events = PageEvents::new();
        let emitter = events.emitter();
        assert!(emitter.emit(PageEvent::MarkerClicked(1)));
        assert!(emitter.clone().emit(PageEvent::DeleteElementRequested(2)));
        assert_eq!(
            events.drain(),
            vec![PageEvent::MarkerClicked(1), PageEvent::DeleteElementRequested(2)]
        );
        assert!(events.drain().is_empty());
    }

    #[test]
    fn test_close_drops_pending_and_future_events() {
        let mut events = PageEvents::new();
        let emitter = events.emitter();
        emitter.emit(PageEvent::RingUpdated(vec![]));
        events.close();

        assert!(events.is_closed());
        assert!(!emitter.emit(PageEvent::MarkerClicked(3)));
        assert!(events.drain().is_empty());
    }
}
