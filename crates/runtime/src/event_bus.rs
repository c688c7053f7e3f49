use crate::frame::Frame;

pub const EVENT_MOUNTED: &str = "mounted";
pub const EVENT_RESIZED: &str = "resized";
pub const EVENT_DISPOSED: &str = "disposed";
pub const EVENT_TARGET_REACHED: &str = "target-reached";
pub const EVENT_BURST_COMPLETE: &str = "burst-complete";
pub const EVENT_DONATION_COMMITTED: &str = "donation-committed";

/// Outbound notification for the embedding page.
///
/// Components queue events here instead of calling back into the page; the page drains
/// the bus after each tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub frame_index: u64,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, frame_index: u64, kind: &'static str, message: impl Into<String>) {
        self.events.push(Event {
            frame_index,
            kind,
            message: message.into(),
        });
    }

    pub fn emit_at(&mut self, frame: Frame, kind: &'static str, message: impl Into<String>) {
        self.emit(frame.index, kind, message);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn count(&self, kind: &str) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::{EVENT_BURST_COMPLETE, EVENT_TARGET_REACHED, EventBus};
    use crate::frame::Frame;
    use pretty_assertions::assert_eq;

    #[test]
    fn records_events_with_frame_index() {
        let mut bus = EventBus::new();
        bus.emit_at(Frame::new(2, 0.1), EVENT_TARGET_REACHED, "100");
        assert_eq!(bus.events().len(), 1);
        assert_eq!(bus.events()[0].frame_index, 2);
        assert_eq!(bus.count(EVENT_TARGET_REACHED), 1);
        assert_eq!(bus.count(EVENT_BURST_COMPLETE), 0);
    }

    #[test]
    fn drain_clears_events() {
        let mut bus = EventBus::new();
        bus.emit(0, EVENT_BURST_COMPLETE, "tree");
        let drained = bus.drain();
        assert_eq!(drained.len(), 1);
        assert!(bus.events().is_empty());
    }
}
