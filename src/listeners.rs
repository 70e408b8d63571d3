use crate::event::{Event, EventKind};

/// Handle to a registered listener, used to remove it again
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Callback = Box<dyn FnMut(&Event) + Send + 'static>;

struct Listener {
    id: ListenerId,
    // None means "every kind"
    kind: Option<EventKind>,
    callback: Callback,
}

/// An ordered registry of event callbacks.
///
/// Callbacks run synchronously, in registration order, on whichever thread calls
/// [`Listeners::dispatch`]. For a connected device that's the MIDI driver's notification thread, so
/// callbacks must return quickly. Hand long-running work off to your own thread or channel.
#[derive(Default)]
pub struct Listeners {
    listeners: Vec<Listener>,
    next_id: u64,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, kind: Option<EventKind>, callback: Callback) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Listener { id, kind, callback });
        id
    }

    /// Register `callback` for events of the given kind
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        callback: impl FnMut(&Event) + Send + 'static,
    ) -> ListenerId {
        self.add(Some(kind), Box::new(callback))
    }

    /// Register `callback` for every event
    pub fn subscribe_all(&mut self, callback: impl FnMut(&Event) + Send + 'static) -> ListenerId {
        self.add(None, Box::new(callback))
    }

    /// Remove a listener. Returns whether the listener was registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let len_before = self.listeners.len();
        self.listeners.retain(|listener| listener.id != id);
        self.listeners.len() != len_before
    }

    /// Invoke every listener interested in `event`. Returns how many were invoked.
    pub fn dispatch(&mut self, event: &Event) -> usize {
        let kind = event.kind();
        let mut invoked = 0;
        for listener in &mut self.listeners {
            if listener.kind.map_or(true, |k| k == kind) {
                (listener.callback)(event);
                invoked += 1;
            }
        }
        invoked
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&'static str) -> Callback) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log2 = Arc::clone(&log);
        let make = move |tag: &'static str| -> Callback {
            let log = Arc::clone(&log2);
            Box::new(move |event: &Event| log.lock().unwrap().push(format!("{} {:?}", tag, event)))
        };
        (log, make)
    }

    #[test]
    fn dispatch_in_registration_order() {
        let (log, make) = recorder();
        let mut listeners = Listeners::new();
        listeners.subscribe(EventKind::PadPressed, make("first"));
        listeners.subscribe_all(make("all"));
        listeners.subscribe(EventKind::PadPressed, make("second"));

        assert_eq!(listeners.dispatch(&Event::PadPressed(3)), 3);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["first PadPressed(3)", "all PadPressed(3)", "second PadPressed(3)"]
        );
    }

    #[test]
    fn only_matching_kinds_are_invoked() {
        let (log, make) = recorder();
        let mut listeners = Listeners::new();
        listeners.subscribe(EventKind::ShiftPressed, make("shift"));

        assert_eq!(listeners.dispatch(&Event::ShiftReleased), 0);
        assert_eq!(listeners.dispatch(&Event::ShiftPressed), 1);
        assert_eq!(*log.lock().unwrap(), vec!["shift ShiftPressed"]);
    }

    #[test]
    fn unsubscribe_removes_only_that_listener() {
        let (log, make) = recorder();
        let mut listeners = Listeners::new();
        let a = listeners.subscribe(EventKind::FaderChanged, make("a"));
        listeners.subscribe(EventKind::FaderChanged, make("b"));

        assert!(listeners.unsubscribe(a));
        assert!(!listeners.unsubscribe(a));
        assert_eq!(listeners.len(), 1);

        listeners.dispatch(&Event::FaderChanged { fader: 1, value: 2 });
        assert_eq!(*log.lock().unwrap(), vec!["b FaderChanged { fader: 1, value: 2 }"]);
    }
}
