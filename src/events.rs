//! Drawing-surface events and commands, and per-map subscriptions

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use curbside_core::LatLng;

use crate::registry::{LayerId, LayerKind};

/// Identifies one map instance on the drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MapId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Segment,
    StudyArea,
}

/// Input from the drawing surface
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    DrawStart(ShapeKind),
    VertexAdded(LatLng),
    PointerMoved(LatLng),
    /// Drawing mode left, whether or not a shape was finalized
    DrawEnd,
    ShapeFinalized {
        kind: ShapeKind,
        geometry: Vec<LatLng>,
    },
    ShapeEdited {
        layer: LayerId,
        geometry: Vec<LatLng>,
    },
    ShapeDeleted(LayerId),
}

/// Output to the drawing surface
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCommand {
    /// Move a committed vertex of the line being drawn
    MoveVertex { index: usize, to: LatLng },
    /// Where the open vertex under the pointer should be drawn
    UpdatePreview(LatLng),
    ReplaceGeometry {
        layer: LayerId,
        geometry: Vec<LatLng>,
    },
    /// End the current drawing interaction
    FinishDrawing,
    AddLayer {
        layer: LayerId,
        kind: LayerKind,
        geometry: Vec<LatLng>,
    },
    RemoveLayer(LayerId),
    ShowGuides(Vec<(LayerId, Vec<LatLng>)>),
    ClearGuides,
    /// Message for the user
    Notify(String),
}

type Handler = Rc<RefCell<dyn FnMut(&SurfaceEvent)>>;

struct Entry {
    map: MapId,
    key: String,
    token: u64,
    handler: Handler,
}

#[derive(Default)]
struct Subscribers {
    next_token: u64,
    entries: Vec<Entry>,
}

/// Routes surface events to handlers registered per map.
///
/// Subscribing again under the same map and key replaces the earlier
/// handler. Handlers stay registered until their [`Subscription`] is dropped.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    subscribers: Rc<RefCell<Subscribers>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "the handler is removed when the subscription is dropped"]
    pub fn subscribe(
        &self,
        map: MapId,
        key: impl Into<String>,
        handler: impl FnMut(&SurfaceEvent) + 'static,
    ) -> Subscription {
        let key = key.into();
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.next_token += 1;
        let token = subscribers.next_token;
        let handler: Handler = Rc::new(RefCell::new(handler));

        let existing = subscribers
            .entries
            .iter()
            .position(|e| e.map == map && e.key == key);
        match existing {
            Some(idx) => {
                let entry = &mut subscribers.entries[idx];
                entry.token = token;
                entry.handler = handler;
            }
            None => subscribers.entries.push(Entry {
                map,
                key: key.clone(),
                token,
                handler,
            }),
        }

        Subscription {
            subscribers: Rc::downgrade(&self.subscribers),
            map,
            key,
            token,
        }
    }

    /// Delivers `event` to every handler of `map`, in subscription order
    pub fn dispatch(&self, map: MapId, event: &SurfaceEvent) -> usize {
        // Handlers may subscribe or unsubscribe while running
        let handlers: Vec<Handler> = self
            .subscribers
            .borrow()
            .entries
            .iter()
            .filter(|e| e.map == map)
            .map(|e| Rc::clone(&e.handler))
            .collect();
        for handler in &handlers {
            (*handler.borrow_mut())(event);
        }
        handlers.len()
    }

    pub fn subscriber_count(&self, map: MapId) -> usize {
        self.subscribers
            .borrow()
            .entries
            .iter()
            .filter(|e| e.map == map)
            .count()
    }
}

/// Keeps a handler registered. Dropping it unsubscribes.
pub struct Subscription {
    subscribers: Weak<RefCell<Subscribers>>,
    map: MapId,
    key: String,
    token: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(subscribers) = self.subscribers.upgrade() else {
            return;
        };
        let Ok(mut subscribers) = subscribers.try_borrow_mut() else {
            return;
        };
        // A replaced subscription no longer owns its slot
        subscribers
            .entries
            .retain(|e| !(e.map == self.map && e.key == self.key && e.token == self.token));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> (Rc<RefCell<Vec<String>>>, impl Fn(&'static str) -> Box<dyn FnMut(&SurfaceEvent)>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let make = move |name: &'static str| {
            let sink = Rc::clone(&sink);
            Box::new(move |_: &SurfaceEvent| sink.borrow_mut().push(name.to_string()))
                as Box<dyn FnMut(&SurfaceEvent)>
        };
        (log, make)
    }

    #[test]
    fn delivers_per_map() {
        let dispatcher = EventDispatcher::new();
        let (log, make) = counter();
        let _a = dispatcher.subscribe(MapId(1), "session", make("one"));
        let _b = dispatcher.subscribe(MapId(2), "session", make("two"));

        assert_eq!(dispatcher.dispatch(MapId(1), &SurfaceEvent::DrawEnd), 1);
        assert_eq!(*log.borrow(), ["one"]);
    }

    #[test]
    fn same_key_replaces_handler() {
        let dispatcher = EventDispatcher::new();
        let (log, make) = counter();
        let first = dispatcher.subscribe(MapId(1), "session", make("old"));
        let _second = dispatcher.subscribe(MapId(1), "session", make("new"));
        assert_eq!(dispatcher.subscriber_count(MapId(1)), 1);

        // Dropping the replaced guard must not remove its successor
        drop(first);
        dispatcher.dispatch(MapId(1), &SurfaceEvent::DrawEnd);
        assert_eq!(*log.borrow(), ["new"]);
    }

    #[test]
    fn dropping_guard_unsubscribes() {
        let dispatcher = EventDispatcher::new();
        let (log, make) = counter();
        {
            let _scoped = dispatcher.subscribe(MapId(1), "preview", make("scoped"));
            dispatcher.dispatch(MapId(1), &SurfaceEvent::DrawEnd);
        }
        assert_eq!(dispatcher.subscriber_count(MapId(1)), 0);
        assert_eq!(dispatcher.dispatch(MapId(1), &SurfaceEvent::DrawEnd), 0);
        assert_eq!(log.borrow().len(), 1);
    }
}
