//! Typed publish/subscribe for named events.
//!
//! Events are modelled as an enum implementing [`EventMap`]: each variant
//! carries its payload and reports which kind it belongs to, so a listener
//! registered for a kind can only ever observe payloads of that kind.

use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use indexmap::IndexMap;

/// Associates an event payload with the kind listeners subscribe to.
pub trait EventMap {
    /// Discriminant used as the subscription key.
    type Kind: Copy + Eq + Hash + fmt::Debug;

    /// Kind of this payload.
    fn kind(&self) -> Self::Kind;
}

/// Handle returned by [`Dispatcher::on`], used to unregister the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Callback<E> = Rc<dyn Fn(&E)>;

struct DispatcherEvent<E> {
    listeners: Vec<(ListenerId, Callback<E>)>,
}

impl<E> DispatcherEvent<E> {
    fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    fn unregister(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener, _)| *listener != id);
        self.listeners.len() != before
    }
}

/// Registry of listeners keyed by event kind.
///
/// Listeners run synchronously on the dispatching thread, in registration
/// order.
pub struct Dispatcher<E: EventMap> {
    events: IndexMap<E::Kind, DispatcherEvent<E>>,
    next_id: u64,
}

impl<E: EventMap> Dispatcher<E> {
    pub fn new() -> Self {
        Self {
            events: IndexMap::new(),
            next_id: 0,
        }
    }

    /// Register `callback` for events of `kind`.
    pub fn on(&mut self, kind: E::Kind, callback: impl Fn(&E) + 'static) -> ListenerId {
        self.next_id = self.next_id.wrapping_add(1);
        let id = ListenerId(self.next_id);
        let callback: Callback<E> = Rc::new(callback);
        self.events
            .entry(kind)
            .or_insert_with(DispatcherEvent::new)
            .listeners
            .push((id, callback));
        id
    }

    /// Unregister a listener previously returned by [`Dispatcher::on`].
    ///
    /// The event entry itself is dropped once its last listener is removed.
    /// Returns whether a listener was removed.
    pub fn off(&mut self, kind: E::Kind, id: ListenerId) -> bool {
        let Some(event) = self.events.get_mut(&kind) else {
            return false;
        };

        let removed = event.unregister(id);
        if event.listeners.is_empty() {
            self.events.shift_remove(&kind);
        }
        removed
    }

    /// Invoke every listener registered for `event.kind()`.
    ///
    /// Returns the number of listeners invoked; an unknown kind is a no-op.
    pub fn dispatch(&self, event: &E) -> usize {
        self.snapshot(event.kind()).fire(event)
    }

    /// Copy of the listeners currently registered for `kind`.
    ///
    /// Firing a snapshot does not borrow the dispatcher, so listeners may
    /// register or unregister through a shared handle while it runs.
    pub fn snapshot(&self, kind: E::Kind) -> Snapshot<E> {
        let callbacks = self
            .events
            .get(&kind)
            .map(|event| {
                event
                    .listeners
                    .iter()
                    .map(|(_, callback)| Rc::clone(callback))
                    .collect()
            })
            .unwrap_or_default();
        Snapshot { callbacks }
    }

    pub fn listener_count(&self, kind: E::Kind) -> usize {
        self.events
            .get(&kind)
            .map_or(0, |event| event.listeners.len())
    }

    pub fn has_listeners(&self, kind: E::Kind) -> bool {
        self.events.contains_key(&kind)
    }
}

impl<E: EventMap> Default for Dispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EventMap> fmt::Debug for Dispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (kind, event) in &self.events {
            map.entry(kind, &event.listeners.len());
        }
        map.finish()
    }
}

/// Listeners captured at a point in time by [`Dispatcher::snapshot`].
pub struct Snapshot<E> {
    callbacks: Vec<Callback<E>>,
}

impl<E> Snapshot<E> {
    /// Invoke each captured listener with `event`, returning how many ran.
    pub fn fire(&self, event: &E) -> usize {
        for callback in &self.callbacks {
            callback(event);
        }
        self.callbacks.len()
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl<E> fmt::Debug for Snapshot<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Snapshot({} listeners)", self.callbacks.len())
    }
}
