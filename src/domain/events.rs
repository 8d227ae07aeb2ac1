//! Named-event publish/subscribe used by nodes and by the forest
//!
//! Listeners run synchronously in registration order. Errors returned by a
//! listener are not swallowed: they abort the dispatch and surface at the
//! operation that triggered it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::domain::entities::RenderMetrics;
use crate::domain::error::DomainResult;
use crate::domain::node::{Node, NodeKey};

pub const UPDATE: &str = "update";
pub const CHECK: &str = "check";
pub const UNCHECK: &str = "uncheck";
pub const CHECK_AUTO: &str = "check:auto";
pub const EXPAND: &str = "expand";
pub const COLLAPSE: &str = "collapse";
pub const HOVER: &str = "hover";
pub const CLICK: &str = "click";
pub const RENDER: &str = "render";

pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;
pub type ListenerResult = Result<(), ListenerError>;

/// External listener, shared so a dispatch can run it while the hub stays borrowed-free.
pub type Callback = Rc<RefCell<dyn FnMut(&NodeEvent<'_>) -> ListenerResult>>;

pub fn callback<F>(listener: F) -> Callback
where
    F: FnMut(&NodeEvent<'_>) -> ListenerResult + 'static,
{
    Rc::new(RefCell::new(listener))
}

/// Ordered listener lists keyed by exact event name.
pub struct EventHub<L> {
    listeners: HashMap<String, Vec<L>>,
}

impl<L> Default for EventHub<L> {
    fn default() -> Self {
        Self {
            listeners: HashMap::new(),
        }
    }
}

impl<L: Clone> EventHub<L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener; the same listener registered twice runs twice.
    pub fn on(&mut self, event: &str, listener: L) {
        self.listeners
            .entry(event.to_string())
            .or_default()
            .push(listener);
    }

    /// Snapshot of the listeners for `event`, in registration order.
    pub fn listeners(&self, event: &str) -> Vec<L> {
        self.listeners.get(event).cloned().unwrap_or_default()
    }

    pub fn count(&self, event: &str) -> usize {
        self.listeners.get(event).map_or(0, Vec::len)
    }
}

impl<L> fmt::Debug for EventHub<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, listeners) in &self.listeners {
            map.entry(name, &listeners.len());
        }
        map.finish()
    }
}

/// What an event is about, as passed to `trigger`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Node(NodeKey),
    Render(RenderMetrics),
}

/// Payload as seen by external listeners.
#[derive(Debug, Clone, Copy)]
pub enum EventSubject<'a> {
    Node(Node<'a>),
    Render(RenderMetrics),
}

/// An event delivered to an external listener.
#[derive(Debug, Clone, Copy)]
pub struct NodeEvent<'a> {
    pub name: &'a str,
    pub subject: EventSubject<'a>,
    /// Set on `expand`/`collapse` when the transition should be animated.
    pub animation: Option<Duration>,
}

impl<'a> NodeEvent<'a> {
    pub fn node(&self) -> Option<Node<'a>> {
        match self.subject {
            EventSubject::Node(node) => Some(node),
            EventSubject::Render(_) => None,
        }
    }
}

/// Propagation wiring installed by the tree itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reaction {
    /// Force own `check` onto every direct child.
    CheckChildren,
    /// Force own `uncheck` onto every direct child.
    UncheckChildren,
    /// Child checked (directly or automatically): check parent silently, emit `check:auto`.
    AutoCheck { parent: NodeKey },
    /// Child changed: enforce the checked-children rule on the parent, re-emit `update`.
    Repair { parent: NodeKey },
    /// Re-emit the same event on the parent.
    Bubble { parent: NodeKey },
    /// Re-emit the same event on the forest.
    Forward,
    /// Record the forest gutter from the first `render`.
    MeasureGutter,
}

#[derive(Clone)]
pub(crate) enum Listener {
    Reaction(Reaction),
    External(Callback),
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Listener::Reaction(reaction) => write!(f, "{:?}", reaction),
            Listener::External(_) => write!(f, "External"),
        }
    }
}

/// The `{on, trigger}` capability shared by the forest and its nodes.
pub trait Events {
    fn on<F>(&mut self, event: &str, listener: F) -> &mut Self
    where
        F: FnMut(&NodeEvent<'_>) -> ListenerResult + 'static;

    /// Run every listener of `event`; an event nobody listens to is a no-op.
    fn trigger(&mut self, event: &str, subject: Subject) -> DomainResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_listeners_when_snapshotting_then_keeps_registration_order() {
        let mut hub: EventHub<u8> = EventHub::new();
        hub.on(UPDATE, 1);
        hub.on(UPDATE, 2);
        hub.on(CHECK, 3);

        assert_eq!(hub.listeners(UPDATE), vec![1, 2]);
        assert_eq!(hub.listeners(CHECK), vec![3]);
    }

    #[test]
    fn given_same_listener_twice_when_registering_then_no_deduplication() {
        let mut hub: EventHub<u8> = EventHub::new();
        hub.on(CLICK, 9);
        hub.on(CLICK, 9);
        assert_eq!(hub.count(CLICK), 2);
    }

    #[test]
    fn given_unknown_event_when_snapshotting_then_empty() {
        let hub: EventHub<u8> = EventHub::new();
        assert!(hub.listeners("nothing").is_empty());
        assert_eq!(hub.count("nothing"), 0);
    }

    #[test]
    fn given_similar_names_when_snapshotting_then_matches_exactly() {
        let mut hub: EventHub<u8> = EventHub::new();
        hub.on(CHECK_AUTO, 1);
        assert!(hub.listeners(CHECK).is_empty());
        assert!(hub.listeners("check:*").is_empty());
    }
}
