//! The forest: hierarchy construction, check/expand state machine and
//! event-driven propagation between parents and children.
//!
//! All transitions are synchronous: a `check` at a leaf returns only after the
//! whole cascade (auto-check bubbling, forced propagation to children, repair
//! of parents without checked children) has run.

use std::time::{Duration, Instant};

use generational_arena::Arena;
use tracing::{debug, instrument, trace};

use crate::domain::entities::{
    Animation, CheckOptions, Expansion, Interaction, NodeDescription, NodeId, RenderMetrics,
};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::events::{
    self, callback, Callback, EventHub, EventSubject, Events, Listener, ListenerResult, NodeEvent,
    Reaction, Subject,
};
use crate::domain::node::{Node, NodeKey, NodeMut, PreOrder, TreeNode};
use crate::domain::options::TreeOptions;
use crate::domain::schedule::{ResolutionQueue, RESOLUTION_DELAY};

/// Root aggregate owning every node of the forest.
#[derive(Debug)]
pub struct Tree {
    options: TreeOptions,
    arena: Arena<TreeNode>,
    roots: Vec<NodeKey>,
    events: EventHub<Callback>,
    schedule: ResolutionQueue,
    gutter: Option<usize>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new(TreeOptions::default())
    }
}

impl Tree {
    pub fn new(options: TreeOptions) -> Self {
        Self {
            options,
            arena: Arena::new(),
            roots: Vec::new(),
            events: EventHub::new(),
            schedule: ResolutionQueue::default(),
            gutter: None,
        }
    }

    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    /// Replace the whole forest with one built from `description`.
    ///
    /// Pending first resolutions of the previous forest are cancelled and its
    /// node keys stop resolving. Forest-level listeners are kept.
    pub fn build(&mut self, description: &[NodeDescription]) -> &mut Self {
        self.build_at(description, Instant::now())
    }

    /// `build` with an explicit construction time for the deferred resolutions.
    #[instrument(level = "debug", skip(self, description))]
    pub fn build_at(&mut self, description: &[NodeDescription], now: Instant) -> &mut Self {
        self.teardown();
        for entry in description {
            let key = self.insert_subtree(entry, None, 0, now);
            self.wire_root(key);
            self.roots.push(key);
        }
        debug!(
            "build: {} top-level nodes, {} nodes total",
            self.roots.len(),
            self.arena.len()
        );
        self
    }

    fn teardown(&mut self) {
        let cancelled = self.schedule.cancel_all();
        let keys: Vec<_> = self.arena.iter().map(|(index, _)| index).collect();
        for index in keys {
            // remove() bumps the arena generation, invalidating old keys
            self.arena.remove(index);
        }
        self.roots.clear();
        if cancelled > 0 {
            debug!("teardown: cancelled {} pending resolutions", cancelled);
        }
    }

    fn insert_subtree(
        &mut self,
        description: &NodeDescription,
        parent: Option<NodeKey>,
        depth: usize,
        now: Instant,
    ) -> NodeKey {
        let node = TreeNode::new(description, parent, depth, self.options.expanded);
        let key = NodeKey(self.arena.insert(node));

        for child_description in description.children() {
            let child = self.insert_subtree(child_description, Some(key), depth + 1, now);
            self.wire_child(key, child);
            if let Some(node) = self.arena.get_mut(key.0) {
                node.children.push(child);
            }
        }

        self.schedule.schedule(key, now + RESOLUTION_DELAY);
        self.wire_own(key);
        key
    }

    /// Listeners a parent installs on each of its children.
    fn wire_child(&mut self, parent: NodeKey, child: NodeKey) {
        self.register(child, events::UPDATE, Listener::Reaction(Reaction::Repair { parent }));
        self.register(child, events::HOVER, Listener::Reaction(Reaction::Bubble { parent }));
        self.register(child, events::CLICK, Listener::Reaction(Reaction::Bubble { parent }));
        if self.options.child_updates_parent {
            let auto_check = Listener::Reaction(Reaction::AutoCheck { parent });
            self.register(child, events::CHECK, auto_check.clone());
            self.register(child, events::CHECK_AUTO, auto_check);
        }
    }

    /// Listeners a node installs on itself.
    fn wire_own(&mut self, key: NodeKey) {
        if self.options.parent_selects_children {
            self.register(key, events::CHECK, Listener::Reaction(Reaction::CheckChildren));
            self.register(key, events::UNCHECK, Listener::Reaction(Reaction::UncheckChildren));
        }
    }

    /// Listeners the forest installs on each top-level node.
    fn wire_root(&mut self, key: NodeKey) {
        for event in [events::UPDATE, events::HOVER, events::CLICK] {
            self.register(key, event, Listener::Reaction(Reaction::Forward));
        }
        self.register(key, events::RENDER, Listener::Reaction(Reaction::MeasureGutter));
    }

    pub(crate) fn register(&mut self, key: NodeKey, event: &str, listener: Listener) {
        if let Some(node) = self.arena.get_mut(key.0) {
            node.events.on(event, listener);
        }
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    fn data(&self, key: NodeKey) -> DomainResult<&TreeNode> {
        self.arena.get(key.0).ok_or(DomainError::NodeNotFound(key))
    }

    fn data_mut(&mut self, key: NodeKey) -> DomainResult<&mut TreeNode> {
        self.arena.get_mut(key.0).ok_or(DomainError::NodeNotFound(key))
    }

    fn view(&self, key: NodeKey) -> DomainResult<Node<'_>> {
        self.node(key).ok_or(DomainError::NodeNotFound(key))
    }

    pub fn node(&self, key: NodeKey) -> Option<Node<'_>> {
        self.arena
            .get(key.0)
            .map(|data| Node::new(self, key, data))
    }

    pub fn node_mut(&mut self, key: NodeKey) -> Option<NodeMut<'_>> {
        if self.arena.contains(key.0) {
            Some(NodeMut::new(self, key))
        } else {
            None
        }
    }

    /// Top-level nodes in input order.
    pub fn nodes(&self) -> impl Iterator<Item = Node<'_>> + '_ {
        self.roots.iter().filter_map(move |&key| self.node(key))
    }

    /// Pre-order walk over the whole forest.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder::new(self.nodes().collect())
    }

    /// Number of nodes at every depth.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// First node in pre-order whose id equals `id`.
    pub fn get(&self, id: &NodeId) -> Option<Node<'_>> {
        self.iter().find(|node| node.id() == Some(id))
    }

    pub fn require(&self, id: &NodeId) -> DomainResult<NodeKey> {
        self.get(id)
            .map(|node| node.key())
            .ok_or_else(|| DomainError::UnknownId(id.clone()))
    }

    pub fn each<'a, F>(&'a self, mut f: F)
    where
        F: FnMut(Node<'a>),
    {
        for node in self.iter() {
            f(node);
        }
    }

    pub fn reduce<'a, A, F>(&'a self, init: A, f: F) -> A
    where
        F: FnMut(A, Node<'a>) -> A,
    {
        self.iter().fold(init, f)
    }

    pub fn to_serializable(&self) -> Vec<NodeDescription> {
        self.nodes().map(|node| node.to_description()).collect()
    }

    /// Gutter fixed by the first `render` of a top-level node.
    pub fn gutter_width(&self) -> Option<usize> {
        self.gutter
    }

    pub fn on_update<F>(&mut self, listener: F) -> &mut Self
    where
        F: FnMut(&NodeEvent<'_>) -> ListenerResult + 'static,
    {
        self.on(events::UPDATE, listener)
    }

    // ---------------------------------------------------------------
    // State machine
    // ---------------------------------------------------------------

    #[instrument(level = "trace", skip(self))]
    pub fn check(&mut self, key: NodeKey, options: CheckOptions) -> DomainResult<()> {
        self.set_checked(key, true, options)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn uncheck(&mut self, key: NodeKey, options: CheckOptions) -> DomainResult<()> {
        self.set_checked(key, false, options)
    }

    pub fn toggle(&mut self, key: NodeKey, options: CheckOptions) -> DomainResult<()> {
        if self.data(key)?.checked {
            self.uncheck(key, options)
        } else {
            self.check(key, options)
        }
    }

    fn set_checked(&mut self, key: NodeKey, checked: bool, options: CheckOptions) -> DomainResult<()> {
        let node = self.data_mut(key)?;
        if node.checked == checked && !options.force {
            return Ok(());
        }
        node.checked = checked;
        if options.silent {
            return Ok(());
        }

        self.dispatch(key, events::UPDATE, Subject::Node(key), None)?;
        let event = if checked { events::CHECK } else { events::UNCHECK };
        self.dispatch(key, event, Subject::Node(key), None)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn expand(&mut self, key: NodeKey, animation: Animation) -> DomainResult<()> {
        self.set_expansion(key, Expansion::Expanded, animation)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn collapse(&mut self, key: NodeKey, animation: Animation) -> DomainResult<()> {
        self.set_expansion(key, Expansion::Collapsed, animation)
    }

    fn set_expansion(
        &mut self,
        key: NodeKey,
        target: Expansion,
        animation: Animation,
    ) -> DomainResult<()> {
        let node = self.data_mut(key)?;
        if node.children.is_empty() || node.expansion == target {
            return Ok(());
        }
        node.expansion = target;

        let duration = match animation {
            Animation::Animated => Some(self.options.animation()),
            Animation::Immediate => None,
        };
        let event = if target == Expansion::Expanded {
            events::EXPAND
        } else {
            events::COLLAPSE
        };
        self.dispatch(key, event, Subject::Node(key), duration)
    }

    /// Apply a raw user-interaction signal to a node.
    #[instrument(level = "debug", skip(self))]
    pub fn interact(&mut self, key: NodeKey, interaction: Interaction) -> DomainResult<()> {
        match interaction {
            Interaction::ExpandClicked => self.expand(key, Animation::Animated),
            Interaction::CollapseClicked => self.collapse(key, Animation::Animated),
            Interaction::LabelClicked => {
                self.dispatch(key, events::CLICK, Subject::Node(key), None)?;
                let node = self.view(key)?;
                let (has_children, expanded) = (node.has_children(), node.is_expanded());
                let checkable = node.is_checkable();
                if self.options.click_to_expand && has_children {
                    if expanded {
                        self.collapse(key, Animation::Animated)
                    } else {
                        self.expand(key, Animation::Animated)
                    }
                } else if self.options.click_to_check && checkable {
                    self.toggle(key, CheckOptions::default())
                } else {
                    Ok(())
                }
            }
            Interaction::CheckboxChanged(checked) => {
                if !self.view(key)?.is_checkable() {
                    trace!("ignoring checkbox change on node without id");
                    return Ok(());
                }
                if checked {
                    self.check(key, CheckOptions::default())
                } else {
                    self.uncheck(key, CheckOptions::default())
                }
            }
            Interaction::Hover => self.dispatch(key, events::HOVER, Subject::Node(key), None),
        }
    }

    // ---------------------------------------------------------------
    // Deferred first resolution
    // ---------------------------------------------------------------

    pub fn pending_resolutions(&self) -> usize {
        self.schedule.len()
    }

    /// Run every first resolution whose delay has elapsed at `now`.
    pub fn run_due(&mut self, now: Instant) -> DomainResult<usize> {
        let mut resolved = 0;
        while let Some(key) = self.schedule.pop_due(now) {
            resolved += self.resolve(key)?;
        }
        Ok(resolved)
    }

    /// Run every pending first resolution regardless of its due time.
    pub fn settle(&mut self) -> DomainResult<usize> {
        let mut resolved = 0;
        while let Some(key) = self.schedule.pop() {
            resolved += self.resolve(key)?;
        }
        Ok(resolved)
    }

    fn resolve(&mut self, key: NodeKey) -> DomainResult<usize> {
        if !self.arena.contains(key.0) {
            trace!("skipping resolution of detached node {:?}", key);
            return Ok(0);
        }
        let metrics = RenderMetrics {
            expand_width: self.options.expand_icon.chars().count(),
            collapse_width: self.options.collapse_icon.chars().count(),
        };
        self.dispatch(key, events::RENDER, Subject::Render(metrics), None)?;

        if self.data(key)?.initial_expanded {
            self.expand(key, Animation::Immediate)?;
        } else {
            self.collapse(key, Animation::Immediate)?;
        }
        Ok(1)
    }

    // ---------------------------------------------------------------
    // Dispatch
    // ---------------------------------------------------------------

    /// Run the listeners of `event` on node `owner`, in registration order.
    pub(crate) fn dispatch(
        &mut self,
        owner: NodeKey,
        event: &str,
        subject: Subject,
        animation: Option<Duration>,
    ) -> DomainResult<()> {
        let listeners = self.data(owner)?.events.listeners(event);
        for listener in listeners {
            match listener {
                Listener::Reaction(reaction) => {
                    self.react(owner, reaction, event, subject, animation)?
                }
                Listener::External(callback) => {
                    self.notify(&callback, event, subject, animation)?
                }
            }
        }
        Ok(())
    }

    fn react(
        &mut self,
        owner: NodeKey,
        reaction: Reaction,
        event: &str,
        subject: Subject,
        animation: Option<Duration>,
    ) -> DomainResult<()> {
        match reaction {
            Reaction::CheckChildren => {
                for child in self.data(owner)?.children.clone() {
                    self.check(child, CheckOptions::FORCED)?;
                }
                Ok(())
            }
            Reaction::UncheckChildren => {
                for child in self.data(owner)?.children.clone() {
                    self.uncheck(child, CheckOptions::FORCED)?;
                }
                Ok(())
            }
            Reaction::AutoCheck { parent } => {
                self.check(parent, CheckOptions::SILENT)?;
                self.dispatch(parent, events::CHECK_AUTO, Subject::Node(parent), None)
            }
            Reaction::Repair { parent } => {
                let node = self.view(parent)?;
                let violated = node.is_checked() && !node.has_checked_child();
                if violated && self.options.checked_parent_must_have_checked_children {
                    debug!("repair: unchecking {:?}, no checked descendant left", parent);
                    self.uncheck(parent, CheckOptions::default())?;
                }
                self.dispatch(parent, events::UPDATE, subject, None)
            }
            Reaction::Bubble { parent } => self.dispatch(parent, event, subject, animation),
            Reaction::Forward => self.emit(event, subject, animation),
            Reaction::MeasureGutter => {
                if let (None, Subject::Render(metrics)) = (self.gutter, subject) {
                    self.gutter = Some(metrics.gutter());
                }
                Ok(())
            }
        }
    }

    /// Run the forest-level listeners of `event`.
    fn emit(
        &mut self,
        event: &str,
        subject: Subject,
        animation: Option<Duration>,
    ) -> DomainResult<()> {
        for callback in self.events.listeners(event) {
            self.notify(&callback, event, subject, animation)?;
        }
        Ok(())
    }

    fn notify(
        &self,
        callback: &Callback,
        event: &str,
        subject: Subject,
        animation: Option<Duration>,
    ) -> DomainResult<()> {
        let subject = match subject {
            Subject::Node(key) => EventSubject::Node(self.view(key)?),
            Subject::Render(metrics) => EventSubject::Render(metrics),
        };
        let node_event = NodeEvent {
            name: event,
            subject,
            animation,
        };
        let mut listener = callback.borrow_mut();
        (&mut *listener)(&node_event).map_err(|source| DomainError::Listener {
            event: event.to_string(),
            source,
        })
    }
}

impl Events for Tree {
    fn on<F>(&mut self, event: &str, listener: F) -> &mut Self
    where
        F: FnMut(&NodeEvent<'_>) -> ListenerResult + 'static,
    {
        self.events.on(event, callback(listener));
        self
    }

    fn trigger(&mut self, event: &str, subject: Subject) -> DomainResult<()> {
        self.emit(event, subject, None)
    }
}
