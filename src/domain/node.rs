//! Node storage, read views and write handles

use std::fmt;

use generational_arena::Index;

use crate::domain::entities::{
    Animation, CheckOptions, Expansion, Interaction, NodeDescription, NodeId,
};
use crate::domain::error::DomainResult;
use crate::domain::events::{callback, EventHub, Events, Listener, ListenerResult, NodeEvent, Subject};
use crate::domain::tree::Tree;

/// Handle of a node inside its forest.
///
/// Keys of a torn-down forest never resolve again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(pub(crate) Index);

/// Stored state of one node in the arena.
#[derive(Debug)]
pub struct TreeNode {
    pub(crate) id: Option<NodeId>,
    pub(crate) label: String,
    pub(crate) checked: bool,
    pub(crate) expansion: Expansion,
    /// State the deferred first resolution will apply.
    pub(crate) initial_expanded: bool,
    pub(crate) depth: usize,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: Vec<NodeKey>,
    pub(crate) events: EventHub<Listener>,
}

impl TreeNode {
    pub(crate) fn new(
        description: &NodeDescription,
        parent: Option<NodeKey>,
        depth: usize,
        default_expanded: bool,
    ) -> Self {
        Self {
            id: description.id.clone(),
            label: description.label.clone(),
            checked: description.checked.unwrap_or(false),
            expansion: Expansion::Unresolved,
            initial_expanded: description.expanded.unwrap_or(default_expanded),
            depth,
            parent,
            children: Vec::new(),
            events: EventHub::new(),
        }
    }
}

/// Borrowed read view of a node and, through the forest, its subtree.
#[derive(Clone, Copy)]
pub struct Node<'a> {
    tree: &'a Tree,
    key: NodeKey,
    data: &'a TreeNode,
}

impl<'a> Node<'a> {
    pub(crate) fn new(tree: &'a Tree, key: NodeKey, data: &'a TreeNode) -> Self {
        Self { tree, key, data }
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn id(&self) -> Option<&'a NodeId> {
        self.data.id.as_ref()
    }

    pub fn label(&self) -> &'a str {
        &self.data.label
    }

    /// Nodes without an id have no checkbox.
    pub fn is_checkable(&self) -> bool {
        self.data.id.is_some()
    }

    pub fn is_checked(&self) -> bool {
        self.data.checked
    }

    pub fn expansion(&self) -> Expansion {
        self.data.expansion
    }

    /// Only meaningful for nodes with children; leaves render flat.
    pub fn is_expanded(&self) -> bool {
        self.data.expansion.is_expanded()
    }

    pub fn depth(&self) -> usize {
        self.data.depth
    }

    pub fn has_children(&self) -> bool {
        !self.data.children.is_empty()
    }

    pub fn children(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let tree = self.tree;
        self.data
            .children
            .iter()
            .filter_map(move |&child| tree.node(child))
    }

    pub fn parent(&self) -> Option<Node<'a>> {
        self.data.parent.and_then(|parent| self.tree.node(parent))
    }

    /// True if any direct or indirect descendant is checked.
    pub fn has_checked_child(&self) -> bool {
        self.children()
            .any(|child| child.is_checked() || child.has_checked_child())
    }

    /// Pre-order walk starting at this node.
    pub fn iter(&self) -> PreOrder<'a> {
        PreOrder::new(vec![*self])
    }

    /// Visit this node, then its children in order, recursively.
    pub fn each<F>(&self, mut f: F)
    where
        F: FnMut(Node<'a>),
    {
        for node in self.iter() {
            f(node);
        }
    }

    /// Pre-order fold, same visiting order as `each`.
    pub fn reduce<A, F>(&self, init: A, f: F) -> A
    where
        F: FnMut(A, Node<'a>) -> A,
    {
        self.iter().fold(init, f)
    }

    /// First node in pre-order whose id equals `id`.
    pub fn get(&self, id: &NodeId) -> Option<Node<'a>> {
        self.iter().find(|node| node.id() == Some(id))
    }

    /// Expand state as serialized: a pending resolution reports its target.
    pub fn effective_expanded(&self) -> bool {
        match self.data.expansion {
            Expansion::Expanded => true,
            Expansion::Collapsed => false,
            Expansion::Unresolved => self.data.initial_expanded,
        }
    }

    pub fn to_description(&self) -> NodeDescription {
        let nodes: Vec<NodeDescription> = self.children().map(|c| c.to_description()).collect();
        let has_children = !nodes.is_empty();
        NodeDescription {
            id: self.data.id.clone(),
            label: self.data.label.clone(),
            checked: self.is_checkable().then_some(self.data.checked),
            expanded: has_children.then(|| self.effective_expanded()),
            nodes: has_children.then_some(nodes),
        }
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("key", &self.key)
            .field("id", &self.data.id)
            .field("label", &self.data.label)
            .field("checked", &self.data.checked)
            .field("expansion", &self.data.expansion)
            .field("depth", &self.data.depth)
            .finish()
    }
}

/// Depth-first, parent before children, siblings in input order.
pub struct PreOrder<'a> {
    stack: Vec<Node<'a>>,
}

impl<'a> PreOrder<'a> {
    pub(crate) fn new(mut start: Vec<Node<'a>>) -> Self {
        start.reverse();
        Self { stack: start }
    }
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        let children: Vec<Node<'a>> = current.children().collect();
        self.stack.extend(children.into_iter().rev());
        Some(current)
    }
}

/// Mutable handle on one node; every operation runs its full cascade.
pub struct NodeMut<'a> {
    tree: &'a mut Tree,
    key: NodeKey,
}

impl<'a> NodeMut<'a> {
    pub(crate) fn new(tree: &'a mut Tree, key: NodeKey) -> Self {
        Self { tree, key }
    }

    pub fn check(&mut self, options: CheckOptions) -> DomainResult<&mut Self> {
        self.tree.check(self.key, options)?;
        Ok(self)
    }

    pub fn uncheck(&mut self, options: CheckOptions) -> DomainResult<&mut Self> {
        self.tree.uncheck(self.key, options)?;
        Ok(self)
    }

    pub fn toggle(&mut self, options: CheckOptions) -> DomainResult<&mut Self> {
        self.tree.toggle(self.key, options)?;
        Ok(self)
    }

    pub fn expand(&mut self, animation: Animation) -> DomainResult<&mut Self> {
        self.tree.expand(self.key, animation)?;
        Ok(self)
    }

    pub fn collapse(&mut self, animation: Animation) -> DomainResult<&mut Self> {
        self.tree.collapse(self.key, animation)?;
        Ok(self)
    }

    pub fn interact(&mut self, interaction: Interaction) -> DomainResult<&mut Self> {
        self.tree.interact(self.key, interaction)?;
        Ok(self)
    }
}

impl Events for NodeMut<'_> {
    fn on<F>(&mut self, event: &str, listener: F) -> &mut Self
    where
        F: FnMut(&NodeEvent<'_>) -> ListenerResult + 'static,
    {
        self.tree
            .register(self.key, event, Listener::External(callback(listener)));
        self
    }

    fn trigger(&mut self, event: &str, subject: Subject) -> DomainResult<()> {
        self.tree.dispatch(self.key, event, subject, None)
    }
}
