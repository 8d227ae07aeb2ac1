//! Forest service
//!
//! Loads tree descriptions from disk, replays user operations against the
//! engine and reports the resulting state together with the observed events.

use std::cell::RefCell;
use std::fmt;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, PathContext};
use crate::domain::events::{self, Events};
use crate::domain::{
    Animation, CheckOptions, DomainError, Interaction, NodeDescription, NodeEvent, NodeId,
    NodeKey, Tree, TreeOptions,
};
use crate::infrastructure::traits::FileSystem;

/// One user operation, addressed by node id as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Check(String),
    Uncheck(String),
    Toggle(String),
    Expand(String),
    Collapse(String),
    Click(String),
    Hover(String),
}

impl Operation {
    pub fn id(&self) -> &str {
        match self {
            Operation::Check(id)
            | Operation::Uncheck(id)
            | Operation::Toggle(id)
            | Operation::Expand(id)
            | Operation::Collapse(id)
            | Operation::Click(id)
            | Operation::Hover(id) => id,
        }
    }

    fn apply(&self, tree: &mut Tree, key: NodeKey) -> ApplicationResult<()> {
        match self {
            Operation::Check(_) => tree.check(key, CheckOptions::default())?,
            Operation::Uncheck(_) => tree.uncheck(key, CheckOptions::default())?,
            Operation::Toggle(_) => tree.toggle(key, CheckOptions::default())?,
            Operation::Expand(_) => tree.expand(key, Animation::Animated)?,
            Operation::Collapse(_) => tree.collapse(key, Animation::Animated)?,
            Operation::Click(_) => tree.interact(key, Interaction::LabelClicked)?,
            Operation::Hover(_) => tree.interact(key, Interaction::Hover)?,
        }
        Ok(())
    }
}

/// An event observed while applying operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub event: String,
    pub id: Option<NodeId>,
    pub label: String,
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{} {} ({})", self.event, id, self.label),
            None => write!(f, "{} ({})", self.event, self.label),
        }
    }
}

/// Result of replaying operations on a forest.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub forest: Vec<NodeDescription>,
    pub events: Vec<EventRecord>,
}

/// Per-node events recorded; `update`/`hover`/`click` are taken once, at forest level.
const NODE_EVENTS: [&str; 5] = [
    events::CHECK,
    events::UNCHECK,
    events::CHECK_AUTO,
    events::EXPAND,
    events::COLLAPSE,
];
const FOREST_EVENTS: [&str; 3] = [events::UPDATE, events::HOVER, events::CLICK];

/// Service for loading, mutating and saving tree descriptions.
pub struct ForestService {
    fs: Arc<dyn FileSystem>,
    options: TreeOptions,
}

impl ForestService {
    pub fn new(fs: Arc<dyn FileSystem>, options: TreeOptions) -> Self {
        Self { fs, options }
    }

    /// Read and parse a description file; malformed files are rejected whole.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<Vec<NodeDescription>> {
        if !self.fs.exists(path) {
            return Err(ApplicationError::OperationFailed {
                context: format!("file not found: {}", path.display()),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "file does not exist",
                )),
            });
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read tree description", path)?;
        NodeDescription::parse_forest(&content).map_err(|source| ApplicationError::Description {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Build a forest from a file and run its first resolutions.
    pub fn open(&self, path: &Path) -> ApplicationResult<Tree> {
        let description = self.load(path)?;
        let mut tree = Tree::new(self.options.clone());
        tree.build(&description);
        let resolved = tree.settle()?;
        debug!("open: {} nodes resolved from {}", resolved, path.display());
        Ok(tree)
    }

    /// Find a node by the id as typed: text first, then as a number.
    pub fn resolve(tree: &Tree, raw: &str) -> ApplicationResult<NodeKey> {
        let text = NodeId::Text(raw.to_string());
        if let Some(node) = tree.get(&text) {
            return Ok(node.key());
        }
        raw.parse::<serde_json::Number>()
            .ok()
            .and_then(|n| tree.get(&NodeId::Number(n)))
            .map(|node| node.key())
            .ok_or_else(|| DomainError::UnknownId(text).into())
    }

    /// Replay `operations` in order against the forest stored at `path`.
    #[instrument(level = "debug", skip(self, operations))]
    pub fn apply(&self, path: &Path, operations: &[Operation]) -> ApplicationResult<Outcome> {
        let mut tree = self.open(path)?;
        let log = Rc::new(RefCell::new(Vec::new()));
        Self::record_events(&mut tree, &log);

        for operation in operations {
            let key = Self::resolve(&tree, operation.id())?;
            debug!("apply: {:?}", operation);
            operation.apply(&mut tree, key)?;
        }

        let events = log.borrow().clone();
        Ok(Outcome {
            forest: tree.to_serializable(),
            events,
        })
    }

    fn record_events(tree: &mut Tree, log: &Rc<RefCell<Vec<EventRecord>>>) {
        let keys: Vec<NodeKey> = tree.iter().map(|node| node.key()).collect();
        for key in keys {
            if let Some(mut node) = tree.node_mut(key) {
                for event in NODE_EVENTS {
                    node.on(event, recorder(log));
                }
            }
        }
        for event in FOREST_EVENTS {
            tree.on(event, recorder(log));
        }
    }

    /// Write a forest as JSON.
    pub fn save(
        &self,
        path: &Path,
        forest: &[NodeDescription],
        pretty: bool,
    ) -> ApplicationResult<()> {
        let mut json = NodeDescription::forest_to_json(forest, pretty)?;
        json.push('\n');
        self.fs
            .write(path, &json)
            .with_path_context("write tree description", path)
    }
}

fn recorder(
    log: &Rc<RefCell<Vec<EventRecord>>>,
) -> impl FnMut(&NodeEvent<'_>) -> crate::domain::ListenerResult + 'static {
    let log = Rc::clone(log);
    move |event| {
        if let Some(node) = event.node() {
            log.borrow_mut().push(EventRecord {
                event: event.name.to_string(),
                id: node.id().cloned(),
                label: node.label().to_string(),
            });
        }
        Ok(())
    }
}
