//! # One node of the namespace tree.
//!
//! A node exists while a registration path runs through it. It holds the
//! entries registered exactly at its path (the `*` child of a node carries
//! that level's subtree-wildcard registrations) plus the node's signature
//! record, if a non-flexible subscriber has set one.

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::Arc;

use super::entry::{SubscriberEntry, TransformerEntry};

pub(crate) struct Node {
    /// Full dotted path of this node, fixed at creation.
    pub path: Arc<str>,
    pub children: HashMap<String, Node>,
    pub subscribers: Vec<SubscriberEntry>,
    pub transformers: Vec<TransformerEntry>,
    /// Canonical kwarg-name set, set by the first non-flexible subscriber.
    /// Immutable for the node's lifetime; dies with the node.
    pub signature: Option<Arc<BTreeSet<String>>>,
}

impl Node {
    pub(crate) fn new(path: Arc<str>) -> Self {
        Self {
            path,
            children: HashMap::new(),
            subscribers: Vec::new(),
            transformers: Vec::new(),
            signature: None,
        }
    }

    /// A node with no entries and no children is eligible for deletion.
    /// A lone signature record does not keep a node alive.
    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.subscribers.is_empty() && self.transformers.is_empty() && self.children.is_empty()
    }
}
