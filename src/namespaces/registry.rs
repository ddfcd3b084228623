//! # The namespace tree and its lifecycle.
//!
//! The registry owns every node, assigns registration sequence numbers, and
//! reports structural changes (created/deleted node paths, retired entries)
//! back to the dispatch coordinator, which turns them into
//! meta-notifications *after* releasing the registry lock.
//!
//! ## Rules
//! - A conflicting registration returns an error before any node is
//!   created: rejection leaves no trace.
//! - Removal prunes newly empty nodes bottom-up along the touched path;
//!   deleted paths come back deepest-first.
//! - Resolution walks the literal path once, picking up each strict-prefix
//!   ancestor's `*` child on the way down, and returns sorted snapshots.

use std::sync::{Arc, Weak};

use serde_json::Value;

use crate::error::Error;
use crate::namespaces::Signature;
use crate::subscribers::{Subscribe, SubscribeAsync};
use crate::transformers::Transform;

use super::entry::{
    ResolvedSubscriber, ResolvedTransformer, SubscriberEntry, SubscriberHandle, TransformerEntry,
};
use super::node::Node;
use super::path;
use super::signature::sorted_names;

/// Result of a successful registration.
#[derive(Default)]
pub(crate) struct Registration {
    /// Paths of nodes created by this registration, shallowest first.
    pub created: Vec<Arc<str>>,
}

/// Result of a removal.
#[derive(Default)]
pub(crate) struct Removal {
    /// How many entries were removed.
    pub removed: usize,
    /// Paths of nodes deleted by pruning, deepest first.
    pub deleted: Vec<Arc<str>>,
}

/// Entries retired by a [`Registry::reap`] sweep, as `(owner, name)` pairs.
#[derive(Default)]
pub(crate) struct ReapReport {
    pub subscribers: Vec<(Arc<str>, Arc<str>)>,
    pub transformers: Vec<(Arc<str>, Arc<str>)>,
    pub deleted: Vec<Arc<str>>,
}

pub(crate) struct Registry {
    root: Node,
    next_seq: u64,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            root: Node::new("".into()),
            next_seq: 0,
        }
    }

    // ---------------------------
    // Registration
    // ---------------------------

    /// Adds a subscriber entry, enforcing the namespace's signature record.
    ///
    /// The signature check runs against the existing node before anything is
    /// created, so a conflict mutates nothing.
    pub(crate) fn register_subscriber(
        &mut self,
        namespace: &str,
        handle: SubscriberHandle,
        name: Arc<str>,
        priority: i32,
        signature: &Signature,
    ) -> Result<Registration, Error> {
        path::validate(namespace)?;

        if let Signature::Exact(names) = signature {
            if let Some(record) = self.node(namespace).and_then(|n| n.signature.as_ref()) {
                if **record != *names {
                    return Err(Error::SignatureConflict {
                        namespace: namespace.to_string(),
                        expected: sorted_names(record),
                        provided: sorted_names(names),
                    });
                }
            }
        }

        let seq = self.take_seq();
        let flexible = signature.is_flexible();
        let (node, created) = self.ensure(namespace);

        if let Signature::Exact(names) = signature {
            if node.signature.is_none() {
                node.signature = Some(Arc::new(names.clone()));
            }
        }

        node.subscribers.push(SubscriberEntry {
            handle,
            name,
            priority,
            seq,
            flexible,
        });

        Ok(Registration { created })
    }

    /// Adds a transformer entry. Transformers carry no signature contract.
    pub(crate) fn register_transformer(
        &mut self,
        namespace: &str,
        handle: Weak<dyn Transform>,
        name: Arc<str>,
        priority: i32,
    ) -> Result<Registration, Error> {
        path::validate(namespace)?;

        let seq = self.take_seq();
        let (node, created) = self.ensure(namespace);
        node.transformers.push(TransformerEntry {
            handle,
            name,
            priority,
            seq,
        });

        Ok(Registration { created })
    }

    // ---------------------------
    // Removal
    // ---------------------------

    /// Removes every subscriber entry matching `pred`, pruning empty nodes.
    pub(crate) fn remove_subscribers<F>(&mut self, namespace: &str, pred: F) -> Removal
    where
        F: Fn(&SubscriberEntry) -> bool,
    {
        let Some(node) = self.node_mut(namespace) else {
            return Removal::default();
        };
        let before = node.subscribers.len();
        node.subscribers.retain(|e| !pred(e));
        let removed = before - node.subscribers.len();

        let deleted = if removed > 0 {
            self.prune(namespace)
        } else {
            Vec::new()
        };
        Removal { removed, deleted }
    }

    /// Removes every transformer entry matching `pred`, pruning empty nodes.
    pub(crate) fn remove_transformers<F>(&mut self, namespace: &str, pred: F) -> Removal
    where
        F: Fn(&TransformerEntry) -> bool,
    {
        let Some(node) = self.node_mut(namespace) else {
            return Removal::default();
        };
        let before = node.transformers.len();
        node.transformers.retain(|e| !pred(e));
        let removed = before - node.transformers.len();

        let deleted = if removed > 0 {
            self.prune(namespace)
        } else {
            Vec::new()
        };
        Removal { removed, deleted }
    }

    /// Retires every dead entry in the tree in one sweep.
    pub(crate) fn reap(&mut self) -> ReapReport {
        let mut report = ReapReport::default();
        Self::reap_rec(&mut self.root, &mut report);
        Self::prune_all(&mut self.root, &mut report.deleted);
        report
    }

    fn reap_rec(node: &mut Node, report: &mut ReapReport) {
        let owner = node.path.clone();
        node.subscribers.retain(|e| {
            let dead = e.handle.is_dead();
            if dead {
                report.subscribers.push((owner.clone(), e.name.clone()));
            }
            !dead
        });
        node.transformers.retain(|e| {
            let dead = e.handle.strong_count() == 0;
            if dead {
                report.transformers.push((owner.clone(), e.name.clone()));
            }
            !dead
        });
        for child in node.children.values_mut() {
            Self::reap_rec(child, report);
        }
    }

    /// Drops every registration and signature record.
    pub(crate) fn clear(&mut self) {
        self.root = Node::new("".into());
    }

    /// Removes all transformer entries everywhere, pruning emptied nodes.
    pub(crate) fn clear_transformers(&mut self) -> Vec<Arc<str>> {
        Self::strip_transformers(&mut self.root);
        let mut deleted = Vec::new();
        Self::prune_all(&mut self.root, &mut deleted);
        deleted
    }

    fn strip_transformers(node: &mut Node) {
        node.transformers.clear();
        for child in node.children.values_mut() {
            Self::strip_transformers(child);
        }
    }

    // ---------------------------
    // Resolution
    // ---------------------------

    /// Snapshot of every subscriber matching an emission to `namespace`,
    /// ordered by `(priority desc, sequence asc)` across all matched nodes.
    pub(crate) fn resolve_subscribers(&self, namespace: &str) -> Vec<ResolvedSubscriber> {
        let mut out = Vec::new();
        for node in self.matched_nodes(namespace) {
            for e in &node.subscribers {
                out.push(ResolvedSubscriber {
                    handle: e.handle.clone(),
                    name: e.name.clone(),
                    priority: e.priority,
                    seq: e.seq,
                    flexible: e.flexible,
                    owner: node.path.clone(),
                    owner_signature: node.signature.clone(),
                });
            }
        }
        out.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.seq.cmp(&b.seq)));
        out
    }

    /// Snapshot of every transformer matching an emission to `namespace`,
    /// same resolution and ordering rule as subscribers.
    pub(crate) fn resolve_transformers(&self, namespace: &str) -> Vec<ResolvedTransformer> {
        let mut out = Vec::new();
        for node in self.matched_nodes(namespace) {
            for e in &node.transformers {
                out.push(ResolvedTransformer {
                    handle: e.handle.clone(),
                    name: e.name.clone(),
                    priority: e.priority,
                    seq: e.seq,
                    owner: node.path.clone(),
                });
            }
        }
        out.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.seq.cmp(&b.seq)));
        out
    }

    /// The literal node plus each strict-prefix ancestor's `*` child.
    ///
    /// A wildcard covers strictly the subtree below its registration level:
    /// `a.b.*` matches `a.b.c` and `a.b.c.d`, never `a.b` itself. The bare
    /// root wildcard `*` covers every path.
    fn matched_nodes(&self, namespace: &str) -> Vec<&Node> {
        let segs: Vec<&str> = path::segments(namespace).collect();
        let last = segs.len().saturating_sub(1);
        let mut matched = Vec::new();
        let mut node = &self.root;

        for (i, seg) in segs.iter().enumerate() {
            // The prefix's `*` child covers this path, unless that child IS
            // the literal target (emission to the wildcard path itself).
            let target_is_this_wildcard = i == last && *seg == path::WILDCARD;
            if !target_is_this_wildcard {
                if let Some(wild) = node.children.get(path::WILDCARD) {
                    matched.push(wild);
                }
            }

            match node.children.get(*seg) {
                Some(child) => node = child,
                None => return matched,
            }
            if i == last {
                matched.push(node);
            }
        }
        matched
    }

    // ---------------------------
    // Introspection
    // ---------------------------

    pub(crate) fn subscriber_count(&self, namespace: &str) -> usize {
        self.node(namespace).map_or(0, |n| n.subscribers.len())
    }

    pub(crate) fn live_subscriber_count(&self, namespace: &str) -> usize {
        self.node(namespace).map_or(0, |n| {
            n.subscribers.iter().filter(|e| !e.handle.is_dead()).count()
        })
    }

    pub(crate) fn transformer_count(&self, namespace: &str) -> usize {
        self.node(namespace).map_or(0, |n| n.transformers.len())
    }

    pub(crate) fn live_transformer_count(&self, namespace: &str) -> usize {
        self.node(namespace).map_or(0, |n| {
            n.transformers
                .iter()
                .filter(|e| e.handle.strong_count() > 0)
                .count()
        })
    }

    pub(crate) fn is_subscribed(&self, namespace: &str, callback: &Arc<dyn Subscribe>) -> bool {
        self.node(namespace).is_some_and(|n| {
            n.subscribers.iter().any(|e| e.handle.ptr_eq_sync(callback))
        })
    }

    pub(crate) fn is_async_subscribed(
        &self,
        namespace: &str,
        callback: &Arc<dyn SubscribeAsync>,
    ) -> bool {
        self.node(namespace).is_some_and(|n| {
            n.subscribers.iter().any(|e| e.handle.ptr_eq_async(callback))
        })
    }

    pub(crate) fn is_transformed(&self, namespace: &str, callback: &Arc<dyn Transform>) -> bool {
        self.node(namespace).is_some_and(|n| {
            n.transformers
                .iter()
                .any(|e| e.handle.ptr_eq(&Arc::downgrade(callback)))
        })
    }

    pub(crate) fn namespace_exists(&self, namespace: &str) -> bool {
        self.node(namespace).is_some()
    }

    /// Every existing node path (intermediate nodes included), sorted.
    pub(crate) fn namespaces(&self) -> Vec<String> {
        let mut out = Vec::new();
        Self::collect_paths(&self.root, &mut out);
        out.sort();
        out
    }

    fn collect_paths(node: &Node, out: &mut Vec<String>) {
        for child in node.children.values() {
            out.push(child.path.to_string());
            Self::collect_paths(child, out);
        }
    }

    /// Totals: `(namespaces, subscribers, live subscribers, transformers,
    /// live transformers)`.
    pub(crate) fn totals(&self) -> (usize, usize, usize, usize, usize) {
        let mut t = (0, 0, 0, 0, 0);
        Self::totals_rec(&self.root, true, &mut t);
        t
    }

    fn totals_rec(node: &Node, is_root: bool, t: &mut (usize, usize, usize, usize, usize)) {
        if !is_root {
            t.0 += 1;
            t.1 += node.subscribers.len();
            t.2 += node.subscribers.iter().filter(|e| !e.handle.is_dead()).count();
            t.3 += node.transformers.len();
            t.4 += node
                .transformers
                .iter()
                .filter(|e| e.handle.strong_count() > 0)
                .count();
        }
        for child in node.children.values() {
            Self::totals_rec(child, false, t);
        }
    }

    /// JSON snapshot of every node holding entries, keyed by dotted path.
    pub(crate) fn to_json(&self) -> Value {
        let mut map = serde_json::Map::new();
        Self::export_rec(&self.root, &mut map);
        Value::Object(map)
    }

    fn export_rec(node: &Node, out: &mut serde_json::Map<String, Value>) {
        if !node.subscribers.is_empty() || !node.transformers.is_empty() {
            let mut entry = serde_json::Map::new();
            if !node.subscribers.is_empty() {
                let subs: Vec<Value> = node
                    .subscribers
                    .iter()
                    .map(|e| {
                        Value::String(Self::entry_label(
                            &e.name,
                            e.priority,
                            e.handle.is_async(),
                            e.handle.is_dead(),
                        ))
                    })
                    .collect();
                entry.insert("subscribers".into(), Value::Array(subs));
            }
            if !node.transformers.is_empty() {
                let txs: Vec<Value> = node
                    .transformers
                    .iter()
                    .map(|e| {
                        Value::String(Self::entry_label(
                            &e.name,
                            e.priority,
                            false,
                            e.handle.strong_count() == 0,
                        ))
                    })
                    .collect();
                entry.insert("transformers".into(), Value::Array(txs));
            }
            out.insert(node.path.to_string(), Value::Object(entry));
        }

        let mut names: Vec<&String> = node.children.keys().collect();
        names.sort();
        for name in names {
            Self::export_rec(&node.children[name], out);
        }
    }

    fn entry_label(name: &str, priority: i32, is_async: bool, is_dead: bool) -> String {
        let mut label = name.to_string();
        if priority != 0 {
            label.push_str(&format!(" [priority={priority}]"));
        }
        if is_async {
            label.push_str(" [async]");
        }
        if is_dead {
            label.push_str(" [dead]");
        }
        label
    }

    // ---------------------------
    // Tree plumbing
    // ---------------------------

    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn node(&self, namespace: &str) -> Option<&Node> {
        let mut node = &self.root;
        for seg in path::segments(namespace) {
            node = node.children.get(seg)?;
        }
        Some(node)
    }

    fn node_mut(&mut self, namespace: &str) -> Option<&mut Node> {
        let mut node = &mut self.root;
        for seg in path::segments(namespace) {
            node = node.children.get_mut(seg)?;
        }
        Some(node)
    }

    /// Walks/creates nodes along `namespace`, reporting new paths in
    /// creation order (shallowest first).
    fn ensure(&mut self, namespace: &str) -> (&mut Node, Vec<Arc<str>>) {
        use std::collections::hash_map::Entry;

        let mut created = Vec::new();
        let mut node = &mut self.root;
        let mut prefix = String::with_capacity(namespace.len());

        for seg in path::segments(namespace) {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(seg);

            node = match node.children.entry(seg.to_string()) {
                Entry::Occupied(e) => e.into_mut(),
                Entry::Vacant(v) => {
                    let p: Arc<str> = prefix.as_str().into();
                    created.push(p.clone());
                    v.insert(Node::new(p))
                }
            };
        }
        (node, created)
    }

    /// Removes empty nodes along `namespace`, deepest first.
    fn prune(&mut self, namespace: &str) -> Vec<Arc<str>> {
        let segs: Vec<&str> = path::segments(namespace).collect();
        let mut deleted = Vec::new();
        Self::prune_rec(&mut self.root, &segs, &mut deleted);
        deleted
    }

    fn prune_rec(node: &mut Node, segs: &[&str], deleted: &mut Vec<Arc<str>>) {
        let Some((head, rest)) = segs.split_first() else {
            return;
        };
        let mut drop_child = None;
        if let Some(child) = node.children.get_mut(*head) {
            Self::prune_rec(child, rest, deleted);
            if child.is_empty() {
                drop_child = Some(child.path.clone());
            }
        }
        if let Some(p) = drop_child {
            node.children.remove(*head);
            deleted.push(p);
        }
    }

    /// Removes every empty node in the tree, deepest first.
    fn prune_all(node: &mut Node, deleted: &mut Vec<Arc<str>>) {
        let mut empty = Vec::new();
        for (name, child) in node.children.iter_mut() {
            Self::prune_all(child, deleted);
            if child.is_empty() {
                empty.push((name.clone(), child.path.clone()));
            }
        }
        for (name, p) in empty {
            node.children.remove(&name);
            deleted.push(p);
        }
    }
}
