// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Topology records and an in-memory live model.
//!
//! [`Node`] and [`Link`] are the records the REST layer reports. [`Topology`]
//! is a cloneable, thread-safe model that an emulation driver can mutate
//! while the server reads it through [`TopologyView`].

use crate::view::TopologyView;
use parking_lot::RwLock;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Kind of a topology node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Host,
    Switch,
    Controller,
}

impl NodeKind {
    /// First interface index handed out for this kind. Switch ports are
    /// numbered from 1.
    fn first_port(self) -> u32 {
        match self {
            NodeKind::Host => 0,
            NodeKind::Switch => 1,
            NodeKind::Controller => 0,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NodeKind::Host => "host",
            NodeKind::Switch => "switch",
            NodeKind::Controller => "controller",
        };
        f.write_str(label)
    }
}

/// A named node in the topology.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
}

/// An undirected link, reported as its two endpoint interface names.
///
/// Serializes as a two-element array: `["h1-eth0", "s1-eth1"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link {
    intf1: String,
    intf2: String,
}

impl Link {
    pub fn new(intf1: impl Into<String>, intf2: impl Into<String>) -> Self {
        Self {
            intf1: intf1.into(),
            intf2: intf2.into(),
        }
    }

    pub fn intf1(&self) -> &str {
        &self.intf1
    }

    pub fn intf2(&self) -> &str {
        &self.intf2
    }

    /// Both interface names as a tuple.
    pub fn endpoints(&self) -> (&str, &str) {
        (&self.intf1, &self.intf2)
    }
}

impl Serialize for Link {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.intf1, &self.intf2).serialize(serializer)
    }
}

/// Model mutation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("node '{0}' already exists")]
    DuplicateNode(String),

    #[error("unknown node '{0}'")]
    UnknownNode(String),

    #[error("node '{0}' cannot carry a data-plane link")]
    InvalidEndpoint(String),
}

#[derive(Debug)]
struct NodeEntry {
    node: Node,
    next_port: u32,
}

#[derive(Debug)]
struct LinkEntry {
    node1: String,
    node2: String,
    link: Link,
}

impl LinkEntry {
    fn touches(&self, name: &str) -> bool {
        self.node1 == name || self.node2 == name
    }

    fn joins(&self, a: &str, b: &str) -> bool {
        (self.node1 == a && self.node2 == b) || (self.node1 == b && self.node2 == a)
    }
}

#[derive(Debug, Default)]
struct TopologyInner {
    nodes: Vec<NodeEntry>,
    links: Vec<LinkEntry>,
}

impl TopologyInner {
    fn find(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|e| e.node.name == name)
    }

    fn names_of(&self, kind: NodeKind) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|e| e.node.kind == kind)
            .map(|e| e.node.name.clone())
            .collect()
    }

    /// Allocate the next interface name on a node, e.g. `s1-eth3`.
    fn allocate_intf(&mut self, index: usize) -> String {
        let entry = &mut self.nodes[index];
        let intf = format!("{}-eth{}", entry.node.name, entry.next_port);
        entry.next_port += 1;
        intf
    }
}

/// In-memory live topology.
///
/// Clones share the same underlying model. Every accessor takes the lock
/// only for the duration of the copy, so readers never observe a
/// half-applied mutation and never hold the lock across I/O.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    inner: Arc<RwLock<TopologyInner>>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_host(&self, name: impl Into<String>) -> Result<Node, ModelError> {
        self.add_node(name.into(), NodeKind::Host)
    }

    pub fn add_switch(&self, name: impl Into<String>) -> Result<Node, ModelError> {
        self.add_node(name.into(), NodeKind::Switch)
    }

    pub fn add_controller(&self, name: impl Into<String>) -> Result<Node, ModelError> {
        self.add_node(name.into(), NodeKind::Controller)
    }

    fn add_node(&self, name: String, kind: NodeKind) -> Result<Node, ModelError> {
        let mut inner = self.inner.write();
        if inner.find(&name).is_some() {
            return Err(ModelError::DuplicateNode(name));
        }
        let node = Node { name, kind };
        inner.nodes.push(NodeEntry {
            node: node.clone(),
            next_port: kind.first_port(),
        });
        Ok(node)
    }

    /// Connect two nodes, allocating one new interface on each side.
    pub fn add_link(&self, a: &str, b: &str) -> Result<Link, ModelError> {
        let mut inner = self.inner.write();
        let ia = inner
            .find(a)
            .ok_or_else(|| ModelError::UnknownNode(a.to_string()))?;
        let ib = inner
            .find(b)
            .ok_or_else(|| ModelError::UnknownNode(b.to_string()))?;
        for index in [ia, ib] {
            let node = &inner.nodes[index].node;
            if node.kind == NodeKind::Controller {
                return Err(ModelError::InvalidEndpoint(node.name.clone()));
            }
        }

        let intf1 = inner.allocate_intf(ia);
        let intf2 = inner.allocate_intf(ib);
        let link = Link::new(intf1, intf2);
        inner.links.push(LinkEntry {
            node1: a.to_string(),
            node2: b.to_string(),
            link: link.clone(),
        });
        Ok(link)
    }

    /// Remove a node and every link attached to it.
    pub fn remove_node(&self, name: &str) -> bool {
        let mut inner = self.inner.write();
        let Some(index) = inner.find(name) else {
            return false;
        };
        inner.nodes.remove(index);
        inner.links.retain(|l| !l.touches(name));
        true
    }

    /// Remove the oldest link between two nodes, in either direction.
    pub fn remove_link(&self, a: &str, b: &str) -> bool {
        let mut inner = self.inner.write();
        match inner.links.iter().position(|l| l.joins(a, b)) {
            Some(index) => {
                inner.links.remove(index);
                true
            }
            None => false,
        }
    }

    /// All nodes with their kinds, in insertion order.
    pub fn nodes(&self) -> Vec<Node> {
        self.inner.read().nodes.iter().map(|e| e.node.clone()).collect()
    }

    pub fn node(&self, name: &str) -> Option<Node> {
        let inner = self.inner.read();
        inner.find(name).map(|i| inner.nodes[i].node.clone())
    }

    pub fn node_count(&self) -> usize {
        self.inner.read().nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.inner.read().links.len()
    }

    /// Drop every node and link.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.nodes.clear();
        inner.links.clear();
    }
}

impl TopologyView for Topology {
    fn list_hosts(&self) -> Vec<String> {
        self.inner.read().names_of(NodeKind::Host)
    }

    fn list_switches(&self) -> Vec<String> {
        self.inner.read().names_of(NodeKind::Switch)
    }

    fn list_controllers(&self) -> Vec<String> {
        self.inner.read().names_of(NodeKind::Controller)
    }

    fn list_links(&self) -> Vec<Link> {
        self.inner
            .read()
            .links
            .iter()
            .map(|l| l.link.clone())
            .collect()
    }

    fn list_nodes(&self) -> Vec<String> {
        // One lock for all three kinds so the list is self-consistent.
        let inner = self.inner.read();
        let mut nodes = inner.names_of(NodeKind::Host);
        nodes.extend(inner.names_of(NodeKind::Switch));
        nodes.extend(inner.names_of(NodeKind::Controller));
        nodes
    }
}
