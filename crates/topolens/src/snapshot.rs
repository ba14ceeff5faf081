// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Request-scoped snapshot of a topology.
//!
//! Built fresh from a [`TopologyView`] for each request and dropped with the
//! response. Nothing here is cached.

use crate::model::Link;
use crate::view::TopologyView;
use serde::Serialize;

/// Point-in-time aggregate of every element of a topology.
///
/// Each field is read with its own accessor call, so a snapshot taken while
/// the model is mutating may mix states across fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NetworkSnapshot {
    pub nodes: Vec<String>,
    pub switches: Vec<String>,
    pub hosts: Vec<String>,
    pub controllers: Vec<String>,
    pub links: Vec<Link>,
}

impl NetworkSnapshot {
    /// Read every collection from `view`.
    pub fn capture(view: &dyn TopologyView) -> Self {
        Self {
            nodes: view.list_nodes(),
            switches: view.list_switches(),
            hosts: view.list_hosts(),
            controllers: view.list_controllers(),
            links: view.list_links(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Topology;

    #[test]
    fn test_capture_empty() {
        let snapshot = NetworkSnapshot::capture(&Topology::new());
        assert!(snapshot.is_empty());
        assert_eq!(snapshot, NetworkSnapshot::default());
    }

    #[test]
    fn test_capture_is_detached() {
        let topo = Topology::new();
        topo.add_host("h1").expect("add h1");
        topo.add_switch("s1").expect("add s1");
        topo.add_link("h1", "s1").expect("link");

        let snapshot = NetworkSnapshot::capture(&topo);
        topo.remove_node("s1");

        assert_eq!(snapshot.nodes, vec!["h1", "s1"]);
        assert_eq!(snapshot.links, vec![Link::new("h1-eth0", "s1-eth1")]);
        assert_eq!(NetworkSnapshot::capture(&topo).links.len(), 0);
    }

    #[test]
    fn test_field_order() {
        let json = serde_json::to_string(&NetworkSnapshot::default()).expect("serialize");
        assert_eq!(
            json,
            r#"{"nodes":[],"switches":[],"hosts":[],"controllers":[],"links":[]}"#
        );
    }
}
