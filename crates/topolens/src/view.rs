// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Read accessor over a live network model.
//!
//! The emulation engine owns the topology and mutates it from its own
//! threads. The REST layer only ever sees it through [`TopologyView`], which
//! returns owned copies so no borrow of the model outlives a single call.

use crate::model::Link;
use std::sync::Arc;

/// Point-in-time enumeration of a live topology.
///
/// Implementations must not mutate the model and must not block
/// indefinitely. Each call is independent: two calls made back to back may
/// observe different states if the model changed in between.
pub trait TopologyView: Send + Sync {
    /// Names of hosts, in the model's iteration order.
    fn list_hosts(&self) -> Vec<String>;

    /// Names of switches, in the model's iteration order.
    fn list_switches(&self) -> Vec<String>;

    /// Names of controllers, in the model's iteration order.
    fn list_controllers(&self) -> Vec<String>;

    /// Links as interface-name pairs, in registration order.
    fn list_links(&self) -> Vec<Link>;

    /// Every node name.
    ///
    /// Defaults to hosts, then switches, then controllers. Models with their
    /// own notion of iteration order should override this.
    fn list_nodes(&self) -> Vec<String> {
        let mut nodes = self.list_hosts();
        nodes.extend(self.list_switches());
        nodes.extend(self.list_controllers());
        nodes
    }
}

/// Shared, type-erased view handed to the server at construction.
pub type SharedView = Arc<dyn TopologyView>;

impl<T: TopologyView + ?Sized> TopologyView for Arc<T> {
    fn list_hosts(&self) -> Vec<String> {
        (**self).list_hosts()
    }

    fn list_switches(&self) -> Vec<String> {
        (**self).list_switches()
    }

    fn list_controllers(&self) -> Vec<String> {
        (**self).list_controllers()
    }

    fn list_links(&self) -> Vec<Link> {
        (**self).list_links()
    }

    fn list_nodes(&self) -> Vec<String> {
        (**self).list_nodes()
    }
}
