// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Route handlers.
//!
//! Handlers are plain synchronous functions: they read the topology through
//! [`AppState::view`] and return a keyed mapping. The route table wraps them
//! for axum and passes every result through
//! [`ResponseBuilder`](crate::response::ResponseBuilder).

use crate::response::{keyed, to_mapping, HandlerResult};
use crate::snapshot::NetworkSnapshot;
use crate::view::{SharedView, TopologyView};
use serde_json::json;

/// State shared by every route.
pub struct AppState {
    view: SharedView,
    endpoints: Vec<String>,
}

impl AppState {
    pub fn new(view: SharedView, endpoints: Vec<String>) -> Self {
        Self { view, endpoints }
    }

    pub fn view(&self) -> &dyn TopologyView {
        self.view.as_ref()
    }

    /// Paths registered in the active route table.
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }
}

/// GET nodes
pub fn nodes(state: &AppState) -> HandlerResult {
    keyed("nodes", state.view().list_nodes())
}

/// GET switches
pub fn switches(state: &AppState) -> HandlerResult {
    keyed("switches", state.view().list_switches())
}

/// GET hosts
pub fn hosts(state: &AppState) -> HandlerResult {
    keyed("hosts", state.view().list_hosts())
}

/// GET controllers
pub fn controllers(state: &AppState) -> HandlerResult {
    keyed("controllers", state.view().list_controllers())
}

/// GET links
pub fn links(state: &AppState) -> HandlerResult {
    keyed("links", state.view().list_links())
}

/// GET topology - every collection in one response
pub fn topology(state: &AppState) -> HandlerResult {
    to_mapping(&NetworkSnapshot::capture(state.view()))
}

/// GET info - service info
pub fn info(state: &AppState) -> HandlerResult {
    to_mapping(&json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "api_version": "v1",
        "endpoints": state.endpoints(),
    }))
}
