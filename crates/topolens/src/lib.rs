// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # topolens - REST introspection for emulated networks
//!
//! Serves a read-only JSON view of a live emulated network (hosts,
//! switches, controllers, links) over HTTP, so tooling can inspect a
//! headless emulation without attaching to its control process.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use topolens::Topology;
//!
//! let topo = Topology::new();
//! topo.add_host("h1").unwrap();
//! topo.add_switch("s1").unwrap();
//! topo.add_link("h1", "s1").unwrap();
//!
//! // Returns immediately; the listener runs on its own thread.
//! let mut server = topolens::start(Arc::new(topo.clone()), 8080);
//! server.wait_ready(Duration::from_secs(1)).ok();
//!
//! // The emulation keeps mutating the model while the API serves it.
//! topo.add_host("h2").unwrap();
//! server.stop();
//! ```
//!
//! ## Endpoints
//!
//! | Path (full / minimal) | Body |
//! |------|------|
//! | `/api/v1/nodes` / `/nodes` | `{"nodes": ["h1", "s1", "c0"]}` |
//! | `/api/v1/switches` / `/switches` | `{"switches": ["s1"]}` |
//! | `/api/v1/hosts` / `/hosts` | `{"hosts": ["h1"]}` |
//! | `/api/v1/controllers` / `/controllers` | `{"controllers": ["c0"]}` |
//! | `/api/v1/links` / `/links` | `{"links": [["h1-eth0", "s1-eth1"]]}` |
//! | `/api/v1/topology` | all of the above in one object |
//! | `/api/v1/info` | service name, version and endpoint list |
//!
//! Unknown paths answer 404. A handler result that is not a JSON object
//! answers 500 with `{"error": "could not create json response"}`.

pub mod config;
pub mod handlers;
pub mod model;
pub mod response;
pub mod routes;
pub mod server;
pub mod snapshot;
pub mod view;

pub use config::{ConfigError, ServerConfig, DEFAULT_PORT};
pub use model::{Link, ModelError, Node, NodeKind, Topology};
pub use response::{
    HandlerResult, JsonMap, MalformedResult, ResponseBuilder, ResponseEnvelope, MALFORMED_BODY,
};
pub use routes::{RouteSet, RouteTable, API_PREFIX};
pub use server::{RestServer, ServerError, ServerHandle, ServerState};
pub use snapshot::NetworkSnapshot;
pub use view::{SharedView, TopologyView};

/// Start the full API surface on `0.0.0.0:port` with default settings.
///
/// Returns without waiting for the listener; a bind failure is logged and
/// shows up as [`ServerState::Failed`] on the handle.
pub fn start(view: SharedView, port: u16) -> ServerHandle {
    RestServer::new(ServerConfig::with_port(port)).start(view)
}
