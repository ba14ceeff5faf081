// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Route table: fixed mapping from URL path to handler.
//!
//! A [`RouteTable`] is built once from a [`RouteSet`] and consumed by
//! [`RouteTable::into_router`] before the listener accepts anything, so the
//! set of routes cannot change while serving. Paths outside the table get
//! axum's default 404; non-GET methods on a known path get its 405.

use crate::handlers::{self, AppState};
use crate::response::{HandlerResult, ResponseBuilder};
use crate::view::SharedView;
use axum::{extract::State, http::StatusCode, routing::get, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Prefix of the versioned API surface.
pub const API_PREFIX: &str = "/api/v1/";

/// Which API surface to expose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteSet {
    /// Versioned endpoints under `/api/v1/`, plus `topology` and `info`.
    #[default]
    Full,
    /// The five core endpoints, unprefixed.
    Minimal,
}

impl RouteSet {
    pub fn prefix(self) -> &'static str {
        match self {
            RouteSet::Full => API_PREFIX,
            RouteSet::Minimal => "/",
        }
    }
}

/// Handler signature shared by every route.
pub type Handler = fn(&AppState) -> HandlerResult;

const CORE_ROUTES: [(&str, Handler); 5] = [
    ("nodes", handlers::nodes),
    ("switches", handlers::switches),
    ("hosts", handlers::hosts),
    ("controllers", handlers::controllers),
    ("links", handlers::links),
];

const EXTRA_ROUTES: [(&str, Handler); 2] = [
    ("topology", handlers::topology),
    ("info", handlers::info),
];

/// A single GET route.
#[derive(Clone)]
pub struct Route {
    path: String,
    handler: Handler,
}

impl Route {
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Static path -> handler mapping.
#[derive(Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(set: RouteSet) -> Self {
        let prefix = set.prefix();
        let extra: &[(&str, Handler)] = match set {
            RouteSet::Full => &EXTRA_ROUTES,
            RouteSet::Minimal => &[],
        };

        let routes = CORE_ROUTES
            .iter()
            .chain(extra)
            .map(|&(name, handler)| Route {
                path: format!("{}{}", prefix, name),
                handler,
            })
            .collect();

        Self { routes }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn paths(&self) -> Vec<String> {
        self.routes.iter().map(|r| r.path.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Run the handler registered for `path` directly, bypassing HTTP.
    pub fn dispatch(&self, path: &str, state: &AppState) -> Option<HandlerResult> {
        self.routes
            .iter()
            .find(|r| r.path == path)
            .map(|r| (r.handler)(state))
    }

    /// Bind every route into an axum router reading from `view`.
    pub fn into_router(self, view: SharedView) -> Router {
        let state = Arc::new(AppState::new(view, self.paths()));

        let mut router = Router::new();
        for route in self.routes {
            let handler = route.handler;
            router = router.route(
                &route.path,
                get(move |State(state): State<Arc<AppState>>| async move {
                    ResponseBuilder::build(handler(&state), StatusCode::OK)
                }),
            );
        }

        router.with_state(state)
    }
}
