// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! REST server lifecycle.
//!
//! [`RestServer::start`] spawns a dedicated worker thread that owns its own
//! tokio runtime and the listener, then returns a [`ServerHandle`] right
//! away. A bind failure is logged and recorded in the handle's state; it is
//! never returned to the caller of `start` and never brings the process
//! down.

use crate::config::ServerConfig;
use crate::routes::RouteTable;
use crate::view::SharedView;
use axum::Router;
use parking_lot::{Condvar, Mutex};
use std::future::IntoFuture;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::net::{TcpListener, TcpSocket};
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

const LISTEN_BACKLOG: u32 = 1024;
const WORKER_THREADS: usize = 2;

/// Server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("failed to build runtime: {0}")]
    Runtime(#[source] io::Error),

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("HTTP server error: {0}")]
    Serve(#[source] io::Error),

    #[error("listener failed to start: {0}")]
    Startup(String),

    #[error("listener not ready after {0:?}")]
    Timeout(Duration),

    #[error("server stopped")]
    Stopped,
}

/// Listener lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerState {
    NotStarted,
    Listening(SocketAddr),
    Failed(String),
    Stopped,
}

/// State shared between the handle and the worker thread.
#[derive(Debug)]
struct Lifecycle {
    state: Mutex<ServerState>,
    changed: Condvar,
}

impl Lifecycle {
    fn new() -> Self {
        Self {
            state: Mutex::new(ServerState::NotStarted),
            changed: Condvar::new(),
        }
    }

    fn get(&self) -> ServerState {
        self.state.lock().clone()
    }

    fn set(&self, state: ServerState) {
        *self.state.lock() = state;
        self.changed.notify_all();
    }

    fn fail(&self, err: &ServerError) {
        error!("[rest] {}", err);
        self.set(ServerState::Failed(err.to_string()));
    }

    /// Listening -> Stopped; a failed state is kept as is.
    fn finish(&self) {
        let mut state = self.state.lock();
        if matches!(*state, ServerState::NotStarted | ServerState::Listening(_)) {
            *state = ServerState::Stopped;
        }
        drop(state);
        self.changed.notify_all();
    }

    fn wait_started(&self, timeout: Duration) -> ServerState {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        while *state == ServerState::NotStarted {
            if self.changed.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }
        state.clone()
    }
}

/// REST server, configured but not yet listening.
pub struct RestServer {
    config: ServerConfig,
    table: RouteTable,
}

impl RestServer {
    pub fn new(config: ServerConfig) -> Self {
        let table = RouteTable::new(config.route_set);
        Self { config, table }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn routes(&self) -> &RouteTable {
        &self.table
    }

    /// Bind the route table and start listening on `0.0.0.0:port` from a
    /// dedicated thread. Never blocks and never fails; see
    /// [`ServerHandle::state`] for the outcome.
    pub fn start(self, view: SharedView) -> ServerHandle {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.config.port));
        let grace = self.config.shutdown_grace();
        let router = build_router(self.table, view, self.config.cors);

        let lifecycle = Arc::new(Lifecycle::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let worker_lifecycle = lifecycle.clone();
        let spawned = thread::Builder::new()
            .name("topolens-http".to_string())
            .spawn(move || run_worker(addr, router, grace, shutdown_rx, worker_lifecycle));

        let worker = match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                lifecycle.fail(&ServerError::Spawn(e));
                None
            }
        };

        ServerHandle {
            lifecycle,
            shutdown: shutdown_tx,
            worker,
        }
    }
}

/// Control handle for a started server.
///
/// Dropping the handle stops the server. Do not drop or stop it from inside
/// a request handler: stopping joins the worker thread.
pub struct ServerHandle {
    lifecycle: Arc<Lifecycle>,
    shutdown: watch::Sender<bool>,
    worker: Option<thread::JoinHandle<()>>,
}

impl ServerHandle {
    pub fn state(&self) -> ServerState {
        self.lifecycle.get()
    }

    pub fn is_listening(&self) -> bool {
        matches!(self.state(), ServerState::Listening(_))
    }

    /// Bound address, once listening.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match self.state() {
            ServerState::Listening(addr) => Some(addr),
            _ => None,
        }
    }

    /// Block until the listener is up or has failed, for at most `timeout`.
    pub fn wait_ready(&self, timeout: Duration) -> Result<SocketAddr, ServerError> {
        match self.lifecycle.wait_started(timeout) {
            ServerState::Listening(addr) => Ok(addr),
            ServerState::NotStarted => Err(ServerError::Timeout(timeout)),
            ServerState::Failed(reason) => Err(ServerError::Startup(reason)),
            ServerState::Stopped => Err(ServerError::Stopped),
        }
    }

    /// Stop accepting, let in-flight requests finish within the grace
    /// period, and join the worker. Calling it again is a no-op.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        let _ = self.shutdown.send(true);
        if worker.join().is_err() {
            warn!("[rest] worker thread panicked");
        }
        self.lifecycle.finish();
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn build_router(table: RouteTable, view: SharedView, cors: bool) -> Router {
    let mut router = table.into_router(view).layer(TraceLayer::new_for_http());
    if cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }
    router
}

fn create_listener(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = TcpSocket::new_v4()?;
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(LISTEN_BACKLOG)
}

fn run_worker(
    addr: SocketAddr,
    router: Router,
    grace: Duration,
    shutdown: watch::Receiver<bool>,
    lifecycle: Arc<Lifecycle>,
) {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(WORKER_THREADS)
        .thread_name("topolens-http-rt")
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            lifecycle.fail(&ServerError::Runtime(e));
            return;
        }
    };

    runtime.block_on(serve(addr, router, grace, shutdown, &lifecycle));
    // A handler still running past the grace period must not hold up stop.
    runtime.shutdown_background();
    lifecycle.finish();
}

async fn serve(
    addr: SocketAddr,
    router: Router,
    grace: Duration,
    shutdown: watch::Receiver<bool>,
    lifecycle: &Lifecycle,
) {
    let listener = match create_listener(addr) {
        Ok(listener) => listener,
        Err(source) => {
            lifecycle.fail(&ServerError::Bind { addr, source });
            return;
        }
    };
    let local = listener.local_addr().unwrap_or(addr);
    lifecycle.set(ServerState::Listening(local));
    info!("[rest] listening on http://{}", local);

    let mut graceful_rx = shutdown.clone();
    let server = axum::serve(listener, router)
        .with_graceful_shutdown(async move { wait_for_stop(&mut graceful_rx).await })
        .into_future();
    let mut server = std::pin::pin!(server);

    let mut stop_rx = shutdown;
    let result = tokio::select! {
        result = &mut server => result,
        _ = wait_for_stop(&mut stop_rx) => {
            info!("[rest] stop requested, draining connections");
            match tokio::time::timeout(grace, &mut server).await {
                Ok(result) => result,
                Err(_) => {
                    warn!("[rest] grace period of {:?} elapsed, dropping open connections", grace);
                    Ok(())
                }
            }
        }
    };

    match result {
        Ok(()) => info!("[rest] listener on {} stopped", local),
        Err(e) => error!("[rest] {}", ServerError::Serve(e)),
    }
}

/// Resolves once a stop is requested or the handle is gone.
async fn wait_for_stop(rx: &mut watch::Receiver<bool>) {
    while !*rx.borrow_and_update() {
        if rx.changed().await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Topology;

    fn start_ephemeral() -> ServerHandle {
        RestServer::new(ServerConfig::with_port(0)).start(Arc::new(Topology::new()))
    }

    #[test]
    fn test_start_and_stop() {
        let mut handle = start_ephemeral();
        let addr = handle
            .wait_ready(Duration::from_secs(5))
            .expect("listener should start");
        assert_ne!(addr.port(), 0);
        assert!(handle.is_listening());
        assert_eq!(handle.local_addr(), Some(addr));

        handle.stop();
        assert_eq!(handle.state(), ServerState::Stopped);
        handle.stop();
        assert_eq!(handle.state(), ServerState::Stopped);
    }

    #[test]
    fn test_bind_failure_is_reported_not_raised() {
        let first = start_ephemeral();
        let addr = first.wait_ready(Duration::from_secs(5)).expect("first listener");

        let second = RestServer::new(ServerConfig::with_port(addr.port()))
            .start(Arc::new(Topology::new()));
        let err = second
            .wait_ready(Duration::from_secs(5))
            .expect_err("port already taken");
        assert!(matches!(err, ServerError::Startup(_)));
        assert!(matches!(second.state(), ServerState::Failed(_)));

        // The first listener is unaffected.
        assert!(first.is_listening());
    }

    #[test]
    fn test_failed_state_survives_stop() {
        let first = start_ephemeral();
        let addr = first.wait_ready(Duration::from_secs(5)).expect("first listener");

        let mut second = RestServer::new(ServerConfig::with_port(addr.port()))
            .start(Arc::new(Topology::new()));
        let _ = second.wait_ready(Duration::from_secs(5));
        second.stop();
        assert!(matches!(second.state(), ServerState::Failed(_)));
    }

    #[test]
    fn test_wait_ready_after_stop() {
        let mut handle = start_ephemeral();
        handle.wait_ready(Duration::from_secs(5)).expect("listener");
        handle.stop();
        assert!(matches!(
            handle.wait_ready(Duration::from_millis(10)),
            Err(ServerError::Stopped)
        ));
    }

    #[test]
    fn test_routes_follow_config() {
        let server = RestServer::new(ServerConfig {
            route_set: crate::routes::RouteSet::Minimal,
            ..Default::default()
        });
        assert_eq!(server.routes().len(), 5);
        assert_eq!(server.config().port, 8080);
    }
}
