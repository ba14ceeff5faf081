// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Graceful stop with requests still in flight.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use topolens::{Link, RestServer, ServerConfig, ServerHandle, ServerState, TopologyView};

const READY_TIMEOUT: Duration = Duration::from_secs(5);

/// View whose host listing takes `delay` to answer.
struct SlowView {
    delay: Duration,
}

impl TopologyView for SlowView {
    fn list_hosts(&self) -> Vec<String> {
        thread::sleep(self.delay);
        vec!["h1".into()]
    }

    fn list_switches(&self) -> Vec<String> {
        Vec::new()
    }

    fn list_controllers(&self) -> Vec<String> {
        Vec::new()
    }

    fn list_links(&self) -> Vec<Link> {
        Vec::new()
    }
}

fn start_slow(delay: Duration, grace_ms: u64) -> (ServerHandle, String) {
    let config = ServerConfig {
        port: 0,
        shutdown_grace_ms: grace_ms,
        ..Default::default()
    };
    let server = RestServer::new(config).start(Arc::new(SlowView { delay }));
    let addr = server.wait_ready(READY_TIMEOUT).expect("listener ready");
    let url = format!("http://127.0.0.1:{}/api/v1/hosts", addr.port());
    (server, url)
}

fn spawn_get(url: String) -> thread::JoinHandle<Result<(u16, String), reqwest::Error>> {
    thread::spawn(move || {
        let client = reqwest::blocking::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(10))
            .build()?;
        let response = client.get(url).send()?;
        let status = response.status().as_u16();
        Ok((status, response.text()?))
    })
}

#[test]
fn test_stop_lets_inflight_request_finish() {
    let (mut server, url) = start_slow(Duration::from_millis(800), 5_000);

    let request = spawn_get(url);
    thread::sleep(Duration::from_millis(200));
    server.stop();
    assert_eq!(server.state(), ServerState::Stopped);

    let (status, body) = request
        .join()
        .expect("client thread")
        .expect("in-flight request completes");
    assert_eq!(status, 200);
    assert_eq!(body, r#"{"hosts": ["h1"]}"#);
}

#[test]
fn test_stop_is_bounded_by_grace_period() {
    let (mut server, url) = start_slow(Duration::from_millis(3_000), 200);

    let request = spawn_get(url);
    thread::sleep(Duration::from_millis(200));

    let started = Instant::now();
    server.stop();
    let elapsed = started.elapsed();

    assert_eq!(server.state(), ServerState::Stopped);
    assert!(
        elapsed < Duration::from_millis(1_500),
        "stop took {:?} with a 200ms grace period",
        elapsed
    );

    // The abandoned request may or may not get an answer; only the client
    // thread has to come back.
    let _ = request.join().expect("client thread");
}
