//! Mock S3 endpoint startup for wire-level tests.
//!
//! Some sandboxes refuse loopback sockets. Tests that need a mock endpoint
//! then skip, unless `CLUG_REQUIRE_SOCKET_TESTS` is set to a truthy value,
//! in which case they fail.

use std::net::{Ipv4Addr, TcpListener};

use wiremock::MockServer;

const REQUIRE_SOCKETS_ENV: &str = "CLUG_REQUIRE_SOCKET_TESTS";

fn socket_tests_required() -> bool {
    std::env::var(REQUIRE_SOCKETS_ENV).is_ok_and(|value| {
        matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn loopback_available() -> bool {
    TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).is_ok()
}

/// Starts a mock S3 endpoint, or returns `None` when loopback sockets are
/// unavailable and skipping is allowed.
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    if loopback_available() {
        return Some(MockServer::start().await);
    }

    let test = std::thread::current()
        .name()
        .unwrap_or("<unnamed test>")
        .to_string();
    assert!(
        !socket_tests_required(),
        "{test}: no loopback socket for the mock S3 endpoint and {REQUIRE_SOCKETS_ENV} is set"
    );
    eprintln!(
        "{test}: skipped, no loopback socket for the mock S3 endpoint (set {REQUIRE_SOCKETS_ENV}=1 to fail instead)"
    );
    None
}
