//! Skips wiremock-backed tests when the sandbox cannot bind a local socket.

use std::net::TcpListener;
use std::panic::Location;

use wiremock::MockServer;

const REQUIRE_ENV: &str = "BULKFETCH_REQUIRE_SOCKET_TESTS";

/// True when `BULKFETCH_REQUIRE_SOCKET_TESTS` asks for a hard failure
/// instead of a skip.
#[must_use]
pub fn socket_tests_required() -> bool {
    std::env::var(REQUIRE_ENV)
        .ok()
        .is_some_and(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

#[track_caller]
#[must_use]
pub fn should_skip_socket_bound_test() -> bool {
    if TcpListener::bind("127.0.0.1:0").is_ok() {
        return false;
    }

    let location = Location::caller();
    let message = format!(
        "[socket-bound-test] cannot bind localhost socket at {}:{}; mock HTTP server unavailable",
        location.file(),
        location.line()
    );
    assert!(
        !socket_tests_required(),
        "{message}. Set {REQUIRE_ENV}=0 to allow skipping."
    );

    eprintln!("{message}. Skipping test. Set {REQUIRE_ENV}=1 to fail instead.");
    true
}

/// Starts a mock server, or returns `None` after logging why the test is
/// being skipped.
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    if should_skip_socket_bound_test() {
        None
    } else {
        Some(MockServer::start().await)
    }
}
