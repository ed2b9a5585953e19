//! Shared test utilities for engine integration tests.
#![allow(dead_code)]

use reqwest::Client;
use rk_api::RestClient;
use wiremock::MockServer;

/// Start a mock server and a client whose base URI is `<server><base_path>`.
pub async fn start(base_path: &str) -> (MockServer, RestClient) {
    let server = MockServer::start().await;
    let client = client_for(&server, base_path);
    (server, client)
}

/// Build a direct-mode client against an already running mock server.
pub fn client_for(server: &MockServer, base_path: &str) -> RestClient {
    RestClient::with_client(Client::new(), &format!("{}{}", server.uri(), base_path))
        .expect("mock server uri should be a valid base")
}

/// A base URI on a local port nothing is listening on.
pub fn closed_port_uri() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("failed to bind");
    let port = listener.local_addr().expect("no local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}/api/")
}
