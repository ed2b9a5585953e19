//! Named HTTP client registration.
//!
//! Each registered client is a `reqwest::Client` carrying the default
//! `Accept: application/json` and `User-Agent: <name>/<version>` headers.
//! Build the registry up front, then share it behind an `Arc`.

use std::collections::HashMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use tracing::debug;

use rk_core::config::ClientConfig;
use rk_core::constants::{self, JSON_MEDIA_TYPE};
use rk_core::error::{RkError, RkResult};

/// Options for a single registration beyond name and version.
#[derive(Debug, Clone, Default)]
pub struct RegistrationOptions {
    /// Additional default headers sent with every request.
    pub default_headers: Vec<(String, String)>,
    /// Accept invalid TLS certificates.
    pub accept_invalid_certs: bool,
}

/// Registry of named, pre-configured HTTP clients.
#[derive(Debug, Clone, Default)]
pub struct ClientRegistry {
    clients: HashMap<String, Client>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client under `name` with the default JSON headers.
    pub fn register(&mut self, name: &str, version: &str) -> RkResult<&mut Self> {
        self.register_with(name, version, RegistrationOptions::default())
    }

    /// Register a client under `name` with extra options.
    ///
    /// Registering an existing name replaces the previous client.
    pub fn register_with(
        &mut self,
        name: &str,
        version: &str,
        options: RegistrationOptions,
    ) -> RkResult<&mut Self> {
        if name.trim().is_empty() {
            return Err(RkError::invalid_argument("client name must not be empty"));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_MEDIA_TYPE));
        headers.insert(USER_AGENT, header_value(&constants::user_agent(name, version))?);
        for (key, value) in &options.default_headers {
            let key = HeaderName::try_from(key.as_str())
                .map_err(|e| RkError::invalid_argument(format!("invalid header name {key}: {e}")))?;
            headers.insert(key, header_value(value)?);
        }

        let mut builder = Client::builder().default_headers(headers);
        if options.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder
            .build()
            .map_err(|e| RkError::Http(format!("failed to build HTTP client: {e}")))?;

        debug!("registered http client {name} ({version})");
        self.clients.insert(name.to_string(), client);
        Ok(self)
    }

    /// Build a registry holding the single client described by `config`.
    pub fn from_config(config: &ClientConfig) -> RkResult<Self> {
        let mut registry = Self::new();
        let options = RegistrationOptions {
            default_headers: config
                .default_headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            accept_invalid_certs: config.accept_invalid_certs,
        };
        registry.register_with(&config.name, &config.version, options)?;
        Ok(registry)
    }

    /// Get the client registered under `name`.
    pub fn create_client(&self, name: &str) -> RkResult<Client> {
        self.clients
            .get(name)
            .cloned()
            .ok_or_else(|| RkError::invalid_argument(format!("no http client registered as {name}")))
    }

    /// Registered client names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.clients.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn header_value(value: &str) -> RkResult<HeaderValue> {
    HeaderValue::try_from(value)
        .map_err(|e| RkError::invalid_argument(format!("invalid header value: {e}")))
}
