//! Transport acquisition.
//!
//! A [`ClientSource`] hands the engine a `reqwest::Client` for each call.
//! `reqwest::Client` is reference counted, so handing out clones shares one
//! connection pool.

use std::sync::Arc;

use reqwest::Client;

use rk_core::error::RkResult;

use crate::registry::ClientRegistry;

/// Supplies the HTTP client used for a single call.
pub trait ClientSource: Send + Sync {
    fn client(&self) -> RkResult<Client>;
}

/// Always returns the same pre-built client.
#[derive(Debug, Clone)]
pub struct FixedClient {
    client: Client,
}

impl FixedClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl ClientSource for FixedClient {
    fn client(&self) -> RkResult<Client> {
        Ok(self.client.clone())
    }
}

/// Resolves a named client from a [`ClientRegistry`] on every call.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    registry: Arc<ClientRegistry>,
    name: String,
}

impl RegistryClient {
    pub fn new(registry: Arc<ClientRegistry>, name: impl Into<String>) -> Self {
        Self {
            registry,
            name: name.into(),
        }
    }

    /// Name of the client this source resolves.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ClientSource for RegistryClient {
    fn client(&self) -> RkResult<Client> {
        self.registry.create_client(&self.name)
    }
}
