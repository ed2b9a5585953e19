//! Request engine shared by all typed REST clients.
//!
//! `RestClient` owns a validated base URI and a bearer token, borrows an HTTP
//! client from its [`ClientSource`] for every call, and turns whatever comes
//! back into an [`Envelope`]. Call operations never fail: local errors are
//! reported as envelopes with status 444.

use std::fmt;
use std::sync::Arc;

use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Request, Response, StatusCode, Url};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, trace, warn, Level};

use rk_core::config::ClientConfig;
use rk_core::constants::{BEARER_SCHEME, JSON_CONTENT_TYPE};
use rk_core::error::{RkError, RkResult};

use crate::registry::ClientRegistry;
use crate::response::Envelope;
use crate::source::{ClientSource, FixedClient, RegistryClient};
use crate::status::{StatusPolicy, StatusTable};

/// How to handle the Authorization header when no token is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyTokenPolicy {
    /// Send `Authorization: Bearer ` with an empty credential.
    #[default]
    Send,
    /// Leave the Authorization header off the request.
    Omit,
}

/// Base REST client.
///
/// Clones share the auth token: updating it through one clone is visible to
/// the others on their next call.
#[derive(Clone)]
pub struct RestClient {
    source: Arc<dyn ClientSource>,
    base_uri: Url,
    auth_token: Arc<RwLock<Option<String>>>,
    empty_token: EmptyTokenPolicy,
    status_table: StatusTable,
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("base_uri", &self.base_uri.as_str())
            .field("empty_token", &self.empty_token)
            .field("status_table", &self.status_table)
            .finish_non_exhaustive()
    }
}

impl RestClient {
    /// Create a client that obtains its transport from `source`.
    ///
    /// Fails with `InvalidArgument` unless `base_uri` is a well-formed
    /// absolute URI that can serve as a base.
    pub fn new(source: Arc<dyn ClientSource>, base_uri: &str) -> RkResult<Self> {
        let base_uri = parse_base_uri(base_uri)?;
        Ok(Self {
            source,
            base_uri,
            auth_token: Arc::new(RwLock::new(None)),
            empty_token: EmptyTokenPolicy::default(),
            status_table: StatusTable::default(),
        })
    }

    /// Create a client bound to a single pre-built `reqwest::Client`.
    pub fn with_client(client: Client, base_uri: &str) -> RkResult<Self> {
        Self::new(Arc::new(FixedClient::new(client)), base_uri)
    }

    /// Create a client that resolves the client registered as `name`.
    pub fn from_registry(
        registry: Arc<ClientRegistry>,
        name: &str,
        base_uri: &str,
    ) -> RkResult<Self> {
        Self::new(Arc::new(RegistryClient::new(registry, name)), base_uri)
    }

    /// Create a client from configuration, registering its named client.
    pub fn from_config(config: &ClientConfig) -> RkResult<Self> {
        let registry = Arc::new(ClientRegistry::from_config(config)?);
        let policy = if config.omit_empty_token {
            EmptyTokenPolicy::Omit
        } else {
            EmptyTokenPolicy::Send
        };
        let mut client = Self::from_registry(registry, &config.name, &config.base_uri)?
            .with_empty_token_policy(policy);
        if let Some(ref token) = config.auth_token {
            client = client.with_auth_token(token.clone());
        }
        Ok(client)
    }

    /// Set the initial auth token.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Arc::new(RwLock::new(Some(token.into())));
        self
    }

    pub fn with_empty_token_policy(mut self, policy: EmptyTokenPolicy) -> Self {
        self.empty_token = policy;
        self
    }

    /// Replace the status dispatch table.
    pub fn with_status_table(mut self, table: StatusTable) -> Self {
        self.status_table = table;
        self
    }

    pub fn base_uri(&self) -> &Url {
        &self.base_uri
    }

    /// Replace the auth token used by subsequent calls.
    pub async fn set_auth_token(&self, token: Option<String>) {
        let mut guard = self.auth_token.write().await;
        *guard = token;
        if guard.is_some() {
            debug!("auth token updated");
        } else {
            debug!("auth token cleared");
        }
    }

    pub async fn auth_token(&self) -> Option<String> {
        self.auth_token.read().await.clone()
    }

    /// Get the HTTP client for one call.
    pub fn client(&self) -> RkResult<Client> {
        self.source.client()
    }

    /// Resolve `path` against the base URI.
    ///
    /// A path starting with `/` replaces the base path and keeps the base
    /// scheme and authority, so `//other/x` stays on the base host. Any other
    /// relative path is appended to the base path. An absolute URI is only
    /// accepted when it has the same origin as the base.
    pub fn prepare_path(&self, path: &str) -> RkResult<Url> {
        let mut url = self.base_uri.clone();

        if path.starts_with('/') {
            let (rest, fragment) = match path.split_once('#') {
                Some((rest, fragment)) => (rest, Some(fragment)),
                None => (path, None),
            };
            let (rooted, query) = match rest.split_once('?') {
                Some((rooted, query)) => (rooted, Some(query)),
                None => (rest, None),
            };
            url.set_path(rooted);
            url.set_query(query);
            url.set_fragment(fragment);
        } else {
            if !url.path().ends_with('/') {
                let dir = format!("{}/", url.path());
                url.set_path(&dir);
            }
            url = url.join(path).map_err(|e| {
                RkError::invalid_argument(format!("cannot compose uri from {path:?}: {e}"))
            })?;
        }

        // The bearer token must never leave the base origin
        if url.origin() != self.base_uri.origin() {
            return Err(RkError::invalid_argument(format!(
                "path {path:?} resolves outside the base origin {}",
                self.base_uri.origin().ascii_serialization()
            )));
        }
        Ok(url)
    }

    /// Set the Bearer credential on `request` from the current token.
    pub async fn add_authorization_header(&self, request: &mut Request) -> RkResult<()> {
        let token = self.auth_token.read().await.clone();
        self.apply_authorization(request, token.as_deref())
    }

    fn apply_authorization(&self, request: &mut Request, token: Option<&str>) -> RkResult<()> {
        let token = token.unwrap_or_default();
        if token.is_empty() && self.empty_token == EmptyTokenPolicy::Omit {
            request.headers_mut().remove(AUTHORIZATION);
            return Ok(());
        }

        let mut value = HeaderValue::try_from(format!("{BEARER_SCHEME} {token}"))
            .map_err(|e| RkError::invalid_argument(format!("auth token is not a valid header value: {e}")))?;
        value.set_sensitive(true);
        request.headers_mut().insert(AUTHORIZATION, value);
        Ok(())
    }

    // --- Public HTTP methods ---

    /// Execute a GET request.
    pub async fn get<E: Envelope>(&self, path: &str) -> E {
        self.send::<E, ()>(Method::GET, path, None).await
    }

    /// Execute a POST request with a JSON body.
    pub async fn post<E, B>(&self, path: &str, body: &B) -> E
    where
        E: Envelope,
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, path, Some(body)).await
    }

    /// Execute a PUT request with a JSON body.
    pub async fn put<E, B>(&self, path: &str, body: &B) -> E
    where
        E: Envelope,
        B: Serialize + ?Sized,
    {
        self.send(Method::PUT, path, Some(body)).await
    }

    /// Execute a DELETE request.
    pub async fn delete<E: Envelope>(&self, path: &str) -> E {
        self.send::<E, ()>(Method::DELETE, path, None).await
    }

    async fn send<E, B>(&self, method: Method, path: &str, body: Option<&B>) -> E
    where
        E: Envelope,
        B: Serialize + ?Sized,
    {
        match self.try_send(method.clone(), path, body).await {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("{} {} failed: {}", method, path, e);
                E::from_exception(e)
            }
        }
    }

    async fn try_send<E, B>(&self, method: Method, path: &str, body: Option<&B>) -> RkResult<E>
    where
        E: Envelope,
        B: Serialize + ?Sized,
    {
        let client = self.client()?;
        let uri = self.prepare_path(path)?;

        let mut builder = client.request(method, uri);
        if let Some(body) = body {
            let bytes = serde_json::to_vec(body)?;
            builder = builder.header(CONTENT_TYPE, JSON_CONTENT_TYPE).body(bytes);
        }
        let mut request = builder.build().map_err(classify_error)?;
        self.add_authorization_header(&mut request).await?;

        if tracing::enabled!(Level::DEBUG) {
            debug!("request uri: {} {}", request.method(), request.url());
            debug!("authorization: {}", redacted_authorization(&request));
        }

        let response = client.execute(request).await.map_err(classify_error)?;
        trace!("{} from {}", response.status(), response.url());
        self.deserialize_if_supported_code(response).await
    }

    /// Turn a response into an envelope according to the status table.
    ///
    /// Parsed statuses read the body as JSON (an empty body gives the default
    /// envelope) and are successful only for 200. Other statuses are never
    /// parsed: the envelope carries the status and, if there is one, the raw
    /// body text as its title. Invalid UTF-8 in that text is replaced with
    /// U+FFFD.
    pub async fn deserialize_if_supported_code<E: Envelope>(
        &self,
        response: Response,
    ) -> RkResult<E> {
        let status = response.status();

        match self.status_table.policy(status) {
            StatusPolicy::ParseJson => {
                let bytes = response.bytes().await.map_err(classify_error)?;
                let mut envelope: E = if bytes.iter().all(u8::is_ascii_whitespace) {
                    E::default()
                } else {
                    serde_json::from_slice(&bytes)?
                };
                envelope.set_status(status.as_u16());
                envelope.set_success(status == StatusCode::OK);
                Ok(envelope)
            }
            StatusPolicy::SynthesizeFromText => {
                let title = if response.content_length() == Some(0) {
                    None
                } else {
                    let bytes = response.bytes().await.map_err(classify_error)?;
                    let text = String::from_utf8_lossy(&bytes).into_owned();
                    (!text.is_empty()).then_some(text)
                };
                Ok(E::from_status(status.as_u16(), title))
            }
        }
    }
}

fn parse_base_uri(uri: &str) -> RkResult<Url> {
    let trimmed = uri.trim();
    if trimmed.is_empty() {
        return Err(RkError::invalid_argument("base uri must not be empty"));
    }
    let url = Url::parse(trimmed).map_err(|e| {
        RkError::invalid_argument(format!("base uri {trimmed:?} is not an absolute uri: {e}"))
    })?;
    if url.cannot_be_a_base() {
        return Err(RkError::invalid_argument(format!(
            "base uri {trimmed:?} cannot be used as a base"
        )));
    }
    Ok(url)
}

/// Authorization header for logging, with the credential masked.
fn redacted_authorization(request: &Request) -> String {
    let Some(value) = request.headers().get(AUTHORIZATION) else {
        return "<none>".to_string();
    };
    let raw = value.to_str().unwrap_or_default();
    match raw.split_once(' ') {
        Some((scheme, token)) if !token.is_empty() => format!("{scheme} <redacted>"),
        Some((scheme, _)) => format!("{scheme} <empty>"),
        None => raw.to_string(),
    }
}

/// Classify a reqwest error into an RkError variant.
fn classify_error(e: reqwest::Error) -> RkError {
    if e.is_timeout() {
        RkError::Timeout(e.to_string())
    } else if e.is_connect() {
        RkError::Http(format!("connection failed: {e}"))
    } else if e.is_decode() {
        RkError::Serialization(e.to_string())
    } else if e.is_builder() {
        RkError::InvalidArgument(e.to_string())
    } else {
        RkError::Http(e.to_string())
    }
}
