//! Result envelope types.
//!
//! Every call made through [`RestClient`](crate::RestClient) returns an
//! envelope, whether the server answered or the call failed locally:
//! ```json
//! { "success": true, "status": 200, "title": "Created", "data": { ... } }
//! ```
//! The shared capability set lives in the [`Envelope`] trait; [`ApiResult`]
//! is the generic implementation carrying a typed payload.

use std::collections::HashMap;
use std::sync::Arc;

use rk_core::constants::{EXCEPTION_STATUS, EXCEPTION_TITLE};
use rk_core::error::RkError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Capability set shared by every result envelope.
///
/// Implementors must be constructible with `Default` (used for empty bodies
/// and synthesized envelopes) and deserializable from a JSON body.
pub trait Envelope: Default + DeserializeOwned + Send {
    fn success(&self) -> bool;
    fn set_success(&mut self, success: bool);

    fn status(&self) -> u16;
    fn set_status(&mut self, status: u16);

    fn title(&self) -> Option<&str>;
    fn set_title(&mut self, title: Option<String>);

    fn exception(&self) -> Option<&RkError>;
    fn set_exception(&mut self, exception: Option<Arc<RkError>>);

    /// Build an unsuccessful envelope for a status whose body was not parsed.
    fn from_status(status: u16, title: Option<String>) -> Self {
        let mut envelope = Self::default();
        envelope.set_success(false);
        envelope.set_status(status);
        envelope.set_title(title);
        envelope
    }

    /// Build the envelope reported when a call fails before a usable response.
    fn from_exception(error: RkError) -> Self {
        let mut envelope = Self::from_status(EXCEPTION_STATUS, Some(EXCEPTION_TITLE.to_string()));
        envelope.set_exception(Some(Arc::new(error)));
        envelope
    }
}

/// Generic result envelope with a typed payload.
///
/// `errors` holds field-level validation messages, typically sent with a
/// 400 response. `exception` is never read from or written to the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiResult<T = serde_json::Value> {
    pub success: bool,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub errors: HashMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip)]
    pub exception: Option<Arc<RkError>>,
}

impl<T> Default for ApiResult<T> {
    fn default() -> Self {
        Self {
            success: false,
            status: 0,
            title: None,
            errors: HashMap::new(),
            data: None,
            exception: None,
        }
    }
}

impl<T> ApiResult<T> {
    /// Whether the call succeeded.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Whether the envelope was synthesized from a local failure.
    pub fn is_exception(&self) -> bool {
        self.exception.is_some()
    }

    /// Consume the envelope and return the payload, if any.
    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// Best available description of a failure.
    ///
    /// Prefers the attached exception, then the title, then the first
    /// validation message. Returns `None` for successful envelopes.
    pub fn error_message(&self) -> Option<String> {
        if self.success {
            return None;
        }
        if let Some(ref e) = self.exception {
            return Some(e.to_string());
        }
        if let Some(ref title) = self.title {
            return Some(title.clone());
        }
        let mut fields: Vec<_> = self.errors.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));
        fields
            .into_iter()
            .find_map(|(field, messages)| messages.first().map(|m| format!("{field}: {m}")))
    }
}

impl<T> Envelope for ApiResult<T>
where
    T: DeserializeOwned + Send,
{
    fn success(&self) -> bool {
        self.success
    }

    fn set_success(&mut self, success: bool) {
        self.success = success;
    }

    fn status(&self) -> u16 {
        self.status
    }

    fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn set_title(&mut self, title: Option<String>) {
        self.title = title;
    }

    fn exception(&self) -> Option<&RkError> {
        self.exception.as_deref()
    }

    fn set_exception(&mut self, exception: Option<Arc<RkError>>) {
        self.exception = exception;
    }
}

/// Paging information exposed by paged results.
///
/// Pages are numbered from 1.
pub trait Paged {
    fn page(&self) -> u32;
    fn page_size(&self) -> u32;
    fn total_count(&self) -> u64;

    /// Number of pages needed to hold `total_count` items.
    fn total_pages(&self) -> u64 {
        let size = u64::from(self.page_size());
        if size == 0 {
            return 0;
        }
        self.total_count().div_ceil(size)
    }

    fn has_next_page(&self) -> bool {
        u64::from(self.page()) < self.total_pages()
    }
}

/// One page of a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total_count: u64,
}

/// Envelope carrying one page of `T`.
pub type PagedResult<T> = ApiResult<Page<T>>;

impl<T> Paged for Page<T> {
    fn page(&self) -> u32 {
        self.page
    }

    fn page_size(&self) -> u32 {
        self.page_size
    }

    fn total_count(&self) -> u64 {
        self.total_count
    }
}

impl<T> Paged for ApiResult<Page<T>> {
    fn page(&self) -> u32 {
        self.data.as_ref().map_or(0, |p| p.page)
    }

    fn page_size(&self) -> u32 {
        self.data.as_ref().map_or(0, |p| p.page_size)
    }

    fn total_count(&self) -> u64 {
        self.data.as_ref().map_or(0, |p| p.total_count)
    }
}
