//! Status code dispatch table.
//!
//! Decides, per HTTP status, whether a response body is parsed as the typed
//! envelope or kept as opaque text.

use std::collections::BTreeSet;

use reqwest::StatusCode;

/// What to do with a response body for a given status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Parse the body as a JSON envelope.
    ParseJson,
    /// Do not parse; report the raw body text as the envelope title.
    SynthesizeFromText,
}

/// Status codes whose bodies carry an application-defined JSON payload.
const DEFAULT_PARSED: [StatusCode; 3] = [
    StatusCode::OK,
    StatusCode::BAD_REQUEST,
    StatusCode::NOT_FOUND,
];

/// Mapping from status code to [`StatusPolicy`].
///
/// Codes in the table are parsed; every other code is synthesized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTable {
    parsed: BTreeSet<u16>,
}

impl Default for StatusTable {
    fn default() -> Self {
        Self {
            parsed: DEFAULT_PARSED.iter().map(StatusCode::as_u16).collect(),
        }
    }
}

impl StatusTable {
    /// Add a status whose body should be parsed as JSON.
    pub fn with_parsed(mut self, status: StatusCode) -> Self {
        self.parsed.insert(status.as_u16());
        self
    }

    /// Remove a status from the parse set.
    pub fn without_parsed(mut self, status: StatusCode) -> Self {
        self.parsed.remove(&status.as_u16());
        self
    }

    pub fn policy(&self, status: StatusCode) -> StatusPolicy {
        if self.parsed.contains(&status.as_u16()) {
            StatusPolicy::ParseJson
        } else {
            StatusPolicy::SynthesizeFromText
        }
    }
}
