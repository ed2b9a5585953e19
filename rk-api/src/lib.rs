//! Restkit API - base request engine for typed HTTP REST clients.
//!
//! A resource client wraps a [`RestClient`] and calls `get`/`post`/`put`/
//! `delete` with its own payload type. Every call returns an envelope
//! ([`ApiResult<T>`] or any other [`Envelope`]): server replies are parsed or
//! summarized according to a [`StatusTable`], and local failures become
//! envelopes with status 444 instead of errors.

pub mod client;
pub mod registry;
pub mod response;
pub mod source;
pub mod status;

// Re-export key types
pub use client::{EmptyTokenPolicy, RestClient};
pub use registry::{ClientRegistry, RegistrationOptions};
pub use response::{ApiResult, Envelope, Page, Paged, PagedResult};
pub use source::{ClientSource, FixedClient, RegistryClient};
pub use status::{StatusPolicy, StatusTable};
