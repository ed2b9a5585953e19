//! Application-wide constants.

/// Application name.
pub const APP_NAME: &str = "Restkit";

/// Directory name used under the platform data/config directories.
pub const APP_DIR_NAME: &str = "restkit";

/// Application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Client name used for registration and the User-Agent when none is configured.
pub const DEFAULT_CLIENT_NAME: &str = "restkit";

/// Log file name prefix for the rolling file appender.
pub const LOG_FILE_NAME: &str = "restkit.log";

/// Media type sent in `Accept` and used for JSON request bodies.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Content type for serialized request bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Authorization scheme used for the auth token.
pub const BEARER_SCHEME: &str = "Bearer";

/// Status code assigned to envelopes synthesized from a local failure.
///
/// Servers may send 444 too (nginx does); a local failure is the case where
/// the envelope also carries an exception.
pub const EXCEPTION_STATUS: u16 = 444;

/// Title assigned to envelopes synthesized from a local failure.
pub const EXCEPTION_TITLE: &str = "Exception";

/// Build the default User-Agent value for a named client.
pub fn user_agent(name: &str, version: &str) -> String {
    format!("{name}/{version}")
}
