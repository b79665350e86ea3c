//! Error mapping for the reqwest transport

use bodyback_errors::ApiError;

/// Convert a reqwest error into the client taxonomy
///
/// Timeouts and anything else that kept a response from arriving count as
/// connectivity failures. A response body that could not be read is a
/// decode failure.
pub fn map_reqwest_error(err: reqwest::Error, context: &str) -> ApiError {
    if err.is_timeout() {
        ApiError::connectivity(format!("{}: request timed out", context))
    } else if err.is_decode() || err.is_body() {
        ApiError::decode(format!("{}: {}", context, err))
    } else {
        ApiError::connectivity(format!("{}: {}", context, err))
    }
}
