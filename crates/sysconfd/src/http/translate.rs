//! Translation of plugin invocation outcomes into HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use serde_json::{Value, json};
use tracing::error;

use sysconfd_plugins::InvokeError;

const TRANSLATE_TARGET: &str = "sysconfd::http";

/// Body returned to callers whenever a plugin invocation fails.
///
/// Failure detail is deliberately confined to the server log; clients see
/// only this generic body regardless of the underlying cause.
#[must_use]
pub(crate) fn internal_error_body() -> Value {
    json!({"error": "internal server error"})
}

/// Maps an invocation outcome to an HTTP status and JSON body.
///
/// Successful invocations pass the plugin's response envelope through
/// verbatim with status 200. Failures are logged with full detail and
/// collapsed into a generic 500 body.
pub(crate) fn translate(
    result: Result<Value, InvokeError>,
    plugin: &str,
) -> (StatusCode, Json<Value>) {
    match result {
        Ok(body) => (StatusCode::OK, Json(body)),
        Err(error) => {
            error!(
                target: TRANSLATE_TARGET,
                plugin = %plugin,
                error = %error,
                "plugin invocation failed"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, Json(internal_error_body()))
        }
    }
}
