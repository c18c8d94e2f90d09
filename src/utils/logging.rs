use serde::Serialize;
use tracing::Level;

/// Pass `value` as indented JSON to `log`, but only when debug logging is enabled.
pub(crate) fn with_pretty_json_debug<T, F>(value: &T, log: F)
where
    T: Serialize,
    F: FnOnce(&str),
{
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }

    match serde_json::to_string_pretty(value) {
        Ok(body) => log(&body),
        Err(error) => log(&format!("<unserializable body: {error}>")),
    }
}
