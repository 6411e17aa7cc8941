//! User-Agent string sent to the backend.

/// Product token used in the User-Agent header.
const PRODUCT: &str = "chatlog-downloader";

/// Default User-Agent for backend requests (identifies the tool and version).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("{PRODUCT}/{version}")
}
