//! Constants for the download module (endpoint path, timeouts, form fields).

/// Path of the log export endpoint, relative to the backend base URL.
pub const DOWNLOAD_ENDPOINT_PATH: &str = "api/chatwork/download";

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Multipart field carrying the API token.
pub(crate) const FIELD_API_TOKEN: &str = "api_token";

/// Multipart field carrying the room identifier.
pub(crate) const FIELD_ROOM_ID: &str = "room_id";

/// Multipart field carrying the requested message count.
pub(crate) const FIELD_MESSAGE_COUNT: &str = "message_count";
