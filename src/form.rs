//! Form state for a single download: credential, room, and message count.
//!
//! [`FormState`] is a plain value holder. Setters store what the operator
//! typed; the only coercion happens on the message count, which is always
//! kept at one or above. Nothing here performs I/O.

use std::fmt;

/// Default number of messages requested when the operator does not say.
pub const DEFAULT_MESSAGE_COUNT: u32 = 100;

/// Advisory upper bound shown to operators. Not enforced by [`FormState`].
pub const MAX_ADVISED_MESSAGE_COUNT: u32 = 1000;

/// Opaque API token identifying the caller to the backend.
///
/// `Debug` is redacted so tokens never reach logs or error text.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the raw token. Only the backend client should call this.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("Credential(<empty>)")
        } else {
            f.write_str("Credential(<redacted>)")
        }
    }
}

/// Key selecting which chat room's log is requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomId(String);

impl RoomId {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Number of messages to request. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageCount(u32);

impl MessageCount {
    /// Coerces operator text into a count.
    ///
    /// The leading integer of the trimmed text is used (`"50abc"` is 50,
    /// `"12.7"` is 12). Text without a leading integer, or a value below one,
    /// becomes 1. Large values saturate rather than fail; there is no upper
    /// clamp.
    #[must_use]
    pub fn coerce(raw: &str) -> Self {
        match leading_integer(raw) {
            Some(value) if value >= 1 => Self(u32::try_from(value).unwrap_or(u32::MAX)),
            _ => Self(1),
        }
    }

    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Whether the count lies in the advised `1..=1000` range.
    #[must_use]
    pub fn is_within_advised_range(self) -> bool {
        (1..=MAX_ADVISED_MESSAGE_COUNT).contains(&self.0)
    }
}

impl Default for MessageCount {
    fn default() -> Self {
        Self(DEFAULT_MESSAGE_COUNT)
    }
}

impl fmt::Display for MessageCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parses an optional sign and the leading run of ASCII digits.
fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let magnitude = rest[..digits_len].bytes().fold(0i64, |acc, digit| {
        acc.saturating_mul(10)
            .saturating_add(i64::from(digit - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

/// Immutable copy of the form handed to the orchestrator on submit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSnapshot {
    pub credential: Credential,
    pub room_id: RoomId,
    pub message_count: MessageCount,
}

/// The three operator-entered values.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    credential: Credential,
    room_id: RoomId,
    message_count: MessageCount,
}

impl FormState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_credential(&mut self, value: impl Into<String>) {
        self.credential = Credential::new(value);
    }

    pub fn set_room_id(&mut self, value: impl Into<String>) {
        self.room_id = RoomId::new(value);
    }

    pub fn set_message_count(&mut self, raw: &str) {
        self.message_count = MessageCount::coerce(raw);
    }

    #[must_use]
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    #[must_use]
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    #[must_use]
    pub fn message_count(&self) -> MessageCount {
        self.message_count
    }

    #[must_use]
    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            credential: self.credential.clone(),
            room_id: self.room_id.clone(),
            message_count: self.message_count,
        }
    }
}
