//! Pin, comment and like records.
//!
//! # Responsibility
//! - Define the serialized shape of pins, comments and like state.
//! - Normalize create/comment inputs (trimming, defaults, required fields).
//!
//! # Invariants
//! - A `NewPin` always carries non-blank content.
//! - A `NewComment` always carries a pin id, non-blank content and a
//!   non-empty username.
//! - Timestamps are ISO-8601 UTC text assigned by the store.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned pin identifier.
pub type PinId = i64;

/// Store-assigned comment identifier.
pub type CommentId = i64;

/// Username stored when a commenter does not provide one.
pub const ANONYMOUS_USERNAME: &str = "Anonymous";

/// Client identifier used when the caller's origin cannot be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Shared content resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pin {
    pub id: PinId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: String,
    pub created_at: String,
    /// Denormalized count of like rows; mutated only by the like toggle.
    pub likes_count: i64,
}

/// Comment attached to a pin. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub pin_id: PinId,
    pub username: String,
    pub content: String,
    pub created_at: String,
}

/// Pin with its full comment thread, oldest comment first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinDetail {
    #[serde(flatten)]
    pub pin: Pin,
    pub comments: Vec<Comment>,
}

/// Like state of one `(pin, client)` pair after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeState {
    pub liked: bool,
    pub likes_count: i64,
}

/// Caller identity used as the uniqueness key for likes.
///
/// Derived from the caller's network origin; not an authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(String);

impl ClientId {
    /// Trims the raw origin value, falling back to [`UNKNOWN_CLIENT`].
    pub fn new(raw: impl AsRef<str>) -> Self {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            Self::unknown()
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn unknown() -> Self {
        Self(UNKNOWN_CLIENT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Ordering of pin listings by creation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

impl SortOrder {
    /// Parses a sort selector; anything other than `oldest` means newest first.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value.map(|raw| raw.trim().to_ascii_lowercase()) {
            Some(raw) if raw == "oldest" => Self::Oldest,
            _ => Self::Newest,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Newest => "DESC",
            Self::Oldest => "ASC",
        }
    }
}

/// Validation failures for write inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinValidationError {
    MissingContent,
    MissingPinId,
    InvalidPinId(String),
    MissingCommentContent,
}

impl Display for PinValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingContent => write!(f, "Content is required"),
            Self::MissingPinId => write!(f, "Pin ID is required"),
            Self::InvalidPinId(value) => write!(f, "Pin ID `{value}` is not a valid identifier"),
            Self::MissingCommentContent => write!(f, "Comment content is required"),
        }
    }
}

impl Error for PinValidationError {}

/// Validated input for pin creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPin {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Stored as supplied; only blankness is checked.
    pub content: String,
}

impl NewPin {
    pub fn new(
        title: Option<&str>,
        description: Option<&str>,
        content: Option<&str>,
    ) -> Result<Self, PinValidationError> {
        let content = content.unwrap_or_default();
        if content.trim().is_empty() {
            return Err(PinValidationError::MissingContent);
        }

        Ok(Self {
            title: trimmed_non_empty(title),
            description: trimmed_non_empty(description),
            content: content.to_string(),
        })
    }
}

/// Validated input for comment creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub pin_id: PinId,
    pub username: String,
    pub content: String,
}

impl NewComment {
    pub fn new(
        pin_id: Option<PinId>,
        username: Option<&str>,
        content: Option<&str>,
    ) -> Result<Self, PinValidationError> {
        let pin_id = pin_id.ok_or(PinValidationError::MissingPinId)?;
        let content = trimmed_non_empty(content).ok_or(PinValidationError::MissingCommentContent)?;
        let username =
            trimmed_non_empty(username).unwrap_or_else(|| ANONYMOUS_USERNAME.to_string());

        Ok(Self {
            pin_id,
            username,
            content,
        })
    }
}

/// Parses a textual pin identifier such as a query-string value.
pub fn parse_pin_id(raw: &str) -> Result<PinId, PinValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PinValidationError::MissingPinId);
    }
    trimmed
        .parse::<PinId>()
        .map_err(|_| PinValidationError::InvalidPinId(trimmed.to_string()))
}

fn trimmed_non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}
