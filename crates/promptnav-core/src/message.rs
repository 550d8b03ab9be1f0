#![forbid(unsafe_code)]

//! Extracted chat messages.

/// Author of a chat message, parsed from the host's author-role attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AuthorRole {
    User,
    Assistant,
    /// Any other value (`system`, `tool`, ...), kept verbatim.
    Other(String),
}

impl AuthorRole {
    /// Parse an attribute value. Matching is exact, like the host's markup.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "user" => Self::User,
            "assistant" => Self::Assistant,
            other => Self::Other(other.to_owned()),
        }
    }

    #[must_use]
    pub const fn is_user(&self) -> bool {
        matches!(self, Self::User)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Other(other) => other,
        }
    }
}

/// One message found during a rebuild.
///
/// Records only live for a single rebuild cycle; `source_handle` is a live
/// reference into the host document, so scrolling always resolves the node's
/// current position.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageRecord<H> {
    pub display_text: String,
    pub source_handle: H,
    pub author_role: AuthorRole,
}

impl<H> MessageRecord<H> {
    pub fn new(display_text: impl Into<String>, source_handle: H, author_role: AuthorRole) -> Self {
        Self {
            display_text: display_text.into(),
            source_handle,
            author_role,
        }
    }
}
