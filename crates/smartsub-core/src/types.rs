use crate::{Result, error::Error};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Returns `true` for characters allowed in a canonical tag (`[A-Za-z0-9_-]`).
#[inline]
#[must_use]
pub fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Normalize raw reader keystrokes into a canonical tag string.
///
/// Leading and trailing whitespace is stripped first, then every character
/// outside `[A-Za-z0-9_-]` is dropped. The result may be empty.
///
/// # Examples
///
/// ```
/// use smartsub_core::sanitize_tag;
///
/// assert_eq!(sanitize_tag("AB#12 "), "AB12");
/// assert_eq!(sanitize_tag("  E200-3412_ab \n"), "E200-3412_ab");
/// assert_eq!(sanitize_tag("#$%"), "");
/// ```
#[must_use]
pub fn sanitize_tag(raw: &str) -> String {
    raw.trim().chars().filter(|c| is_tag_char(*c)).collect()
}

/// A sanitized, non-empty RFID tag identifier.
///
/// A `Tag` can only be built from text that is already canonical
/// ([`Tag::new`]) or by sanitizing raw input ([`Tag::sanitize`]), so every
/// value flowing through the pipeline is safe to log and to use as a URL
/// path segment after percent-encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tag(String);

impl Tag {
    /// Create a tag from text that must already be canonical.
    ///
    /// # Errors
    /// Returns `Error::InvalidTag` if the text is empty or contains a character
    /// outside `[A-Za-z0-9_-]`.
    pub fn new(value: &str) -> Result<Self> {
        if value.is_empty() {
            return Err(Error::InvalidTag("tag is empty".to_string()));
        }
        if let Some(bad) = value.chars().find(|c| !is_tag_char(*c)) {
            return Err(Error::InvalidTag(format!(
                "character {bad:?} not allowed in {value:?}"
            )));
        }
        Ok(Tag(value.to_string()))
    }

    /// Sanitize raw reader input into a tag.
    ///
    /// Returns `None` when nothing survives sanitization; such input is
    /// discarded without triggering any processing.
    #[must_use]
    pub fn sanitize(raw: &str) -> Option<Self> {
        let clean = sanitize_tag(raw);
        if clean.is_empty() {
            None
        } else {
            Some(Tag(clean))
        }
    }

    /// Get the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Tag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Tag::new(s)
    }
}

impl TryFrom<String> for Tag {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Tag::new(&value)
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.0
    }
}

/// Outcome of validating one tag against the checkpoint service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    /// The service recognized the tag.
    Ok,
    /// Rejected, unknown, or the service could not be reached.
    Nok,
}

impl Verdict {
    /// Returns `true` for [`Verdict::Ok`].
    #[inline]
    #[must_use]
    pub fn is_ok(self) -> bool {
        matches!(self, Verdict::Ok)
    }

    /// Label written to the access log.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Ok => "OK",
            Verdict::Nok => "NOK",
        }
    }
}

impl From<bool> for Verdict {
    fn from(accepted: bool) -> Self {
        if accepted { Verdict::Ok } else { Verdict::Nok }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
