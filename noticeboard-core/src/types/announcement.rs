//! Announcement types.
//!
//! [`Announcement`] is the only stored entity. [`NewAnnouncement`] and
//! [`AnnouncementPatch`] carry what create and update accept; their
//! `validate` methods hold the checks the request layer runs before calling
//! the store. The store itself only trims and defaults.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BoardError, Result};
use crate::types::timestamp;

/// A published announcement.
///
/// # Serialized form
/// ```text
/// {"id": "...", "title": "...", "body": "...",
///  "publishedAt": "2024-05-01T12:00:00.000Z", "highlight": false}
/// ```
///
/// Records written without `highlight` load as `false`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    /// Unique identifier (UUID v4, assigned at creation)
    pub id: String,
    /// Trimmed title
    pub title: String,
    /// Trimmed body; embedded line breaks are kept
    pub body: String,
    /// Publication time, the feed's sort key
    #[serde(with = "timestamp::iso8601")]
    pub published_at: DateTime<Utc>,
    /// Whether the feed should call this one out
    #[serde(default)]
    pub highlight: bool,
}

impl Announcement {
    /// Builds a new entry from create fields, assigning a fresh id.
    ///
    /// Title and body are trimmed, `highlight` defaults to `false` and
    /// `published_at` to the current time.
    pub fn from_new(new: NewAnnouncement) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: new.title.trim().to_string(),
            body: new.body.trim().to_string(),
            published_at: new
                .published_at
                .map(timestamp::normalize)
                .unwrap_or_else(timestamp::now),
            highlight: new.highlight.unwrap_or(false),
        }
    }

    /// Applies the fields present in `patch`, leaving the rest untouched.
    pub fn apply(&mut self, patch: AnnouncementPatch) {
        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(body) = patch.body {
            self.body = body.trim().to_string();
        }
        if let Some(published_at) = patch.published_at {
            self.published_at = timestamp::normalize(published_at);
        }
        if let Some(highlight) = patch.highlight {
            self.highlight = highlight;
        }
    }

    /// `publishedAt` in canonical string form.
    pub fn published_at_iso(&self) -> String {
        timestamp::format_timestamp(&self.published_at)
    }
}

/// Fields accepted when creating an announcement.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewAnnouncement {
    /// Title (trimmed by the store)
    pub title: String,
    /// Body (trimmed by the store)
    pub body: String,
    /// Publication time; defaults to now
    pub published_at: Option<DateTime<Utc>>,
    /// Highlight flag; defaults to `false`
    pub highlight: Option<bool>,
}

impl NewAnnouncement {
    /// Creates a payload with only the required fields.
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            published_at: None,
            highlight: None,
        }
    }

    /// Sets an explicit publication time.
    pub fn published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    /// Sets the highlight flag.
    pub fn highlight(mut self, highlight: bool) -> Self {
        self.highlight = Some(highlight);
        self
    }

    /// Rejects a title or body that is empty after trimming.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() || self.body.trim().is_empty() {
            return Err(BoardError::ValidationError(
                "title and body cannot be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Partial update. `None` means "leave as is".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnnouncementPatch {
    /// New title
    pub title: Option<String>,
    /// New body
    pub body: Option<String>,
    /// New publication time
    pub published_at: Option<DateTime<Utc>>,
    /// New highlight flag
    pub highlight: Option<bool>,
}

impl AnnouncementPatch {
    /// A patch that only changes the highlight flag.
    pub fn highlight(highlight: bool) -> Self {
        Self {
            highlight: Some(highlight),
            ..Self::default()
        }
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.body.is_none()
            && self.published_at.is_none()
            && self.highlight.is_none()
    }

    /// Requires at least one field and rejects blank title/body values.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(BoardError::ValidationError(
                "At least one field must be provided".into(),
            ));
        }
        self.validate_text()
    }

    /// Rejects a title or body that is present but blank.
    pub fn validate_text(&self) -> Result<()> {
        if matches!(&self.title, Some(title) if title.trim().is_empty()) {
            return Err(BoardError::ValidationError("title cannot be empty".into()));
        }
        if matches!(&self.body, Some(body) if body.trim().is_empty()) {
            return Err(BoardError::ValidationError("body cannot be empty".into()));
        }
        Ok(())
    }
}
