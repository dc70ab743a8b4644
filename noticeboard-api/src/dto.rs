//! DTOs for API requests and responses.
//!
//! Admin payloads arrive as raw JSON values and are checked field by field so
//! that every shape problem gets its own message.

use serde::Serialize;
use serde_json::{Map, Value};

use noticeboard_core::error::{BoardError, Result};
use noticeboard_core::types::timestamp::parse_timestamp;
use noticeboard_core::types::{Announcement, AnnouncementPatch, NewAnnouncement};
use noticeboard_store::Divergence;

fn invalid(message: &str) -> BoardError {
    BoardError::ValidationError(message.to_string())
}

/// Body of `POST /api/admin/announcements`, checked into a [`NewAnnouncement`].
///
/// `title` and `body` are required strings. `publishedAt` is optional; `null`
/// and `""` mean "now". `highlight` is an optional bool.
pub fn parse_create_request(payload: Value) -> Result<NewAnnouncement> {
    let required = || invalid("title and body are required");
    let fields = payload.as_object().ok_or_else(required)?;

    let title = fields.get("title").and_then(Value::as_str).ok_or_else(required)?;
    let body = fields.get("body").and_then(Value::as_str).ok_or_else(required)?;

    let mut new = NewAnnouncement::new(title, body);
    new.validate()?;

    match fields.get("publishedAt") {
        None | Some(Value::Null) => {}
        Some(Value::String(raw)) if raw.is_empty() => {}
        Some(Value::String(raw)) => new = new.published_at(parse_timestamp(raw)?),
        Some(_) => return Err(invalid("publishedAt must be a valid ISO date string")),
    }

    match fields.get("highlight") {
        None | Some(Value::Null) => {}
        Some(Value::Bool(flag)) => new = new.highlight(*flag),
        Some(_) => return Err(invalid("highlight must be a boolean")),
    }

    Ok(new)
}

/// Body of `PATCH /api/admin/announcements/:id`, checked into an [`AnnouncementPatch`].
///
/// A field that is present must have the right type, `null` included.
pub fn parse_update_request(payload: Value) -> Result<AnnouncementPatch> {
    let Value::Object(fields) = payload else {
        return Err(invalid("Payload must be an object"));
    };

    if PATCH_FIELDS.iter().all(|name| !fields.contains_key(*name)) {
        return Err(invalid("At least one field must be provided"));
    }

    let mut patch = AnnouncementPatch {
        title: string_field(&fields, "title")?,
        body: string_field(&fields, "body")?,
        highlight: match fields.get("highlight") {
            None => None,
            Some(Value::Bool(flag)) => Some(*flag),
            Some(_) => return Err(invalid("highlight must be a boolean")),
        },
        published_at: None,
    };
    let published_at = string_field(&fields, "publishedAt")?;

    // Blank text is reported before a bad date.
    patch.validate_text()?;
    patch.published_at = published_at.map(|raw| parse_timestamp(&raw)).transpose()?;

    Ok(patch)
}

const PATCH_FIELDS: [&str; 4] = ["title", "body", "highlight", "publishedAt"];

fn string_field(fields: &Map<String, Value>, name: &str) -> Result<Option<String>> {
    match fields.get(name) {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(BoardError::ValidationError(format!("{name} must be a string"))),
    }
}

/// Response for the public feed.
#[derive(Debug, Serialize)]
pub struct ListAnnouncementsResponse {
    /// Announcements, most recent first
    pub announcements: Vec<Announcement>,
}

/// Acknowledgement body.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    /// Always true
    pub ok: bool,
}

impl OkResponse {
    /// `{"ok": true}`
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the store cannot be read
    pub status: String,
    /// Crate version
    pub version: String,
    /// Seconds since the server started
    pub uptime_seconds: u64,
    /// Stored announcements, absent when the store cannot be read
    pub announcements_count: Option<usize>,
    /// Backends in use, durable first
    pub backend: String,
    /// Writes that only reached the fallback backend
    pub fallback_writes: u64,
    /// Most recent fallback write
    pub last_divergence: Option<Divergence>,
    /// Whether an admin token is configured
    pub admin_configured: bool,
}
