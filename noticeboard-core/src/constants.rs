//! Defaults and environment variable names.

// ═══════════════════════════════════════════════════════════════════════════════
// STORAGE DEFAULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Key under which the whole collection is stored in the key-value service.
pub const DEFAULT_KV_KEY: &str = "announcements";

/// Default location of the secondary JSON file, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "data/announcements.json";

/// Request timeout for the key-value service, in seconds.
pub const DEFAULT_KV_TIMEOUT_SECS: u64 = 10;

/// Contents written when the secondary file is first created.
pub const EMPTY_COLLECTION_JSON: &str = "[]";

// ═══════════════════════════════════════════════════════════════════════════════
// HTTP
// ═══════════════════════════════════════════════════════════════════════════════

/// Prefix the `Authorization` header must carry.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Default request body limit for admin payloads.
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

/// Default port for `noticeboard serve`.
pub const DEFAULT_PORT: u16 = 3000;

// ═══════════════════════════════════════════════════════════════════════════════
// ENVIRONMENT
// ═══════════════════════════════════════════════════════════════════════════════

/// Shared admin secret.
pub const ENV_ADMIN_TOKEN: &str = "ADMIN_TOKEN";
/// Base URL of the REST key-value service.
pub const ENV_KV_URL: &str = "KV_REST_API_URL";
/// Bearer token for the REST key-value service.
pub const ENV_KV_TOKEN: &str = "KV_REST_API_TOKEN";
/// Override for [`DEFAULT_KV_KEY`].
pub const ENV_KV_KEY: &str = "NOTICEBOARD_KV_KEY";
/// Override for [`DEFAULT_KV_TIMEOUT_SECS`].
pub const ENV_KV_TIMEOUT_SECS: &str = "NOTICEBOARD_KV_TIMEOUT_SECS";
/// Override for [`DEFAULT_DATA_FILE`].
pub const ENV_DATA_FILE: &str = "NOTICEBOARD_DATA_FILE";
/// Forces the in-memory secondary backend.
pub const ENV_EPHEMERAL_FS: &str = "NOTICEBOARD_EPHEMERAL_FS";
/// Set by serverless hosts whose filesystem is read-only or discarded per request.
pub const ENV_SERVERLESS_MARKER: &str = "VERCEL";
/// Override for [`DEFAULT_MAX_BODY_BYTES`].
pub const ENV_MAX_BODY_BYTES: &str = "NOTICEBOARD_MAX_BODY_BYTES";
