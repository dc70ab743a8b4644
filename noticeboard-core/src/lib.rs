//! # Noticeboard Core
//!
//! Core types, errors, and traits shared by every noticeboard crate.
//!
//! - **Types**: the [`Announcement`] entity plus its create/update payloads
//! - **Errors**: the [`BoardError`] taxonomy used from storage up to HTTP
//! - **Constants**: defaults and environment variable names
//! - **Traits**: the [`CollectionBackend`] storage seam
//!
//! ## Example
//!
//! ```rust
//! use noticeboard_core::{Announcement, NewAnnouncement};
//!
//! let entry = Announcement::from_new(NewAnnouncement::new("  Maintenance ", "Down at 2AM"));
//! assert_eq!(entry.title, "Maintenance");
//! assert!(!entry.highlight);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{BoardError, Result};
pub use traits::*;
pub use types::*;
