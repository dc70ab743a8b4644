//! Domain types for the noticeboard.
//!
//! - [`Announcement`]: the stored entity
//! - [`NewAnnouncement`]: fields accepted by create
//! - [`AnnouncementPatch`]: fields accepted by update
//! - [`timestamp`]: parsing and canonical formatting of `publishedAt`

mod announcement;
pub mod timestamp;

pub use announcement::*;
