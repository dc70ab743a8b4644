//! # Noticeboard Store
//!
//! Announcement storage for the noticeboard.
//!
//! This crate provides the [`AnnouncementStore`] and the backends behind it:
//!
//! - **Kv**: durable REST key-value service, shared across instances
//! - **File**: JSON file for single-node deployments with a writable disk
//! - **Memory**: in-process mapping for hosts without a persistent filesystem
//!
//! ## Example
//!
//! ```rust,ignore
//! use noticeboard_store::StoreConfig;
//! use noticeboard_core::NewAnnouncement;
//!
//! let store = StoreConfig::from_env()?.build()?;
//!
//! let entry = store.create(NewAnnouncement::new("Maintenance", "Down at 2AM")).await?;
//! let feed = store.list().await?; // most recent first
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod codec;
mod config;
mod divergence;
mod file;
mod kv;
mod memory;
mod store;

pub use config::{SecondaryKind, StoreConfig};
pub use divergence::{Divergence, DivergenceHook, DivergenceStatus};
pub use file::FileBackend;
pub use kv::{KvBackend, KvConfig};
pub use memory::MemoryBackend;
pub use store::AnnouncementStore;

// Re-export the trait from core
pub use noticeboard_core::traits::CollectionBackend;
