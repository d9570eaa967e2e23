//! Type-safe ContentDirectory API for UPnP media servers
//!
//! This crate provides typed UPnP ContentDirectory operations on top of the
//! private `soap-client` crate, a [`ContentDirectory`] seam implemented by
//! [`MediaServer`], and the paginated browsing built on it:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cds_api::{BrowseParams, BrowsePager, CancellationToken, MediaServer};
//!
//! let server = Arc::new(MediaServer::new(
//!     "uuid:4d696e69-444c-164e-9d41-b827eb1c2cf7",
//!     "http://192.168.1.20:8200/ctl/ContentDir",
//! ));
//!
//! let pager = BrowsePager::new(server, BrowseParams::children("0"), CancellationToken::new());
//! for page in pager {
//!     for object in page? {
//!         println!("{} {}", object.object_id(), object.title());
//!     }
//! }
//! # Ok::<(), cds_api::ApiError>(())
//! ```

pub mod browse;
pub mod client;
pub mod directory;
pub mod error;
pub mod operation;
pub mod operations;
pub mod service;

pub use browse::{
    browse_metadata, BrowseParams, BrowsePager, CancellationToken, PageOutcome, DEFAULT_PAGE_SIZE,
};
pub use client::CdsClient;
pub use directory::{ContentDirectory, MediaServer};
pub use error::{ApiError, Result};
pub use operation::CdsOperation;
pub use operations::{BrowseFlag, BrowseRequest, BrowseResponse};
pub use service::{Service, ServiceInfo};
