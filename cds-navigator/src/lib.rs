//! Directory navigation over a UPnP ContentDirectory
//!
//! A [`Navigator`] keeps a stack of visited containers, each with its cached
//! listing and selection. Listings are fetched page by page on worker
//! threads; results are applied on the owning thread and reported to a
//! single listener as [`DirectoryEvent`]s.
//!
//! # Architecture
//!
//! ```text
//! ContentDirectory → BrowsePager (worker) → pump() → DirectoryContext → DirectoryEvents
//!                                                          ↓
//!                                                   PlaybackTarget
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use cds_api::MediaServer;
//! use cds_navigator::{DirectoryEvent, Navigator, NavigatorConfig};
//!
//! let server = Arc::new(MediaServer::new("uuid:server", "http://192.168.1.20:8200/ctl/ContentDir"));
//! let mut navigator = Navigator::new(server, NavigatorConfig::default())?;
//! let events = navigator.subscribe();
//!
//! navigator.reload();
//! navigator.wait_idle(Duration::from_secs(10));
//!
//! for event in events.try_iter() {
//!     if let DirectoryEvent::Updated { entities, .. } = event {
//!         println!("{} entries so far", entities.len());
//!     }
//! }
//!
//! let first_folder = navigator.current().entities().iter().find(|e| e.is_container()).cloned();
//! if let Some(folder) = first_folder {
//!     navigator.open(&folder);
//!     navigator.wait_idle(Duration::from_secs(10));
//!     println!("{}", navigator.path_string());
//! }
//! # Ok::<(), cds_navigator::NavigatorError>(())
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod logging;
pub mod navigator;
pub mod playback;
mod worker;

pub use config::NavigatorConfig;
pub use context::{ContextState, DirectoryContext, ScanMode};
pub use error::{NavigatorError, Result};
pub use events::{DirectoryEvent, DirectoryEvents};
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};
pub use navigator::{Navigator, PATH_SEPARATOR};
pub use playback::{PlaybackTarget, Selection};
