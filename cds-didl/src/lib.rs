//! # cds-didl
//!
//! Schema-less model of DIDL-Lite documents returned by UPnP
//! ContentDirectory servers.
//!
//! Every child element of an `item` or `container` is kept as a [`Tag`] in a
//! [`TagIndex`]; the few fields every object must carry are lifted into a
//! [`CdsObject`], everything else is reached through compact path
//! expressions:
//!
//! ```rust
//! use cds_didl::parse_batch;
//!
//! let xml = r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/"><item id="4" parentID="1" restricted="1"><dc:title>Song</dc:title><upnp:class>object.item.audioItem.musicTrack</upnp:class><res protocolInfo="http-get:*:audio/mpeg:*">http://host/4.mp3</res></item></DIDL-Lite>"#;
//!
//! let batch = parse_batch(xml, "server-1").unwrap();
//! let song = &batch.objects[0];
//! assert_eq!(song.title(), "Song");
//! assert_eq!(song.get("res@protocolInfo"), Some("http-get:*:audio/mpeg:*"));
//! ```

pub mod didl;
pub mod error;
pub mod object;
pub mod path;
pub mod tag;

pub use didl::{parse_batch, to_didl_xml, DidlBatch};
pub use error::{ParseError, ParseResult};
pub use object::{parse_duration, CdsObject, Entry, ObjectKind, Resource};
pub use path::{lookup, lookup_at, TagPath};
pub use tag::{Attributes, Tag, TagIndex, OWN_TAG};
