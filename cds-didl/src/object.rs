//! Catalog objects built from DIDL-Lite `item` and `container` elements.

use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use crate::error::{ParseError, ParseResult};
use crate::path::{lookup, lookup_at};
use crate::tag::{Tag, TagIndex};

/// Class prefixes recognized for playable items
pub const IMAGE_CLASS_PREFIX: &str = "object.item.imageItem";
pub const AUDIO_CLASS_PREFIX: &str = "object.item.audioItem";
pub const VIDEO_CLASS_PREFIX: &str = "object.item.videoItem";

/// Class reported by the synthetic root
pub const ROOT_CLASS: &str = "object.container";

/// MIME marker of DTCP-IP protected content in `protocolInfo`
pub const DTCP_MIME_MARKER: &str = "application/x-dtcp1";

/// Media kind derived from the element type and its `upnp:class`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Video,
    Audio,
    Image,
    Container,
    Unknown,
}

impl ObjectKind {
    /// Classify an element. Containers are always [`ObjectKind::Container`].
    pub fn classify(is_item: bool, object_class: &str) -> Self {
        if !is_item {
            return ObjectKind::Container;
        }
        if object_class.starts_with(IMAGE_CLASS_PREFIX) {
            ObjectKind::Image
        } else if object_class.starts_with(AUDIO_CLASS_PREFIX) {
            ObjectKind::Audio
        } else if object_class.starts_with(VIDEO_CLASS_PREFIX) {
            ObjectKind::Video
        } else {
            ObjectKind::Unknown
        }
    }

    /// Top-level MIME type matching this kind, if any
    pub fn mime_family(&self) -> Option<&'static str> {
        match self {
            ObjectKind::Video => Some("video/"),
            ObjectKind::Audio => Some("audio/"),
            ObjectKind::Image => Some("image/"),
            ObjectKind::Container | ObjectKind::Unknown => None,
        }
    }
}

/// Shared data of a parsed item or container
#[derive(Debug, Clone)]
pub struct Entry {
    server_id: String,
    object_id: String,
    parent_id: String,
    object_class: String,
    title: String,
    kind: ObjectKind,
    tags: TagIndex,
    root: Arc<Tag>,
}

impl Entry {
    /// Read the mandatory fields out of `tags`.
    ///
    /// Fails when `@id`, `@parentID`, `upnp:class` or `dc:title` is missing.
    pub fn from_tags(
        server_id: &str,
        is_item: bool,
        tags: TagIndex,
        root: Arc<Tag>,
    ) -> ParseResult<Self> {
        let required = |path: &str| {
            lookup(&tags, path)
                .map(str::to_string)
                .ok_or_else(|| ParseError::MissingRequiredElement(path.to_string()))
        };

        let object_id = required("@id")?;
        let parent_id = required("@parentID")?;
        let object_class = required("upnp:class")?;
        let title = required("dc:title")?;
        let kind = ObjectKind::classify(is_item, &object_class);

        Ok(Entry {
            server_id: server_id.to_string(),
            object_id,
            parent_id,
            object_class,
            title,
            kind,
            tags,
            root,
        })
    }
}

/// A ContentDirectory object.
///
/// Equality and hashing only consider the owning server and the object id.
#[derive(Debug, Clone)]
pub enum CdsObject {
    Item(Entry),
    Container(Entry),
    /// Synthetic top of the hierarchy, used to request the first listing
    Root { server_id: String, object_id: String },
}

static EMPTY_INDEX: TagIndex = TagIndex::new();

impl CdsObject {
    pub fn root(server_id: impl Into<String>, object_id: impl Into<String>) -> Self {
        CdsObject::Root {
            server_id: server_id.into(),
            object_id: object_id.into(),
        }
    }

    fn entry(&self) -> Option<&Entry> {
        match self {
            CdsObject::Item(e) | CdsObject::Container(e) => Some(e),
            CdsObject::Root { .. } => None,
        }
    }

    pub fn server_id(&self) -> &str {
        match self {
            CdsObject::Item(e) | CdsObject::Container(e) => &e.server_id,
            CdsObject::Root { server_id, .. } => server_id,
        }
    }

    pub fn object_id(&self) -> &str {
        match self {
            CdsObject::Item(e) | CdsObject::Container(e) => &e.object_id,
            CdsObject::Root { object_id, .. } => object_id,
        }
    }

    pub fn parent_id(&self) -> &str {
        self.entry().map(|e| e.parent_id.as_str()).unwrap_or("-1")
    }

    pub fn object_class(&self) -> &str {
        self.entry()
            .map(|e| e.object_class.as_str())
            .unwrap_or(ROOT_CLASS)
    }

    pub fn title(&self) -> &str {
        self.entry().map(|e| e.title.as_str()).unwrap_or("")
    }

    pub fn kind(&self) -> ObjectKind {
        self.entry()
            .map(|e| e.kind)
            .unwrap_or(ObjectKind::Container)
    }

    pub fn is_item(&self) -> bool {
        matches!(self, CdsObject::Item(_))
    }

    pub fn is_container(&self) -> bool {
        self.kind() == ObjectKind::Container
    }

    pub fn is_root(&self) -> bool {
        matches!(self, CdsObject::Root { .. })
    }

    /// Backing tag index; empty for the root
    pub fn tags(&self) -> &TagIndex {
        self.entry().map(|e| &e.tags).unwrap_or(&EMPTY_INDEX)
    }

    /// The `DIDL-Lite` element of the response this object came from
    pub fn root_tag(&self) -> Option<&Tag> {
        self.entry().map(|e| e.root.as_ref())
    }

    /// Path lookup, see [`crate::path`]
    pub fn get(&self, path: &str) -> Option<&str> {
        lookup(self.tags(), path)
    }

    /// Path lookup on the `n`-th duplicate of the tag
    pub fn get_at(&self, path: &str, n: usize) -> Option<&str> {
        lookup_at(self.tags(), path, n)
    }

    pub fn get_int_opt(&self, path: &str) -> Option<i64> {
        self.get(path).and_then(|s| s.trim().parse().ok())
    }

    pub fn get_int(&self, path: &str, default: i64) -> i64 {
        self.get_int_opt(path).unwrap_or(default)
    }

    /// Date in `YYYY-MM-DD` form; a trailing time part is ignored
    pub fn get_date(&self, path: &str) -> Option<NaiveDate> {
        let raw = self.get(path)?.trim();
        let day = raw.get(..10)?;
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }

    pub fn get_duration(&self, path: &str) -> Option<Duration> {
        self.get(path).and_then(parse_duration)
    }

    pub fn resource_count(&self) -> usize {
        self.tags().count("res")
    }

    pub fn has_resource(&self) -> bool {
        self.resource_count() > 0
    }

    pub fn resources(&self) -> impl Iterator<Item = Resource<'_>> {
        self.tags().tags("res").iter().map(|tag| Resource { tag })
    }

    pub fn resource(&self, index: usize) -> Option<Resource<'_>> {
        self.tags().get("res", index).map(|tag| Resource { tag })
    }

    /// Whether any resource is DRM protected
    pub fn is_protected(&self) -> bool {
        self.resources().any(|r| r.is_protected())
    }

    /// Whether the server allows this object to be destroyed.
    ///
    /// Reads the `restricted` attribute; an object without one is treated
    /// as restricted. The root is never deletable.
    pub fn is_deletable(&self) -> bool {
        match self.get("@restricted") {
            Some(value) => {
                let value = value.trim();
                value == "0" || value.eq_ignore_ascii_case("false")
            }
            None => false,
        }
    }

    /// Index of the resource a renderer should be given.
    ///
    /// Prefers the first unprotected resource whose MIME family matches the
    /// object kind, then any unprotected resource.
    pub fn choose_resource_index(&self) -> Option<usize> {
        let family = self.kind().mime_family();
        let candidates = || self.resources().enumerate().filter(|(_, r)| !r.is_protected());

        family
            .and_then(|family| {
                candidates()
                    .find(|(_, r)| r.mime_type().map_or(false, |m| m.starts_with(family)))
                    .map(|(i, _)| i)
            })
            .or_else(|| candidates().next().map(|(i, _)| i))
    }

    /// Diagnostic rendering of the whole object
    pub fn dump(&self) -> String {
        format!(
            "{} {} (parent {}, class {}, {:?})\n{}",
            self.server_id(),
            self.object_id(),
            self.parent_id(),
            self.object_class(),
            self.kind(),
            self.tags().dump()
        )
    }

    /// Single-object DIDL-Lite document, see [`crate::to_didl_xml`]
    pub fn to_didl_xml(&self) -> Option<String> {
        crate::didl::to_didl_xml(self)
    }
}

impl PartialEq for CdsObject {
    fn eq(&self, other: &Self) -> bool {
        self.server_id() == other.server_id() && self.object_id() == other.object_id()
    }
}

impl Eq for CdsObject {}

impl Hash for CdsObject {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.server_id().hash(state);
        self.object_id().hash(state);
    }
}

/// View over one `res` tag
#[derive(Debug, Clone, Copy)]
pub struct Resource<'a> {
    tag: &'a Tag,
}

impl<'a> Resource<'a> {
    pub fn uri(&self) -> &'a str {
        self.tag.value().trim()
    }

    pub fn protocol_info(&self) -> Option<&'a str> {
        self.tag.attribute("protocolInfo")
    }

    /// Content format field of `protocolInfo` (`protocol:network:format:info`)
    pub fn mime_type(&self) -> Option<&'a str> {
        self.protocol_info()?.split(':').nth(2)
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.tag.attribute(name)
    }

    pub fn duration(&self) -> Option<Duration> {
        self.attribute("duration").and_then(parse_duration)
    }

    pub fn size(&self) -> Option<u64> {
        self.attribute("size").and_then(|s| s.trim().parse().ok())
    }

    pub fn is_protected(&self) -> bool {
        self.mime_type()
            .map_or(false, |mime| mime.contains(DTCP_MIME_MARKER))
    }
}

/// Parse a DIDL-Lite duration, `H+:MM:SS[.F+]` or `H+:MM:SS[.F0/F1]`
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let mut parts = raw.trim().splitn(3, ':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds_part = parts.next()?;

    let (whole, fraction) = match seconds_part.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (seconds_part, None),
    };
    let seconds: u64 = whole.parse().ok()?;
    if minutes >= 60 || seconds >= 60 {
        return None;
    }

    let millis = match fraction {
        Some(f) if f.contains('/') => {
            let (num, den) = f.split_once('/')?;
            let num: u64 = num.parse().ok()?;
            let den: u64 = den.parse().ok()?;
            if den == 0 || num >= den {
                return None;
            }
            num * 1000 / den
        }
        Some(f) if !f.is_empty() => {
            let digits: String = f.chars().take(3).collect();
            let value: u64 = digits.parse().ok()?;
            value * 10u64.pow(3 - digits.len() as u32)
        }
        _ => 0,
    };

    Some(Duration::from_millis(
        ((hours * 60 + minutes) * 60 + seconds) * 1000 + millis,
    ))
}
