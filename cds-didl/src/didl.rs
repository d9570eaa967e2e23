//! DIDL-Lite documents: batch parsing and single-object serialization.
//!
//! DIDL-Lite example:
//! ```xml
//! <DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/"
//!            xmlns:dc="http://purl.org/dc/elements/1.1/"
//!            xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/">
//!   <container id="1" parentID="0" restricted="1" childCount="12">
//!     <dc:title>Music</dc:title>
//!     <upnp:class>object.container.storageFolder</upnp:class>
//!   </container>
//!   <item id="1$4" parentID="1" restricted="0">
//!     <dc:title>Song Title</dc:title>
//!     <upnp:class>object.item.audioItem.musicTrack</upnp:class>
//!     <res protocolInfo="http-get:*:audio/mpeg:*" duration="0:03:58">http://host/song.mp3</res>
//!   </item>
//! </DIDL-Lite>
//! ```
//!
//! Only the direct children of `item`/`container` are indexed; anything
//! nested deeper is skipped.

use std::sync::Arc;

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::error::{ParseError, ParseResult};
use crate::object::{CdsObject, Entry};
use crate::tag::{Attributes, Tag, TagIndex, OWN_TAG};

pub const DIDL_ROOT: &str = "DIDL-Lite";
pub const DIDL_NAMESPACE: &str = "urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/";
pub const DC_NAMESPACE: &str = "http://purl.org/dc/elements/1.1/";
pub const UPNP_NAMESPACE: &str = "urn:schemas-upnp-org:metadata-1-0/upnp/";

/// Objects parsed out of one DIDL-Lite document
#[derive(Debug, Clone)]
pub struct DidlBatch {
    /// The `DIDL-Lite` element itself, shared by every object of the batch
    pub root: Arc<Tag>,
    pub objects: Vec<Arc<CdsObject>>,
    /// Elements dropped because a mandatory field was missing or malformed
    pub skipped: usize,
}

impl DidlBatch {
    fn empty() -> Self {
        Self {
            root: Arc::new(default_root()),
            objects: Vec::new(),
            skipped: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

struct EntryBuilder {
    is_item: bool,
    tags: TagIndex,
    malformed: bool,
}

struct ChildBuilder {
    name: String,
    attributes: Attributes,
    value: String,
    malformed: bool,
}

/// Parse a DIDL-Lite document returned by a server.
///
/// Elements missing a mandatory field are dropped and counted in
/// [`DidlBatch::skipped`]; only a document that is not well-formed XML, or
/// whose root is not `DIDL-Lite`, fails as a whole. A blank document is an
/// empty batch.
pub fn parse_batch(xml: &str, server_id: &str) -> ParseResult<DidlBatch> {
    if xml.trim().is_empty() {
        return Ok(DidlBatch::empty());
    }

    let mut reader = Reader::from_str(xml);

    let mut batch = DidlBatch::empty();
    let mut seen_root = false;
    let mut depth = 0usize;
    let mut entry: Option<EntryBuilder> = None;
    let mut child: Option<ChildBuilder> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            ParseError::XmlDeserializationFailed(format!(
                "at position {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(start) => {
                depth += 1;
                open_element(&start, depth, &mut batch, &mut seen_root, &mut entry, &mut child)?;
            }
            Event::Empty(start) => {
                depth += 1;
                open_element(&start, depth, &mut batch, &mut seen_root, &mut entry, &mut child)?;
                close_element(depth, server_id, &mut batch, &mut entry, &mut child);
                depth -= 1;
            }
            Event::End(_) => {
                close_element(depth, server_id, &mut batch, &mut entry, &mut child);
                depth = depth.saturating_sub(1);
            }
            Event::Text(text) if depth == 3 => {
                if let Some(child) = child.as_mut() {
                    match text.unescape() {
                        Ok(value) => child.value.push_str(&value),
                        Err(_) => child.value.push_str(&String::from_utf8_lossy(&text)),
                    }
                }
            }
            Event::CData(data) if depth == 3 => {
                if let Some(child) = child.as_mut() {
                    child.value.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(ParseError::InvalidXmlStructure(format!(
            "missing {} root element",
            DIDL_ROOT
        )));
    }

    if batch.skipped > 0 {
        debug!(
            server_id,
            parsed = batch.objects.len(),
            skipped = batch.skipped,
            "dropped malformed DIDL-Lite elements"
        );
    }

    Ok(batch)
}

fn open_element(
    start: &BytesStart<'_>,
    depth: usize,
    batch: &mut DidlBatch,
    seen_root: &mut bool,
    entry: &mut Option<EntryBuilder>,
    child: &mut Option<ChildBuilder>,
) -> ParseResult<()> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();

    match depth {
        1 => {
            if start.local_name().as_ref() != DIDL_ROOT.as_bytes() {
                return Err(ParseError::InvalidXmlStructure(format!(
                    "expected {} root, found {}",
                    DIDL_ROOT, name
                )));
            }
            let attributes = read_attributes(start).unwrap_or_default();
            batch.root = Arc::new(Tag::new(name, "", attributes));
            *seen_root = true;
        }
        2 => {
            let is_item = match start.local_name().as_ref() {
                b"item" => true,
                b"container" => false,
                _ => {
                    *entry = None;
                    return Ok(());
                }
            };
            let (attributes, malformed) = match read_attributes(start) {
                Ok(attributes) => (attributes, false),
                Err(_) => (Attributes::new(), true),
            };
            let mut tags = TagIndex::new();
            tags.put(OWN_TAG, Tag::new(name, "", attributes));
            *entry = Some(EntryBuilder {
                is_item,
                tags,
                malformed,
            });
        }
        3 if entry.is_some() => {
            let (attributes, malformed) = match read_attributes(start) {
                Ok(attributes) => (attributes, false),
                Err(_) => (Attributes::new(), true),
            };
            *child = Some(ChildBuilder {
                name,
                attributes,
                value: String::new(),
                malformed,
            });
        }
        _ => {}
    }

    Ok(())
}

fn close_element(
    depth: usize,
    server_id: &str,
    batch: &mut DidlBatch,
    entry: &mut Option<EntryBuilder>,
    child: &mut Option<ChildBuilder>,
) {
    match depth {
        3 => {
            if let (Some(done), Some(builder)) = (child.take(), entry.as_mut()) {
                if done.malformed {
                    builder.malformed = true;
                }
                let tag = Tag::new(done.name.clone(), done.value.trim(), done.attributes);
                builder.tags.put(done.name, tag);
            }
        }
        2 => {
            let Some(builder) = entry.take() else {
                return;
            };
            if builder.malformed {
                batch.skipped += 1;
                return;
            }
            match Entry::from_tags(server_id, builder.is_item, builder.tags, batch.root.clone()) {
                Ok(parsed) => {
                    let object = if builder.is_item {
                        CdsObject::Item(parsed)
                    } else {
                        CdsObject::Container(parsed)
                    };
                    batch.objects.push(Arc::new(object));
                }
                Err(e) => {
                    debug!(server_id, error = %e, "skipping DIDL-Lite element");
                    batch.skipped += 1;
                }
            }
        }
        _ => {}
    }
}

fn read_attributes(start: &BytesStart<'_>) -> Result<Attributes, String> {
    let mut attributes = Attributes::new();
    for attr in start.attributes().with_checks(false) {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|e| e.to_string())?;
        attributes.insert(key, value.into_owned());
    }
    Ok(attributes)
}

fn default_root() -> Tag {
    Tag::new(
        DIDL_ROOT,
        "",
        [
            ("xmlns", DIDL_NAMESPACE),
            ("xmlns:dc", DC_NAMESPACE),
            ("xmlns:upnp", UPNP_NAMESPACE),
        ]
        .into_iter()
        .collect(),
    )
}

/// Serialize one object back into a standalone DIDL-Lite document.
///
/// Used to hand metadata to a renderer together with a resource URI. The
/// namespace declarations come from the document the object was parsed
/// from; the standard ones are added when missing. Returns `None` for the
/// synthetic root.
pub fn to_didl_xml(object: &CdsObject) -> Option<String> {
    let own = object.tags().own_tag()?;
    let root = object.root_tag().cloned().unwrap_or_else(default_root);

    let mut root_attributes: Vec<(&str, &str)> = root.attributes().iter().collect();
    for (name, value) in [
        ("xmlns", DIDL_NAMESPACE),
        ("xmlns:dc", DC_NAMESPACE),
        ("xmlns:upnp", UPNP_NAMESPACE),
    ] {
        if root.attribute(name).is_none() {
            root_attributes.push((name, value));
        }
    }

    let element = if object.is_item() { "item" } else { "container" };

    let mut out = String::new();
    out.push('<');
    out.push_str(DIDL_ROOT);
    push_attributes(&mut out, root_attributes.into_iter());
    out.push('>');

    out.push('<');
    out.push_str(element);
    push_attributes(&mut out, own.attributes().iter());
    out.push('>');

    let tags = object.tags();
    let leading = ["dc:title", "upnp:class"];
    let ordered = leading
        .iter()
        .copied()
        .chain(tags.names().filter(|n| !leading.contains(n) && *n != "res"))
        .chain(std::iter::once("res"));

    for name in ordered {
        for tag in tags.tags(name) {
            out.push('<');
            out.push_str(tag.name());
            push_attributes(&mut out, tag.attributes().iter());
            out.push('>');
            out.push_str(&escape(tag.value()));
            out.push_str("</");
            out.push_str(tag.name());
            out.push('>');
        }
    }

    out.push_str("</");
    out.push_str(element);
    out.push_str("></");
    out.push_str(DIDL_ROOT);
    out.push('>');

    Some(out)
}

fn push_attributes<'a>(out: &mut String, attributes: impl Iterator<Item = (&'a str, &'a str)>) {
    for (name, value) in attributes {
        // disambiguated duplicates are not valid XML names
        if name.contains('#') {
            continue;
        }
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape(value));
        out.push('"');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectKind;
    use proptest::prelude::*;

    const HEADER: &str = r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/">"#;

    fn doc(body: &str) -> String {
        format!("{}{}</DIDL-Lite>", HEADER, body)
    }

    #[test]
    fn test_parse_item_and_container() {
        let xml = doc(concat!(
            r#"<container id="1" parentID="0" restricted="1" childCount="2"><dc:title>Music</dc:title><upnp:class>object.container.storageFolder</upnp:class></container>"#,
            r#"<item id="1$4" parentID="1" restricted="0"><dc:title>Song &amp; Dance</dc:title><upnp:class>object.item.audioItem.musicTrack</upnp:class>"#,
            r#"<res protocolInfo="http-get:*:audio/mpeg:*" duration="0:03:58">http://host/song.mp3</res></item>"#,
        ));

        let batch = parse_batch(&xml, "srv").unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.skipped, 0);

        let folder = &batch.objects[0];
        assert_eq!(folder.kind(), ObjectKind::Container);
        assert_eq!(folder.title(), "Music");
        assert_eq!(folder.get_int("@childCount", 0), 2);

        let song = &batch.objects[1];
        assert_eq!(song.object_id(), "1$4");
        assert_eq!(song.parent_id(), "1");
        assert_eq!(song.title(), "Song & Dance");
        assert_eq!(song.kind(), ObjectKind::Audio);
        assert_eq!(song.get("res"), Some("http://host/song.mp3"));
        assert_eq!(song.get("res@duration"), Some("0:03:58"));
        assert_eq!(song.server_id(), "srv");
        assert_eq!(song.root_tag().unwrap().name(), "DIDL-Lite");
    }

    #[test]
    fn test_malformed_element_is_dropped_not_batch() {
        let xml = doc(concat!(
            r#"<item id="a" parentID="0"><upnp:class>object.item</upnp:class></item>"#,
            r#"<item parentID="0"><dc:title>No id</dc:title><upnp:class>object.item</upnp:class></item>"#,
            r#"<item id="c" parentID="0"><dc:title>Good</dc:title><upnp:class>object.item.imageItem.photo</upnp:class></item>"#,
        ));

        let batch = parse_batch(&xml, "srv").unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.skipped, 2);
        assert_eq!(batch.objects[0].object_id(), "c");
        assert_eq!(batch.objects[0].kind(), ObjectKind::Image);
    }

    #[test]
    fn test_nested_children_are_ignored() {
        let xml = doc(
            r#"<item id="1" parentID="0"><dc:title>T<b>bold</b></dc:title><upnp:class>object.item</upnp:class><desc id="x"><inner>secret</inner></desc></item>"#,
        );

        let batch = parse_batch(&xml, "srv").unwrap();
        let obj = &batch.objects[0];
        assert_eq!(obj.title(), "T");
        assert_eq!(obj.get("desc"), Some(""));
        assert_eq!(obj.get("desc@id"), Some("x"));
        assert_eq!(obj.get("inner"), None);
    }

    #[test]
    fn test_duplicate_tags_keep_document_order() {
        let xml = doc(
            r#"<item id="1" parentID="0"><dc:title>T</dc:title><upnp:class>object.item.audioItem</upnp:class><upnp:artist role="Performer">A</upnp:artist><upnp:artist>B</upnp:artist><res>u1</res><res protocolInfo="http-get:*:audio/flac:*">u2</res></item>"#,
        );

        let obj = parse_batch(&xml, "srv").unwrap().objects.remove(0);
        assert_eq!(obj.get_at("upnp:artist", 1), Some("B"));
        assert_eq!(obj.get("upnp:artist@role"), Some("Performer"));
        assert_eq!(obj.get("upnp:artist[1]@role"), None);
        assert_eq!(obj.resource_count(), 2);
        assert_eq!(obj.resource(1).unwrap().mime_type(), Some("audio/flac"));
    }

    #[test]
    fn test_cdata_and_self_closing_children() {
        let xml = doc(
            r#"<item id="1" parentID="0"><dc:title><![CDATA[A <b> C]]></dc:title><upnp:class>object.item</upnp:class><upnp:albumArtURI/></item>"#,
        );

        let obj = parse_batch(&xml, "srv").unwrap().objects.remove(0);
        assert_eq!(obj.title(), "A <b> C");
        assert_eq!(obj.get("upnp:albumArtURI"), Some(""));
    }

    #[test]
    fn test_blank_document_is_empty_batch() {
        let batch = parse_batch("  \n", "srv").unwrap();
        assert!(batch.is_empty());
        assert_eq!(batch.skipped, 0);
    }

    #[test]
    fn test_wrong_root_is_rejected() {
        let result = parse_batch("<invalid>not didl-lite</invalid>", "srv");
        assert!(matches!(result, Err(ParseError::InvalidXmlStructure(_))));
    }

    #[test]
    fn test_broken_xml_is_rejected() {
        let result = parse_batch(&doc(r#"<item id="1"><dc:title>x</item>"#), "srv");
        assert!(matches!(result, Err(ParseError::XmlDeserializationFailed(_))));
    }

    #[test]
    fn test_to_didl_xml_round_trips_through_parser() {
        let xml = doc(
            r#"<item id="9" parentID="2" restricted="0"><upnp:album>Al &lt;1&gt;</upnp:album><dc:title>T</dc:title><upnp:class>object.item.videoItem</upnp:class><res protocolInfo="http-get:*:video/mp4:*">http://h/v.mp4?a=1&amp;b=2</res></item>"#,
        );
        let original = parse_batch(&xml, "srv").unwrap().objects.remove(0);

        let rebuilt = to_didl_xml(&original).unwrap();
        assert!(rebuilt.starts_with("<DIDL-Lite"));
        assert!(rebuilt.contains(r#"xmlns:dc="http://purl.org/dc/elements/1.1/""#));
        assert!(rebuilt.contains("<dc:title>T</dc:title><upnp:class>"));

        let reparsed = parse_batch(&rebuilt, "srv").unwrap().objects.remove(0);
        assert_eq!(reparsed.tags(), original.tags());
    }

    #[test]
    fn test_to_didl_xml_skips_root() {
        assert!(to_didl_xml(&CdsObject::root("srv", "0")).is_none());
    }

    proptest! {
        #[test]
        fn prop_parsed_never_exceeds_elements(flags in proptest::collection::vec(0u8..4, 0..20)) {
            // 0: valid item, 1: missing title, 2: missing id, 3: container
            let mut body = String::new();
            for (i, flag) in flags.iter().enumerate() {
                let element = match flag {
                    0 => format!(r#"<item id="{i}" parentID="0"><dc:title>t</dc:title><upnp:class>object.item</upnp:class></item>"#),
                    1 => format!(r#"<item id="{i}" parentID="0"><upnp:class>object.item</upnp:class></item>"#),
                    2 => r#"<item parentID="0"><dc:title>t</dc:title><upnp:class>object.item</upnp:class></item>"#.to_string(),
                    _ => format!(r#"<container id="{i}" parentID="0"><dc:title>c</dc:title><upnp:class>object.container</upnp:class></container>"#),
                };
                body.push_str(&element);
            }

            let batch = parse_batch(&doc(&body), "srv").unwrap();
            let valid = flags.iter().filter(|f| **f == 0 || **f == 3).count();
            prop_assert_eq!(batch.len(), valid);
            prop_assert_eq!(batch.len() + batch.skipped, flags.len());
        }
    }
}
