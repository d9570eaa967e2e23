//! Flat tag records and the per-object tag index.
//!
//! A DIDL-Lite `item` or `container` is a flat bag of child elements, many
//! of them optional and some repeated (`res`, `upnp:artist`, ...). Rather
//! than a fixed schema, every child is kept as a [`Tag`] and grouped by
//! element name in a [`TagIndex`].

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Ordered attribute list of a single element.
///
/// Insertion order is preserved and names are unique. Duplicated names in
/// the source element are renamed on insertion, see [`Attributes::insert`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute.
    ///
    /// The first occurrence of a name keeps it as is. Later occurrences are
    /// stored as `name#1`, `name#2`, ... so that nothing the server sent is
    /// lost and every stored name stays unique.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();

        if !self.contains(&name) {
            self.0.push((name, value));
            return;
        }

        let mut n = 1;
        loop {
            let candidate = format!("{}#{}", name, n);
            if !self.contains(&candidate) {
                self.0.push((candidate, value));
                return;
            }
            n += 1;
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(k, _)| k == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (k, v) in iter {
            attributes.insert(k, v);
        }
        attributes
    }
}

/// One XML element: its qualified name, text value and attributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Tag {
    name: String,
    value: String,
    attributes: Attributes,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            attributes,
        }
    }

    /// Element name as written in the document, prefix included (`dc:title`)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }
}

/// Element name to same-named tags, in document order.
///
/// The empty key holds the owning element's own tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TagIndex {
    tags: BTreeMap<String, Vec<Tag>>,
}

/// Key under which an element's own tag is stored
pub const OWN_TAG: &str = "";

impl TagIndex {
    pub const fn new() -> Self {
        Self {
            tags: BTreeMap::new(),
        }
    }

    /// Append `tag` to the list stored under `name`
    pub fn put(&mut self, name: impl Into<String>, tag: Tag) {
        self.tags.entry(name.into()).or_default().push(tag);
    }

    /// The `index`-th tag named `name`, if there are that many
    pub fn get(&self, name: &str, index: usize) -> Option<&Tag> {
        self.tags.get(name).and_then(|list| list.get(index))
    }

    /// Every tag named `name`; empty when there is none
    pub fn tags(&self, name: &str) -> &[Tag] {
        self.tags.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, name: &str) -> usize {
        self.tags(name).len()
    }

    /// The owning element's own tag
    pub fn own_tag(&self) -> Option<&Tag> {
        self.get(OWN_TAG, 0)
    }

    /// Child element names, sorted, own tag key excluded
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tags
            .keys()
            .filter(|k| !k.is_empty())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Multi-line rendering of every tag, stable across runs.
    ///
    /// The own tag comes first (keys are sorted and it is the empty key),
    /// duplicates are numbered, attributes keep their insertion order.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (name, list) in &self.tags {
            for (i, tag) in list.iter().enumerate() {
                let label = if name.is_empty() { "<self>" } else { name.as_str() };
                let _ = write!(out, "{}[{}] = {:?}", label, i, tag.value());
                for (k, v) in tag.attributes().iter() {
                    let _ = write!(out, " @{}={:?}", k, v);
                }
                out.push('\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tag(name: &str, value: &str, attrs: &[(&str, &str)]) -> Tag {
        Tag::new(name, value, attrs.iter().copied().collect())
    }

    #[test]
    fn test_put_keeps_arrival_order() {
        let mut index = TagIndex::new();
        index.put("upnp:artist", tag("upnp:artist", "First", &[]));
        index.put("upnp:artist", tag("upnp:artist", "Second", &[("role", "Composer")]));

        assert_eq!(index.count("upnp:artist"), 2);
        assert_eq!(index.get("upnp:artist", 0).unwrap().value(), "First");
        assert_eq!(
            index.get("upnp:artist", 1).unwrap().attribute("role"),
            Some("Composer")
        );
        assert!(index.get("upnp:artist", 2).is_none());
    }

    #[test]
    fn test_missing_name_yields_empty_slice() {
        let index = TagIndex::new();
        assert!(index.tags("res").is_empty());
        assert_eq!(index.count("res"), 0);
        assert!(index.own_tag().is_none());
    }

    #[test]
    fn test_attributes_without_entries_are_empty() {
        let t = tag("dc:title", "Song", &[]);
        assert!(t.attributes().is_empty());
        assert_eq!(t.attribute("anything"), None);
    }

    #[test]
    fn test_duplicate_attribute_names_are_disambiguated() {
        let mut attrs = Attributes::new();
        attrs.insert("size", "1");
        attrs.insert("size", "2");
        attrs.insert("size", "3");

        assert_eq!(attrs.len(), 3);
        assert_eq!(attrs.get("size"), Some("1"));
        assert_eq!(attrs.get("size#1"), Some("2"));
        assert_eq!(attrs.get("size#2"), Some("3"));
    }

    #[test]
    fn test_structural_equality() {
        let mut a = TagIndex::new();
        let mut b = TagIndex::new();
        a.put("dc:title", tag("dc:title", "X", &[("a", "1")]));
        b.put("dc:title", tag("dc:title", "X", &[("a", "1")]));
        assert_eq!(a, b);

        b.put("dc:title", tag("dc:title", "Y", &[]));
        assert_ne!(a, b);
    }

    #[test]
    fn test_dump_is_ordered_and_own_tag_first() {
        let mut index = TagIndex::new();
        index.put("upnp:class", tag("upnp:class", "object.item", &[]));
        index.put(OWN_TAG, tag("item", "", &[("id", "7"), ("parentID", "3")]));
        index.put("dc:title", tag("dc:title", "Song", &[]));

        let dump = index.dump();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines[0], r#"<self>[0] = "" @id="7" @parentID="3""#);
        assert_eq!(lines[1], r#"dc:title[0] = "Song""#);
        assert_eq!(lines[2], r#"upnp:class[0] = "object.item""#);
    }

    proptest! {
        #[test]
        fn prop_get_out_of_range_is_none(name in "[a-z:]{0,12}", count in 0usize..5, extra in 0usize..20) {
            let mut index = TagIndex::new();
            for i in 0..count {
                index.put(name.clone(), tag(&name, &i.to_string(), &[]));
            }
            prop_assert!(index.get(&name, count + extra).is_none());
            prop_assert!(index.get("never-present-name", extra).is_none());
        }
    }
}
