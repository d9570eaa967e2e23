//! Compact path expressions over a [`TagIndex`].
//!
//! ```text
//! path  := [tag] ['[' index ']'] ['@' attr]
//! ```
//!
//! | expression            | resolves to                                    |
//! |-----------------------|------------------------------------------------|
//! | `dc:title`            | text of the first `dc:title`                   |
//! | `res[1]@protocolInfo` | `protocolInfo` of the second `res`             |
//! | `@id`                 | `id` attribute of the object's own element     |
//! | `` (empty)            | text of the own element (always empty)         |
//!
//! The attribute is always read from the tag selected by the index; a
//! missing attribute on that tag is `None` even if another duplicate has it.

use crate::tag::{Tag, TagIndex, OWN_TAG};

/// A parsed path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPath<'a> {
    pub tag: &'a str,
    pub index: usize,
    pub attribute: Option<&'a str>,
}

impl<'a> TagPath<'a> {
    /// Parse `expr`, returning `None` for malformed expressions
    pub fn parse(expr: &'a str) -> Option<Self> {
        let (head, attribute) = match expr.split_once('@') {
            Some((_, "")) => return None,
            Some((head, attr)) => (head, Some(attr)),
            None => (expr, None),
        };

        let (tag, index) = match head.strip_suffix(']') {
            Some(rest) => {
                let (tag, idx) = rest.split_once('[')?;
                (tag, idx.trim().parse::<usize>().ok()?)
            }
            None => (head, 0),
        };

        if tag.contains('[') || tag.contains(']') {
            return None;
        }

        Some(TagPath {
            tag,
            index,
            attribute,
        })
    }

    /// Replace the index, as when a caller supplies it separately
    pub fn at(self, index: usize) -> Self {
        Self { index, ..self }
    }

    /// The tag this path selects
    pub fn select<'i>(&self, index: &'i TagIndex) -> Option<&'i Tag> {
        let key = if self.tag.is_empty() { OWN_TAG } else { self.tag };
        index.get(key, self.index)
    }

    /// Resolve to the attribute or text value
    pub fn resolve<'i>(&self, index: &'i TagIndex) -> Option<&'i str> {
        let tag = self.select(index)?;
        match self.attribute {
            Some(attr) => tag.attribute(attr),
            None => Some(tag.value()),
        }
    }
}

/// Resolve `expr` against `index`
pub fn lookup<'i>(index: &'i TagIndex, expr: &str) -> Option<&'i str> {
    TagPath::parse(expr)?.resolve(index)
}

/// Resolve `expr` against `index`, selecting the `n`-th duplicate tag
pub fn lookup_at<'i>(index: &'i TagIndex, expr: &str, n: usize) -> Option<&'i str> {
    TagPath::parse(expr)?.at(n).resolve(index)
}
