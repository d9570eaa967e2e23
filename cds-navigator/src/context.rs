//! One level of the navigation stack.

use std::sync::Arc;

use cds_api::CancellationToken;
use cds_didl::CdsObject;

/// Lifecycle of a context's listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Never fetched
    Idle,
    InProgress,
    Populated,
    /// Stopped early; entities hold whatever arrived before the failure
    Failed,
}

/// Direction of travel in the neighbor scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Stop at the end (or start) of the listing
    Sequential,
    /// Wrap around, giving up when back at the starting entity
    Loop,
}

#[derive(Debug)]
struct Fetch {
    generation: u64,
    cancel: CancellationToken,
}

/// A visited container and its cached listing
#[derive(Debug)]
pub struct DirectoryContext {
    id: u64,
    parent_id: String,
    parent_name: String,
    entities: Vec<Arc<CdsObject>>,
    selected: Option<Arc<CdsObject>>,
    state: ContextState,
    fetch: Option<Fetch>,
}

impl DirectoryContext {
    pub(crate) fn new(id: u64, parent_id: impl Into<String>, parent_name: impl Into<String>) -> Self {
        Self {
            id,
            parent_id: parent_id.into(),
            parent_name: parent_name.into(),
            entities: Vec::new(),
            selected: None,
            state: ContextState::Idle,
            fetch: None,
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    /// Object id of the listed container
    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }

    /// Title of the listed container; empty for the root
    pub fn parent_name(&self) -> &str {
        &self.parent_name
    }

    pub fn entities(&self) -> &[Arc<CdsObject>] {
        &self.entities
    }

    pub fn selected(&self) -> Option<&Arc<CdsObject>> {
        self.selected.as_ref()
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    pub fn is_in_progress(&self) -> bool {
        self.state == ContextState::InProgress
    }

    pub fn index_of(&self, entity: &CdsObject) -> Option<usize> {
        self.entities.iter().position(|e| e.as_ref() == entity)
    }

    /// The listed instance equal to `entity`
    pub fn member(&self, entity: &CdsObject) -> Option<&Arc<CdsObject>> {
        self.index_of(entity).map(|i| &self.entities[i])
    }

    /// Select `entity` if it is listed here, otherwise clear the selection.
    ///
    /// Returns the new selection.
    pub(crate) fn select(&mut self, entity: Option<&CdsObject>) -> Option<Arc<CdsObject>> {
        self.selected = entity.and_then(|e| self.member(e)).cloned();
        self.selected.clone()
    }

    /// Cancel any fetch, forget the listing and enter `InProgress` under a
    /// new generation.
    pub(crate) fn clear_state(&mut self, generation: u64, cancel: CancellationToken) {
        self.cancel_fetch();
        self.entities.clear();
        self.selected = None;
        self.state = ContextState::InProgress;
        self.fetch = Some(Fetch { generation, cancel });
    }

    pub(crate) fn cancel_fetch(&mut self) {
        if let Some(fetch) = self.fetch.take() {
            fetch.cancel.cancel();
        }
        if self.state == ContextState::InProgress {
            self.state = ContextState::Idle;
        }
    }

    /// Whether a worker message of `generation` belongs to the live fetch
    pub(crate) fn accepts(&self, generation: u64) -> bool {
        self.state == ContextState::InProgress
            && self.fetch.as_ref().map_or(false, |f| f.generation == generation)
    }

    pub(crate) fn append(&mut self, objects: Vec<Arc<CdsObject>>) {
        self.entities.extend(objects);
    }

    pub(crate) fn finish(&mut self, failed: bool) {
        self.fetch = None;
        self.state = if failed {
            ContextState::Failed
        } else {
            ContextState::Populated
        };
    }

    /// Next playable sibling of `current` towards the end of the listing
    pub fn find_next(&self, current: &CdsObject, mode: ScanMode) -> Option<Arc<CdsObject>> {
        self.scan(current, mode, true)
    }

    /// Next playable sibling of `current` towards the start of the listing
    pub fn find_previous(&self, current: &CdsObject, mode: ScanMode) -> Option<Arc<CdsObject>> {
        self.scan(current, mode, false)
    }

    fn scan(&self, current: &CdsObject, mode: ScanMode, forward: bool) -> Option<Arc<CdsObject>> {
        let start = self.index_of(current)?;
        let len = self.entities.len();

        let candidates: Box<dyn Iterator<Item = usize>> = match (mode, forward) {
            (ScanMode::Sequential, true) => Box::new(start + 1..len),
            (ScanMode::Sequential, false) => Box::new((0..start).rev()),
            (ScanMode::Loop, true) => Box::new((1..len).map(move |step| (start + step) % len)),
            (ScanMode::Loop, false) => Box::new((1..len).map(move |step| (start + len - step) % len)),
        };

        candidates
            .map(|i| &self.entities[i])
            .find(|target| is_neighbor(target, current))
            .cloned()
    }
}

/// Same kind, something to play, nothing DRM protected
fn is_neighbor(target: &CdsObject, current: &CdsObject) -> bool {
    target.kind() == current.kind() && target.has_resource() && !target.is_protected()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cds_didl::parse_batch;
    use proptest::prelude::*;
    use rstest::rstest;

    fn audio(id: &str) -> String {
        format!(
            r#"<item id="{id}" parentID="1"><dc:title>{id}</dc:title><upnp:class>object.item.audioItem.musicTrack</upnp:class><res protocolInfo="http-get:*:audio/mpeg:*">http://h/{id}.mp3</res></item>"#
        )
    }

    fn photo(id: &str) -> String {
        format!(
            r#"<item id="{id}" parentID="1"><dc:title>{id}</dc:title><upnp:class>object.item.imageItem.photo</upnp:class><res protocolInfo="http-get:*:image/jpeg:*">http://h/{id}.jpg</res></item>"#
        )
    }

    fn protected(id: &str) -> String {
        format!(
            r#"<item id="{id}" parentID="1"><dc:title>{id}</dc:title><upnp:class>object.item.audioItem.musicTrack</upnp:class><res protocolInfo="http-get:*:application/x-dtcp1;CONTENTFORMAT=audio/mpeg:*">http://h/{id}</res></item>"#
        )
    }

    fn silent(id: &str) -> String {
        format!(
            r#"<item id="{id}" parentID="1"><dc:title>{id}</dc:title><upnp:class>object.item.audioItem.musicTrack</upnp:class></item>"#
        )
    }

    fn folder(id: &str) -> String {
        format!(
            r#"<container id="{id}" parentID="1"><dc:title>{id}</dc:title><upnp:class>object.container</upnp:class></container>"#
        )
    }

    fn populated(elements: &[String]) -> DirectoryContext {
        let xml = format!(
            r#"<DIDL-Lite xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/">{}</DIDL-Lite>"#,
            elements.concat()
        );

        let mut context = DirectoryContext::new(1, "1", "Music");
        context.clear_state(1, CancellationToken::new());
        context.append(parse_batch(&xml, "srv").unwrap().objects);
        context.finish(false);
        context
    }

    /// a1 p1 a2 x(protected) s(no res) f(folder) a3
    fn listing() -> DirectoryContext {
        populated(&[
            audio("a1"),
            photo("p1"),
            audio("a2"),
            protected("x"),
            silent("s"),
            folder("f"),
            audio("a3"),
        ])
    }

    fn entity(context: &DirectoryContext, id: &str) -> Arc<CdsObject> {
        context.member(&CdsObject::root("srv", id)).unwrap().clone()
    }

    fn found(result: Option<Arc<CdsObject>>) -> Option<String> {
        result.map(|o| o.object_id().to_string())
    }

    #[rstest]
    #[case("a1", ScanMode::Sequential, Some("a2"))]
    #[case("a2", ScanMode::Sequential, Some("a3"))]
    #[case("a3", ScanMode::Sequential, None)]
    #[case("a3", ScanMode::Loop, Some("a1"))]
    #[case("p1", ScanMode::Sequential, None)]
    #[case("p1", ScanMode::Loop, None)]
    fn test_find_next(#[case] from: &str, #[case] mode: ScanMode, #[case] expected: Option<&str>) {
        let context = listing();
        let current = entity(&context, from);
        assert_eq!(
            found(context.find_next(&current, mode)),
            expected.map(str::to_string)
        );
    }

    #[rstest]
    #[case("a3", ScanMode::Sequential, Some("a2"))]
    #[case("a1", ScanMode::Sequential, None)]
    #[case("a1", ScanMode::Loop, Some("a3"))]
    #[case("a2", ScanMode::Loop, Some("a1"))]
    fn test_find_previous(#[case] from: &str, #[case] mode: ScanMode, #[case] expected: Option<&str>) {
        let context = listing();
        let current = entity(&context, from);
        assert_eq!(
            found(context.find_previous(&current, mode)),
            expected.map(str::to_string)
        );
    }

    #[test]
    fn test_scan_from_unlisted_entity_is_none() {
        let context = listing();
        let stranger = CdsObject::root("srv", "zz");
        assert!(context.find_next(&stranger, ScanMode::Loop).is_none());
    }

    #[test]
    fn test_select_non_member_clears_selection() {
        let mut context = listing();
        let a2 = entity(&context, "a2");
        assert!(context.select(Some(&a2)).is_some());
        assert_eq!(context.selected().map(|o| o.object_id()), Some("a2"));

        assert!(context.select(Some(&CdsObject::root("other", "a2"))).is_none());
        assert!(context.selected().is_none());
    }

    #[test]
    fn test_clear_state_cancels_previous_fetch() {
        let mut context = DirectoryContext::new(1, "1", "Music");
        let first = CancellationToken::new();
        context.clear_state(1, first.clone());
        assert!(context.accepts(1));

        context.clear_state(2, CancellationToken::new());
        assert!(first.is_canceled());
        assert!(!context.accepts(1));
        assert!(context.accepts(2));
        assert!(context.is_in_progress());
    }

    #[test]
    fn test_finish_keeps_partial_entities() {
        let mut context = listing();
        context.clear_state(2, CancellationToken::new());
        context.append(listing().entities().to_vec()[..2].to_vec());
        context.finish(true);

        assert_eq!(context.state(), ContextState::Failed);
        assert_eq!(context.entities().len(), 2);
        assert!(!context.accepts(2));
    }

    proptest! {
        #[test]
        fn prop_scan_lands_on_valid_neighbor(
            flags in proptest::collection::vec(0u8..5, 1..16),
            pick in any::<prop::sample::Index>(),
            forward in any::<bool>(),
            looping in any::<bool>(),
        ) {
            let elements: Vec<String> = flags
                .iter()
                .enumerate()
                .map(|(i, flag)| {
                    let id = format!("e{}", i);
                    match flag {
                        0 => audio(&id),
                        1 => photo(&id),
                        2 => protected(&id),
                        3 => silent(&id),
                        _ => folder(&id),
                    }
                })
                .collect();
            let context = populated(&elements);
            let start = pick.index(flags.len());
            let current = context.entities()[start].clone();
            let mode = if looping { ScanMode::Loop } else { ScanMode::Sequential };

            let found = if forward {
                context.find_next(&current, mode)
            } else {
                context.find_previous(&current, mode)
            };

            if let Some(target) = found {
                let index = context.index_of(&target).unwrap();
                prop_assert_ne!(index, start);
                prop_assert!(is_neighbor(&target, &current));
                if mode == ScanMode::Sequential {
                    prop_assert_eq!(index > start, forward);
                }
            }
        }
    }
}
