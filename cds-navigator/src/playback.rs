//! Seam towards whatever plays the selected item.

use std::sync::Arc;

use cds_didl::CdsObject;

/// A selected item together with the resource a renderer should use
#[derive(Debug, Clone)]
pub struct Selection {
    pub entity: Arc<CdsObject>,
    /// Chosen `res` index, see [`CdsObject::choose_resource_index`]
    pub resource_index: Option<usize>,
    pub uri: Option<String>,
    pub mime_type: Option<String>,
    /// Single-object DIDL-Lite document to send along with the URI
    pub metadata: Option<String>,
}

impl Selection {
    pub fn for_entity(entity: Arc<CdsObject>) -> Self {
        let resource_index = entity.choose_resource_index();
        let resource = resource_index.and_then(|i| entity.resource(i));
        let uri = resource.map(|r| r.uri().to_string());
        let mime_type = resource.and_then(|r| r.mime_type()).map(str::to_string);
        let metadata = entity.to_didl_xml();

        Self {
            entity,
            resource_index,
            uri,
            mime_type,
            metadata,
        }
    }

    pub fn is_playable(&self) -> bool {
        self.uri.is_some()
    }
}

/// Receives the navigator's item selections
pub trait PlaybackTarget: Send {
    fn on_selection(&mut self, selection: Selection);
}
