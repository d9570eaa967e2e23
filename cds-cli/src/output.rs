//! Terminal and JSON rendering of catalog objects

use std::sync::Arc;
use std::time::Duration;

use cds_didl::{CdsObject, ObjectKind};
use serde_json::{json, Value};

/// Short label for the listing column
pub fn kind_label(object: &CdsObject) -> &'static str {
    if object.is_root() {
        return "root";
    }
    match object.kind() {
        ObjectKind::Container => "dir",
        ObjectKind::Audio => "audio",
        ObjectKind::Video => "video",
        ObjectKind::Image => "image",
        ObjectKind::Unknown => "item",
    }
}

/// `H:MM:SS`, dropping fractions
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// One line per object: label, id, title and whatever is known about playback
pub fn listing_line(object: &CdsObject) -> String {
    let mut line = format!("[{:<5}] {:<24} {}", kind_label(object), object.object_id(), object.title());

    if object.is_item() {
        if let Some(duration) = object.get_duration("res@duration") {
            line.push_str(&format!("  ({})", format_duration(duration)));
        }
        if object.is_protected() {
            line.push_str("  [protected]");
        } else if !object.has_resource() {
            line.push_str("  [no resource]");
        }
    }

    if object.is_deletable() {
        line.push_str("  *");
    }
    line
}

pub fn object_json(object: &CdsObject) -> Value {
    let resources: Vec<Value> = object
        .resources()
        .map(|r| {
            json!({
                "uri": r.uri(),
                "protocolInfo": r.protocol_info(),
                "duration": r.duration().map(format_duration),
                "size": r.size(),
                "protected": r.is_protected(),
            })
        })
        .collect();

    json!({
        "id": object.object_id(),
        "parentId": object.parent_id(),
        "title": object.title(),
        "class": object.object_class(),
        "kind": kind_label(object),
        "deletable": object.is_deletable(),
        "date": object.get_date("dc:date").map(|d| d.to_string()),
        "duration": object.get_duration("res@duration").map(format_duration),
        "resources": resources,
        "tags": serde_json::to_value(object.tags()).unwrap_or_default(),
    })
}

pub fn listing_json(objects: &[Arc<CdsObject>]) -> Value {
    Value::Array(objects.iter().map(|o| object_json(o)).collect())
}
