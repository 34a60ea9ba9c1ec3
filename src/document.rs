//! The decoded drawing document and its query surface.
//!
//! A document is built in one pass and frozen; entities keep the order in
//! which the object map listed them, which matches on-disk order.

use indexmap::IndexMap;

use crate::entities::{Entity, SpaceKind};
use crate::io::dwg::reader::object_reader::{DecodedObjects, LayerRecord};
use crate::notification::Notification;
use crate::types::{DwgVersion, Handle};

/// Name of the always-present model space layout.
pub const MODEL_LAYOUT: &str = "Model";
/// Name of the paper space layout, present only when used.
pub const PAPER_LAYOUT: &str = "Paper";

/// A decoded DWG drawing.
#[derive(Debug)]
pub struct DwgDocument {
    pub version: DwgVersion,
    /// All entity records, by handle, in decode order
    entities: IndexMap<Handle, Entity>,
    /// Layout name → handles of the entities it owns, in decode order
    layouts: IndexMap<String, Vec<Handle>>,
    /// Layer symbol table, by layer handle
    layers: IndexMap<u64, LayerRecord>,
    /// Non-fatal diagnostics collected during the decode
    notifications: Vec<Notification>,
}

impl DwgDocument {
    /// Freeze the object-pass results into a document.
    pub(crate) fn from_decoded(version: DwgVersion, decoded: DecodedObjects) -> Self {
        let DecodedObjects {
            entities,
            layers,
            notifications,
        } = decoded;

        let mut layouts: IndexMap<String, Vec<Handle>> = IndexMap::new();
        layouts.insert(MODEL_LAYOUT.to_string(), Vec::new());

        let mut by_handle: IndexMap<Handle, Entity> = IndexMap::new();
        for mut entity in entities {
            // Resolve the layer name through the symbol table.
            if let Some(layer_handle) = entity.common.layer_handle {
                entity.common.layer = layers
                    .get(&layer_handle.value())
                    .map(|layer| layer.name.clone());
            }

            let handle = entity.common.handle;
            match entity.common.space {
                SpaceKind::Model => {
                    layouts.get_mut(MODEL_LAYOUT).unwrap().push(handle);
                }
                SpaceKind::Paper => {
                    layouts
                        .entry(PAPER_LAYOUT.to_string())
                        .or_default()
                        .push(handle);
                }
                SpaceKind::Block => {}
            }
            by_handle.insert(handle, entity);
        }

        Self {
            version,
            entities: by_handle,
            layouts,
            layers,
            notifications,
        }
    }

    /// The model space layout. Always present.
    pub fn modelspace(&self) -> Layout<'_> {
        self.layout(MODEL_LAYOUT)
            .expect("model layout always exists")
    }

    /// The paper space layout, when the drawing uses one.
    pub fn paperspace(&self) -> Option<Layout<'_>> {
        self.layout(PAPER_LAYOUT)
    }

    /// A layout by name.
    pub fn layout(&self, name: &str) -> Option<Layout<'_>> {
        self.layouts.get_full(name).map(|(_, name, handles)| Layout {
            document: self,
            name,
            handles,
        })
    }

    /// Names of all layouts, model space first.
    pub fn layout_names(&self) -> impl Iterator<Item = &str> {
        self.layouts.keys().map(String::as_str)
    }

    /// Look up an entity by handle.
    pub fn entity(&self, handle: Handle) -> Option<&Entity> {
        self.entities.get(&handle)
    }

    /// All entity records in decode order, block-owned ones included.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// The layer symbol table.
    pub fn layers(&self) -> impl Iterator<Item = &LayerRecord> {
        self.layers.values()
    }

    /// Diagnostics collected during the decode.
    pub fn warnings(&self) -> &[Notification] {
        &self.notifications
    }

    /// Serialize all entity records to the canonical JSON schema.
    pub fn entities_to_json(&self) -> serde_json::Result<String> {
        let records: Vec<&Entity> = self.entities.values().collect();
        serde_json::to_string_pretty(&records)
    }

    /// Parse entity records back from the canonical JSON schema.
    pub fn entities_from_json(json: &str) -> serde_json::Result<Vec<Entity>> {
        serde_json::from_str(json)
    }
}

/// A view of one layout's entity sequence.
#[derive(Clone, Copy)]
pub struct Layout<'a> {
    document: &'a DwgDocument,
    name: &'a str,
    handles: &'a [Handle],
}

impl<'a> Layout<'a> {
    pub fn name(&self) -> &str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Iterate the layout's entities in source order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Entity> + 'a {
        let document = self.document;
        self.handles
            .iter()
            .filter_map(move |handle| document.entity(*handle))
    }

    /// Filter the layout by entity type.
    ///
    /// `type_spec` is either `"*"` or a whitespace-separated list of type
    /// names (`"LINE ARC"`); matching is case-insensitive and source order
    /// is preserved.
    pub fn query(&self, type_spec: &str) -> Query<'a> {
        let wildcard = type_spec.trim() == "*";
        let names: Vec<String> = if wildcard {
            Vec::new()
        } else {
            type_spec
                .split_whitespace()
                .map(str::to_uppercase)
                .collect()
        };

        Query {
            document: self.document,
            handles: self.handles,
            index: 0,
            wildcard,
            names,
        }
    }
}

/// Lazy iterator over a layout's entities matching a type filter.
pub struct Query<'a> {
    document: &'a DwgDocument,
    handles: &'a [Handle],
    index: usize,
    wildcard: bool,
    names: Vec<String>,
}

impl<'a> Iterator for Query<'a> {
    type Item = &'a Entity;

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.handles.len() {
            let handle = self.handles[self.index];
            self.index += 1;
            if let Some(entity) = self.document.entity(handle) {
                if self.wildcard || self.names.iter().any(|n| n == entity.dxftype()) {
                    return Some(entity);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Circle, EntityCommon, EntityKind, Line};

    fn entity(handle: u64, kind: EntityKind, space: SpaceKind) -> Entity {
        Entity {
            common: EntityCommon {
                space,
                ..EntityCommon::new(Handle::new(handle))
            },
            kind,
        }
    }

    fn sample_document() -> DwgDocument {
        let decoded = DecodedObjects {
            entities: vec![
                entity(0x10, EntityKind::Line(Line::default()), SpaceKind::Model),
                entity(0x11, EntityKind::Circle(Circle::default()), SpaceKind::Model),
                entity(0x12, EntityKind::Line(Line::default()), SpaceKind::Model),
                entity(0x13, EntityKind::Line(Line::default()), SpaceKind::Paper),
            ],
            layers: IndexMap::new(),
            notifications: Vec::new(),
        };
        DwgDocument::from_decoded(DwgVersion::AC1015, decoded)
    }

    #[test]
    fn test_modelspace_order() {
        let doc = sample_document();
        let handles: Vec<u64> = doc
            .modelspace()
            .iter()
            .map(|e| e.handle().value())
            .collect();
        assert_eq!(handles, vec![0x10, 0x11, 0x12]);
    }

    #[test]
    fn test_query_filter_preserves_order() {
        let doc = sample_document();
        let lines: Vec<u64> = doc
            .modelspace()
            .query("LINE")
            .map(|e| e.handle().value())
            .collect();
        assert_eq!(lines, vec![0x10, 0x12]);

        let all: Vec<u64> = doc
            .modelspace()
            .query("*")
            .map(|e| e.handle().value())
            .collect();
        assert_eq!(all, vec![0x10, 0x11, 0x12]);
    }

    #[test]
    fn test_query_multiple_types() {
        let doc = sample_document();
        let count = doc.modelspace().query("LINE CIRCLE").count();
        assert_eq!(count, 3);
        // Case-insensitive
        assert_eq!(doc.modelspace().query("line").count(), 2);
        assert_eq!(doc.modelspace().query("MTEXT").count(), 0);
    }

    #[test]
    fn test_paperspace_present_when_used() {
        let doc = sample_document();
        let paper = doc.paperspace().unwrap();
        assert_eq!(paper.len(), 1);
    }

    #[test]
    fn test_paperspace_absent_when_unused() {
        let decoded = DecodedObjects {
            entities: vec![entity(
                0x10,
                EntityKind::Line(Line::default()),
                SpaceKind::Model,
            )],
            ..Default::default()
        };
        let doc = DwgDocument::from_decoded(DwgVersion::AC1015, decoded);
        assert!(doc.paperspace().is_none());
        assert_eq!(doc.layout_names().count(), 1);
    }

    #[test]
    fn test_handle_uniqueness() {
        let doc = sample_document();
        let mut seen = std::collections::HashSet::new();
        for e in doc.entities() {
            assert!(seen.insert(e.handle()));
        }
    }
}
