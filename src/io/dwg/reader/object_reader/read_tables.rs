//! Table entry parsers.
//!
//! Only the LAYER table is decoded: entity records resolve their layer
//! handles against it. Other table entries are skipped by the dispatcher.

use crate::error::Result;
use crate::types::Color;

use super::{ObjectReader, StreamSet};

/// One entry of the layer symbol table.
#[derive(Debug, Clone, Default)]
pub struct LayerRecord {
    pub handle: u64,
    pub name: String,
    pub frozen: bool,
    pub on: bool,
    pub locked: bool,
    pub plottable: bool,
    pub color: Color,
    pub linetype_handle: u64,
}

impl<'a> ObjectReader<'a> {
    pub(super) fn read_layer(
        &mut self,
        map_handle: u64,
        streams: &mut StreamSet<'a>,
    ) -> Result<LayerRecord> {
        let flags = self.flags();
        let handle = self.read_common_non_entity_data(map_handle, streams)?;

        let mut layer = LayerRecord {
            handle,
            ..Default::default()
        };

        // TV: name.
        layer.name = streams.read_text()?;

        // Xref-dependency: a single BS from R2007 on, the three-field form
        // before that.
        if flags.r2007_plus {
            let _xref_index = streams.object.read_bit_short()?;
        } else {
            let _referenced = streams.object.read_bit()?;
            let _xref_index = streams.object.read_bit_short()?;
            let _xref_dependent = streams.object.read_bit()?;
        }

        // BS: packed state flags and lineweight.
        let values = streams.object.read_bit_short()?;
        layer.frozen = (values & 0x01) != 0;
        layer.on = (values & 0x02) == 0;
        layer.locked = (values & 0x08) != 0;
        layer.plottable = (values & 0x10) != 0;

        // CMC: color.
        layer.color = streams.read_cm_color()?;

        // H: external reference block, then the version-gated style
        // handles, then the linetype.
        let _xref_block = streams.handle_ref()?;
        let _plotstyle = streams.handle_ref()?;
        if flags.r2007_plus {
            let _material = streams.handle_ref()?;
        }
        layer.linetype_handle = streams.handle_ref()?;

        Ok(layer)
    }
}
