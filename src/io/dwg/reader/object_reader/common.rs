//! Common entity prologue shared by every entity parser.

use crate::entities::{EntityCommon, SpaceKind};
use crate::error::{DwgError, Result};
use crate::types::{Handle, LineWeight};

use super::{ObjectReader, StreamSet};

impl<'a> ObjectReader<'a> {
    /// Read the version-gated common entity data and return the populated
    /// shared fields, leaving the object reader at the first type-specific
    /// field.
    ///
    /// `map_handle` is the handle the object map promised for this slot;
    /// a disagreement with the handle embedded in the object is tolerated
    /// but the embedded one wins.
    pub(super) fn read_common_entity_data(
        &mut self,
        map_handle: u64,
        streams: &mut StreamSet<'a>,
    ) -> Result<EntityCommon> {
        let flags = self.flags();

        // R2000-R2007: the RL end-of-data word leads the object data and
        // positions the handle (and R2007 text) sub-readers.
        if !flags.r2010_plus {
            self.update_handle_reader(streams)?;
        }

        // H: the object's own handle.
        let handle = streams.object.handle_reference()?;
        streams.current_handle = if handle != 0 { handle } else { map_handle };

        let mut common = EntityCommon::new(Handle::new(streams.current_handle));

        // EED groups: BS size, H appid, size bytes of payload.
        self.skip_extended_data(streams)?;

        // B: graphics present; the proxy graphics blob is skipped whole.
        if streams.object.read_bit()? {
            let gfx_size = if flags.r2010_plus {
                streams.object.read_bit_long_long()? as usize
            } else {
                streams.object.read_raw_long()? as usize
            };
            streams.object.advance(gfx_size)?;
        }

        // BB: entity mode. Mode 0 entities carry their owner block's
        // handle as a soft pointer.
        let entity_mode = streams.object.read_2bits()?;
        common.space = SpaceKind::from_entity_mode(entity_mode);
        if entity_mode == 0 {
            let _owner = streams.handle_ref()?;
        }

        // BL: reactor count, then the reactor/xdict flags and handles.
        let num_reactors = streams.object.read_bit_long()?;
        if !(0..10_000).contains(&num_reactors) {
            return Err(DwgError::Parse(format!(
                "reactor count {num_reactors} implies a misaligned stream"
            )));
        }

        let xdict_missing = if flags.r2004_plus {
            streams.object.read_bit()?
        } else {
            false
        };
        if flags.r2013_plus {
            let _has_ds_data = streams.object.read_bit()?;
        }

        for _ in 0..num_reactors {
            let _reactor = streams.handle_ref()?;
        }
        if !xdict_missing {
            let _xdict = streams.handle_ref()?;
        }

        // R2000: prev/next entity links behind the no-links bit.
        if !flags.r2004_plus {
            let no_links = streams.object.read_bit()?;
            if !no_links {
                let _prev = streams.handle_ref()?;
                let _next = streams.handle_ref()?;
            }
        }

        // ENC: color word, optional transparency, optional color handle.
        let (color, transparency, has_color_handle) = streams.object.read_en_color()?;
        common.color = color;
        common.transparency = transparency;
        if flags.r2004_plus && has_color_handle {
            let _color_handle = streams.handle_ref()?;
        }

        // BD: linetype scale.
        common.linetype_scale = streams.object.read_bit_double()?;

        // H: layer, then the flag-gated linetype / material / plot-style /
        // visual-style handles.
        let layer = streams.handle_ref()?;
        common.layer_handle = if layer != 0 {
            Some(Handle::new(layer))
        } else {
            None
        };

        let ltype_flags = streams.object.read_2bits()?;
        if ltype_flags == 3 {
            let _linetype = streams.handle_ref()?;
        }

        if flags.r2007_plus {
            let material_flags = streams.object.read_2bits()?;
            if material_flags == 3 {
                let _material = streams.handle_ref()?;
            }
            let _shadow_flags = streams.object.read_raw_char()?;
        }

        let plotstyle_flags = streams.object.read_2bits()?;
        if plotstyle_flags == 3 {
            let _plotstyle = streams.handle_ref()?;
        }

        if flags.r2010_plus {
            let has_full_vs = streams.object.read_bit()?;
            let has_face_vs = streams.object.read_bit()?;
            let has_edge_vs = streams.object.read_bit()?;
            for present in [has_full_vs, has_face_vs, has_edge_vs] {
                if present {
                    let _visual_style = streams.handle_ref()?;
                }
            }
        }

        // BS: invisibility flags, RC: lineweight.
        let invisible_flags = streams.object.read_bit_short()?;
        common.invisible = (invisible_flags & 1) != 0;
        common.line_weight = LineWeight::from_raw(streams.object.read_raw_char()?);

        Ok(common)
    }

    /// Read the common non-entity prologue (table entries and objects).
    ///
    /// Returns the object's own handle.
    pub(super) fn read_common_non_entity_data(
        &mut self,
        map_handle: u64,
        streams: &mut StreamSet<'a>,
    ) -> Result<u64> {
        let flags = self.flags();

        if !flags.r2010_plus {
            self.update_handle_reader(streams)?;
        }

        let handle = streams.object.handle_reference()?;
        streams.current_handle = if handle != 0 { handle } else { map_handle };

        self.skip_extended_data(streams)?;

        // BL: reactor count.
        let num_reactors = streams.object.read_bit_long()?;
        if !(0..10_000).contains(&num_reactors) {
            return Err(DwgError::Parse(format!(
                "reactor count {num_reactors} implies a misaligned stream"
            )));
        }

        let xdict_missing = if flags.r2004_plus {
            streams.object.read_bit()?
        } else {
            false
        };
        if flags.r2013_plus {
            let _has_ds_data = streams.object.read_bit()?;
        }

        // H: owner, then reactors and the xdict.
        let _owner = streams.handle_ref()?;
        for _ in 0..num_reactors {
            let _reactor = streams.handle_ref()?;
        }
        if !xdict_missing {
            let _xdict = streams.handle_ref()?;
        }

        Ok(streams.current_handle)
    }

    /// Skip the extended entity data groups without interpreting them.
    fn skip_extended_data(&mut self, streams: &mut StreamSet<'a>) -> Result<()> {
        loop {
            let size = streams.object.read_bit_short()?;
            if size <= 0 {
                return Ok(());
            }
            let _appid = streams.object.handle_reference()?;
            streams.object.advance(size as usize)?;
        }
    }
}
