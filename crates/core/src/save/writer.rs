//! Bit-exact little-endian encoder for a [`SavePayload`] (`spec.md` §4.6).

use super::payload::SavePayload;
use super::SaveError;

/// Accumulates little-endian bytes, rejecting values and strings the
/// format's fixed-width fields can't hold.
struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    fn new() -> Self {
        Self { buf: Vec::new() }
    }

    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn bool_u8(&mut self, v: bool) {
        self.u8(v as u8);
    }

    fn u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn i16(&mut self, v: i16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    /// Write a grid coordinate pair as two signed 16-bit fields. Callers
    /// validate range with [`checked_point`] before calling this.
    fn point(&mut self, p: (i32, i32)) {
        self.i16(p.0 as i16);
        self.i16(p.1 as i16);
    }

    fn bytes(&mut self, b: &[u8]) {
        self.buf.extend_from_slice(b);
    }

    fn string(&mut self, s: &str) -> Result<(), SaveError> {
        let bytes = s.as_bytes();
        if bytes.len() > u16::MAX as usize {
            return Err(SaveError::StringTooLong(bytes.len()));
        }
        self.u16(bytes.len() as u16);
        self.bytes(bytes);
        Ok(())
    }

    fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}

fn checked_i16(v: i32) -> Result<(), SaveError> {
    if v < i16::MIN as i32 || v > i16::MAX as i32 {
        return Err(SaveError::SignedOverflow(v as i64, 2));
    }
    Ok(())
}

fn checked_point(p: (i32, i32)) -> Result<(), SaveError> {
    checked_i16(p.0)?;
    checked_i16(p.1)
}

/// Encode `payload` into the uncompressed payload bytes described in
/// `spec.md` §4.6 (everything after the container's one-byte version tag
/// and before Snappy compression).
pub fn write_payload(payload: &SavePayload) -> Result<Vec<u8>, SaveError> {
    let mut w = ByteWriter::new();
    write_header(&mut w, payload)?;
    write_components(&mut w, payload)?;
    write_wires(&mut w, payload)?;
    Ok(w.into_vec())
}

fn write_header(w: &mut ByteWriter, payload: &SavePayload) -> Result<(), SaveError> {
    let h = &payload.header;
    w.u64(h.save_id);
    w.u32(h.hub_id);
    w.u64(h.gate_count);
    w.u64(h.delay);
    w.bool_u8(h.menu_visible);
    w.u32(h.clock_speed);

    if h.dependency_ids.len() > u16::MAX as usize {
        return Err(SaveError::UnsignedOverflow(h.dependency_ids.len() as u64, 2));
    }
    w.u16(h.dependency_ids.len() as u16);
    for id in &h.dependency_ids {
        w.u64(*id);
    }

    w.string(&h.description)?;

    checked_point(h.camera)?;
    w.point(h.camera);

    w.u8(h.sync_status);
    w.bool_u8(h.campaign_bound);
    w.u16(0); // reserved

    if h.player_data.len() > u16::MAX as usize {
        return Err(SaveError::UnsignedOverflow(h.player_data.len() as u64, 2));
    }
    w.u16(h.player_data.len() as u16);
    w.bytes(&h.player_data);

    w.string(&h.hub_description)?;
    Ok(())
}

fn write_components(w: &mut ByteWriter, payload: &SavePayload) -> Result<(), SaveError> {
    w.u64(payload.components.len() as u64);
    for c in &payload.components {
        w.u16(c.kind);
        checked_point(c.position)?;
        w.point(c.position);
        w.u8(c.rotation);
        w.u64(c.permanent_id);
        w.string(&c.label)?;
        w.i64(c.setting1);
        w.i64(c.setting2);
        w.i16(c.ui_order);

        if let Some(custom) = &c.custom {
            w.u64(custom.custom_id);
            checked_point(custom.displacement)?;
            w.point(custom.displacement);
        }

        if !c.programs.is_empty() {
            if c.programs.len() > u16::MAX as usize {
                return Err(SaveError::UnsignedOverflow(c.programs.len() as u64, 2));
            }
            w.u16(c.programs.len() as u16);
            let mut sorted = c.programs.clone();
            sorted.sort_by_key(|p| p.program_id);
            for entry in &sorted {
                w.u64(entry.program_id);
                w.string(&entry.name)?;
            }
        }
    }
    Ok(())
}

fn write_wires(w: &mut ByteWriter, payload: &SavePayload) -> Result<(), SaveError> {
    w.u64(payload.wires.len() as u64);
    for wire in &payload.wires {
        w.u8(wire.kind.code());
        w.u8(wire.color);
        w.string(&wire.comment)?;
        let start = (wire.start.x, wire.start.y);
        checked_point(start)?;
        w.point(start);
        w.bytes(&wire.body);
        if let Some(end) = wire.end {
            let end = (end.x, end.y);
            checked_point(end)?;
            w.point(end);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::Point;
    use crate::save::payload::{HeaderInfo, SaveHeader};
    use crate::wire::{WireKind, WireRecord, TERMINATOR};

    fn empty_header() -> SaveHeader {
        let info = HeaderInfo::default();
        SaveHeader {
            save_id: info.save_id,
            hub_id: info.hub_id,
            gate_count: 0,
            delay: info.delay,
            menu_visible: info.menu_visible,
            clock_speed: info.clock_speed,
            dependency_ids: info.dependency_ids,
            description: info.description,
            camera: info.camera,
            sync_status: info.sync_status,
            campaign_bound: info.campaign_bound,
            player_data: info.player_data,
            hub_description: info.hub_description,
        }
    }

    #[test]
    fn header_only_payload_encodes_fixed_prefix() {
        let payload = SavePayload {
            header: empty_header(),
            components: Vec::new(),
            wires: Vec::new(),
        };
        let bytes = write_payload(&payload).unwrap();
        // save_id(8) + hub_id(4) + gate_count(8) + delay(8) + menu(1) +
        // clock(4) + dep_count(2) + desc_len(2) + camera(4) + sync(1) +
        // campaign(1) + reserved(2) + player_len(2) + hub_desc_len(2)
        // + component_count(8) + wire_count(8)
        assert_eq!(bytes.len(), 8 + 4 + 8 + 8 + 1 + 4 + 2 + 2 + 4 + 1 + 1 + 2 + 2 + 2 + 8 + 8);
    }

    #[test]
    fn overlong_string_is_rejected() {
        let mut header = empty_header();
        header.description = "x".repeat(u16::MAX as usize + 1);
        let payload = SavePayload {
            header,
            components: Vec::new(),
            wires: Vec::new(),
        };
        assert!(matches!(write_payload(&payload), Err(SaveError::StringTooLong(_))));
    }

    #[test]
    fn wire_record_encodes_kind_color_and_body() {
        let payload = SavePayload {
            header: empty_header(),
            components: Vec::new(),
            wires: vec![WireRecord {
                kind: WireKind::Wk8,
                color: 3,
                comment: "c".to_string(),
                start: Point::new(1, 2),
                body: vec![TERMINATOR],
                end: None,
            }],
        };
        let bytes = write_payload(&payload).unwrap();
        assert!(bytes.len() > 0);
    }
}
