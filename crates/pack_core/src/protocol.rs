//! Wire format of the pack status packet.
//!
//! The pack firmware emits a fixed-size status report framed by two
//! single-byte sentinels, with the payload itself bracketed by ASCII
//! markers:
//!
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ 'D' (1)  │ 'E' (1)  │ payload (23 bytes)          │
//! └──────────┴──────────┴─────────────────────────────┘
//!              payload:  'A' … fields … 'B'
//! ```
//!
//! There is no length prefix and no checksum; the fixed payload size and
//! the `'A'`/`'B'` marker pair are the only integrity signals the format
//! carries. Every field is read explicitly from its byte offset in
//! little-endian order; the buffer is never reinterpreted as a struct.

/// First framing sentinel. A byte stream is scanned for this value.
pub const HEADER_SENTINEL: u8 = b'D';

/// Second framing sentinel. Must directly follow [`HEADER_SENTINEL`] to
/// open a payload.
pub const OPEN_SENTINEL: u8 = b'E';

/// Marker that must open a valid payload.
pub const START_MARKER: u8 = b'A';

/// Marker that must close a valid payload.
pub const END_MARKER: u8 = b'B';

/// Number of cells in a pack. Fixed by the firmware.
pub const CELL_COUNT: usize = 6;

/// Size of the payload between the framing sentinels. The unit of framing.
pub const PAYLOAD_SIZE: usize = 23;

/// A complete candidate payload as emitted by the framer, before the
/// markers have been checked.
pub type Payload = [u8; PAYLOAD_SIZE];

/// Decode rejection. Consumed by the pipeline (the sample is dropped and
/// counted); never surfaced as a user-visible error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("bad start marker: 0x{0:02X} (expected 0x{START_MARKER:02X})")]
    BadStartMarker(u8),

    #[error("bad end marker: 0x{0:02X} (expected 0x{END_MARKER:02X})")]
    BadEndMarker(u8),
}

/// Raw pack status report, byte-exact.
///
/// | offset | size | field           |
/// |--------|------|-----------------|
/// | 0      | 1    | start marker    |
/// | 1      | 1    | mode            |
/// | 2      | 2    | current         |
/// | 4      | 2    | temperature     |
/// | 6      | 2    | charge_state    |
/// | 8      | 2    | pack_voltage    |
/// | 10     | 12   | cell_voltage[6] |
/// | 22     | 1    | end marker      |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPacket {
    /// Operating mode byte (0 load test, 1 discharging, 2 charging).
    pub mode: u8,
    /// Pack current (mA). The only signed field.
    pub current: i16,
    /// Pack temperature (m°C).
    pub temperature: u16,
    /// Accumulated charge (C).
    pub charge_state: u16,
    /// Pack voltage (mV).
    pub pack_voltage: u16,
    /// Per-cell voltage (mV).
    pub cell_voltage: [u16; CELL_COUNT],
}

fn u16_at(buf: &Payload, offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

/// Decodes a candidate payload into a [`RawPacket`].
///
/// Validates the `'A'`/`'B'` markers before reading any field. Marker
/// mismatch is the only rejection; interior bytes are taken at face value.
pub fn decode_payload(buf: &Payload) -> Result<RawPacket, ProtocolError> {
    if buf[0] != START_MARKER {
        return Err(ProtocolError::BadStartMarker(buf[0]));
    }
    if buf[PAYLOAD_SIZE - 1] != END_MARKER {
        return Err(ProtocolError::BadEndMarker(buf[PAYLOAD_SIZE - 1]));
    }

    let mut cell_voltage = [0u16; CELL_COUNT];
    for (i, cell) in cell_voltage.iter_mut().enumerate() {
        *cell = u16_at(buf, 10 + i * 2);
    }

    Ok(RawPacket {
        mode: buf[1],
        current: i16::from_le_bytes([buf[2], buf[3]]),
        temperature: u16_at(buf, 4),
        charge_state: u16_at(buf, 6),
        pack_voltage: u16_at(buf, 8),
        cell_voltage,
    })
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payload() -> Payload {
        let mut buf = [0u8; PAYLOAD_SIZE];
        buf[0] = START_MARKER;
        buf[1] = 1; // discharging
        buf[2..4].copy_from_slice(&(-1500i16).to_le_bytes());
        buf[4..6].copy_from_slice(&25_000u16.to_le_bytes());
        buf[6..8].copy_from_slice(&7_200u16.to_le_bytes());
        buf[8..10].copy_from_slice(&16_800u16.to_le_bytes());
        for i in 0..CELL_COUNT {
            let off = 10 + i * 2;
            buf[off..off + 2].copy_from_slice(&(2_800 + i as u16).to_le_bytes());
        }
        buf[PAYLOAD_SIZE - 1] = END_MARKER;
        buf
    }

    #[test]
    fn decodes_every_field() {
        let packet = decode_payload(&sample_payload()).unwrap();
        assert_eq!(packet.mode, 1);
        assert_eq!(packet.current, -1500);
        assert_eq!(packet.temperature, 25_000);
        assert_eq!(packet.charge_state, 7_200);
        assert_eq!(packet.pack_voltage, 16_800);
        assert_eq!(
            packet.cell_voltage,
            [2_800, 2_801, 2_802, 2_803, 2_804, 2_805]
        );
    }

    #[test]
    fn rejects_bad_start_marker() {
        let mut buf = sample_payload();
        buf[0] = b'X';
        assert_eq!(
            decode_payload(&buf),
            Err(ProtocolError::BadStartMarker(b'X'))
        );
    }

    #[test]
    fn rejects_bad_end_marker() {
        let mut buf = sample_payload();
        buf[PAYLOAD_SIZE - 1] = 0x00;
        assert_eq!(decode_payload(&buf), Err(ProtocolError::BadEndMarker(0x00)));
    }

    #[test]
    fn well_formed_interior_does_not_rescue_bad_markers() {
        let mut buf = sample_payload();
        buf[0] = END_MARKER;
        buf[PAYLOAD_SIZE - 1] = START_MARKER;
        assert!(decode_payload(&buf).is_err());
    }

    #[test]
    fn current_is_signed_little_endian() {
        let mut buf = [0u8; PAYLOAD_SIZE];
        buf[0] = START_MARKER;
        buf[PAYLOAD_SIZE - 1] = END_MARKER;
        buf[2] = 0xFF;
        buf[3] = 0xFF;
        let packet = decode_payload(&buf).unwrap();
        assert_eq!(packet.current, -1);
        // All other multi-byte fields are unsigned
        buf[4] = 0xFF;
        buf[5] = 0xFF;
        assert_eq!(decode_payload(&buf).unwrap().temperature, 65_535);
    }

    #[test]
    fn zeroed_payload_with_markers_decodes() {
        let mut buf = [0u8; PAYLOAD_SIZE];
        buf[0] = START_MARKER;
        buf[PAYLOAD_SIZE - 1] = END_MARKER;
        let packet = decode_payload(&buf).unwrap();
        assert_eq!(packet.mode, 0);
        assert_eq!(packet.current, 0);
        assert_eq!(packet.pack_voltage, 0);
        assert_eq!(packet.cell_voltage, [0; CELL_COUNT]);
    }
}
