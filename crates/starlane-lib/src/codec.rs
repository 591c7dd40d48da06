//! Binary encodings for the spatial index: order-preserving coordinate keys,
//! the fixed 34-byte row layout, and the leaf value format.
//!
//! Everything multi-byte is big-endian so that byte-lexicographic comparison
//! of encoded keys agrees with numeric ordering, which is what makes cursor
//! range scans over the index possible at all.

use crate::error::{Error, Result};
use crate::geom::Position;

/// Coordinates are quantised to millilight-years for the key representation.
const COORD_SCALE: f64 = 1000.0;

/// Added to the scaled coordinate to lift the signed range into unsigned,
/// so keys start at 0 near the most negative representable coordinate.
const COORD_OFFSET: i64 = i32::MAX as i64;

/// Serialised size of one [`IndexedSystem`] row.
pub const ROW_LEN: usize = 34;

/// One row of the spatial index: a system stripped down to what routing
/// needs. The full record stays in the galaxy store under the same id64.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedSystem {
    pub id64: u64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub is_neutron: bool,
    pub is_scoopable: bool,
}

impl IndexedSystem {
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y, self.z)
    }
}

/// Encode one coordinate as an 8-byte order-preserving key.
pub fn encode_coordinate(f: f64) -> [u8; 8] {
    let scaled = (f * COORD_SCALE).round() as i64;
    ((scaled + COORD_OFFSET) as u64).to_be_bytes()
}

/// Invert [`encode_coordinate`] back to a quantised coordinate.
pub fn decode_coordinate(key: [u8; 8]) -> f64 {
    let u = u64::from_be_bytes(key);
    let scaled = u.wrapping_sub(COORD_OFFSET as u64) as i64;
    scaled as f64 / COORD_SCALE
}

/// Composite 24-byte leaf key: X key, then Y key, then Z key. Systems share
/// a leaf only when they collide on all three quantised axes.
pub fn leaf_key(x: f64, y: f64, z: f64) -> [u8; 24] {
    let mut key = [0u8; 24];
    key[0..8].copy_from_slice(&encode_coordinate(x));
    key[8..16].copy_from_slice(&encode_coordinate(y));
    key[16..24].copy_from_slice(&encode_coordinate(z));
    key
}

/// Key for the name bucket. Uppercasing is Unicode-aware so lookups stay
/// case-insensitive for star names with diacritics.
pub fn name_key(name: &str) -> String {
    name.to_uppercase()
}

/// Serialise one row into the fixed 34-byte layout.
pub fn encode_row(system: &IndexedSystem) -> [u8; ROW_LEN] {
    let mut row = [0u8; ROW_LEN];
    row[0..8].copy_from_slice(&system.id64.to_be_bytes());
    row[8..16].copy_from_slice(&system.x.to_bits().to_be_bytes());
    row[16..24].copy_from_slice(&system.y.to_bits().to_be_bytes());
    row[24..32].copy_from_slice(&system.z.to_bits().to_be_bytes());
    row[32] = system.is_neutron as u8;
    row[33] = system.is_scoopable as u8;
    row
}

/// Deserialise one 34-byte row.
pub fn decode_row(bytes: &[u8]) -> Result<IndexedSystem> {
    if bytes.len() != ROW_LEN {
        return Err(Error::Malformed {
            what: "index row",
            detail: format!("expected {ROW_LEN} bytes, got {}", bytes.len()),
        });
    }

    let id64 = u64::from_be_bytes(bytes[0..8].try_into().expect("8-byte slice"));
    let x = f64::from_bits(u64::from_be_bytes(bytes[8..16].try_into().expect("8-byte slice")));
    let y = f64::from_bits(u64::from_be_bytes(bytes[16..24].try_into().expect("8-byte slice")));
    let z = f64::from_bits(u64::from_be_bytes(bytes[24..32].try_into().expect("8-byte slice")));
    let is_neutron = decode_flag(bytes[32], id64)?;
    let is_scoopable = decode_flag(bytes[33], id64)?;

    Ok(IndexedSystem {
        id64,
        x,
        y,
        z,
        is_neutron,
        is_scoopable,
    })
}

fn decode_flag(byte: u8, id64: u64) -> Result<bool> {
    match byte {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(Error::Malformed {
            what: "index row flag",
            detail: format!("byte {other:#04x} in row for id64 {id64}"),
        }),
    }
}

/// Serialise a leaf's rows as a big-endian count followed by the rows.
pub fn encode_rows(systems: &[IndexedSystem]) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + systems.len() * ROW_LEN);
    out.extend_from_slice(&(systems.len() as u64).to_be_bytes());
    for system in systems {
        out.extend_from_slice(&encode_row(system));
    }
    out
}

/// Deserialise a length-prefixed list of rows.
pub fn decode_rows(bytes: &[u8]) -> Result<Vec<IndexedSystem>> {
    if bytes.len() < 8 {
        return Err(Error::Malformed {
            what: "index leaf",
            detail: format!("leaf of {} bytes is too short for a count", bytes.len()),
        });
    }
    let count = u64::from_be_bytes(bytes[0..8].try_into().expect("8-byte slice")) as usize;
    let body = &bytes[8..];
    if body.len() != count * ROW_LEN {
        return Err(Error::Malformed {
            what: "index leaf",
            detail: format!(
                "count {count} does not match {} payload bytes",
                body.len()
            ),
        });
    }

    let mut out = Vec::with_capacity(count);
    for chunk in body.chunks_exact(ROW_LEN) {
        out.push(decode_row(chunk)?);
    }
    Ok(out)
}

/// Decode a leaf value under the configured occupancy policy.
#[cfg(not(feature = "single-occupancy"))]
pub fn decode_leaf(bytes: &[u8]) -> Result<Vec<IndexedSystem>> {
    decode_rows(bytes)
}

/// Decode a leaf value under the configured occupancy policy.
#[cfg(feature = "single-occupancy")]
pub fn decode_leaf(bytes: &[u8]) -> Result<Vec<IndexedSystem>> {
    Ok(vec![decode_row(bytes)?])
}
